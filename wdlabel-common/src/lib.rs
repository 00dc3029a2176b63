//! # wdlabel Common Library
//!
//! Shared code for the wdlabel crates including:
//! - Error types
//! - Configuration loading
//! - Label and provenance fact types
//! - Tab-separated dataset files
//! - Named datasets and the stage scheduler

pub mod config;
pub mod error;
pub mod facts;
pub mod themes;
pub mod tsv;

pub use error::{Error, Result};
pub use facts::{LabelFact, LanguageLiteral, Provenance, Relation, SourceFact};
pub use themes::{DatasetRegistry, Scheduler, Stage, StageReport, Theme};
