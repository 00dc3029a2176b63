//! wdlabel-extract library interface
//!
//! Exposes the label extraction pipeline for the binary and for integration
//! testing.

pub mod accumulator;
pub mod emitter;
pub mod language;
pub mod matcher;
pub mod names;
pub mod sink;
pub mod stage;
pub mod stats;
pub mod triples;

pub use crate::accumulator::{FlushOutcome, ItemAccumulator, MatchedItem, Step};
pub use crate::emitter::LabelEmitter;
pub use crate::language::{EnglishRanking, LanguageResolver, PriorityRanking};
pub use crate::matcher::EntityMatcher;
pub use crate::sink::{Deduplicating, FactSink, MemorySink, TsvSink};
pub use crate::stage::LabelStage;
pub use crate::stats::ExtractionStats;
pub use crate::triples::{Triple, TripleReader};
