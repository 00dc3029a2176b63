//! Named datasets and the stage scheduler
//!
//! A [`Theme`] names a file-backed dataset. Each [`Stage`] declares the themes
//! it requires and the themes it produces; the [`Scheduler`] runs a stage only
//! once all of its inputs are materialized in the [`DatasetRegistry`].

use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File extension of materialized datasets
pub const DATASET_EXTENSION: &str = "tsv";

/// Named dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Theme {
    pub name: String,
    pub description: String,
}

impl Theme {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// File name of the dataset, e.g. `wikipediaLabels.tsv`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, DATASET_EXTENSION)
    }
}

/// Resolves themes to files inside one directory
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    dir: PathBuf,
}

impl DatasetRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the dataset file for `theme`
    pub fn path(&self, theme: &Theme) -> PathBuf {
        self.dir.join(theme.file_name())
    }

    /// Whether the dataset for `theme` exists
    pub fn is_materialized(&self, theme: &Theme) -> bool {
        self.path(theme).is_file()
    }

    /// Themes from `themes` that are not materialized
    pub fn missing<'a>(&self, themes: &'a [Theme]) -> Vec<&'a Theme> {
        themes.iter().filter(|t| !self.is_materialized(t)).collect()
    }
}

/// Counters reported by a finished stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub counters: BTreeMap<String, u64>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            counters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, counter: &str, value: u64) -> Self {
        self.counters.insert(counter.to_string(), value);
        self
    }

    pub fn get(&self, counter: &str) -> Option<u64> {
        self.counters.get(counter).copied()
    }
}

/// Unit of work in the dataset graph
pub trait Stage {
    /// Stage name for logs and reports
    fn name(&self) -> &str;

    /// Datasets that must exist before the stage runs
    fn inputs(&self) -> Vec<Theme>;

    /// Datasets the stage materializes
    fn outputs(&self) -> Vec<Theme>;

    /// Run the stage against the datasets in `registry`
    fn run(&mut self, registry: &DatasetRegistry) -> Result<StageReport>;
}

/// Runs stages in dependency order
pub struct Scheduler {
    registry: DatasetRegistry,
    stages: Vec<Box<dyn Stage>>,
}

impl Scheduler {
    pub fn new(registry: DatasetRegistry) -> Self {
        Self {
            registry,
            stages: Vec::new(),
        }
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Run every stage once
    ///
    /// Each round runs, in registration order, all pending stages whose
    /// inputs are materialized. Fails with [`Error::MissingDataset`] when
    /// stages remain but none of them can run.
    pub fn run(mut self) -> Result<Vec<StageReport>> {
        let mut pending: Vec<Box<dyn Stage>> = std::mem::take(&mut self.stages);
        let mut reports = Vec::new();

        while !pending.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|stage| self.registry.missing(&stage.inputs()).is_empty());

            if ready.is_empty() {
                let missing: Vec<String> = blocked
                    .iter()
                    .map(|stage| {
                        let inputs = stage.inputs();
                        let names: Vec<&str> = self
                            .registry
                            .missing(&inputs)
                            .into_iter()
                            .map(|t| t.name.as_str())
                            .collect();
                        format!("{} needs {}", stage.name(), names.join(", "))
                    })
                    .collect();
                warn!("No runnable stage: {}", missing.join("; "));
                return Err(Error::MissingDataset(missing.join("; ")));
            }

            for mut stage in ready {
                info!(stage = stage.name(), "Running stage");
                let report = stage.run(&self.registry)?;

                let outputs = stage.outputs();
                let unproduced: Vec<&str> = self
                    .registry
                    .missing(&outputs)
                    .into_iter()
                    .map(|t| t.name.as_str())
                    .collect();
                if !unproduced.is_empty() {
                    return Err(Error::Internal(format!(
                        "Stage {} did not produce {}",
                        stage.name(),
                        unproduced.join(", ")
                    )));
                }

                info!(stage = stage.name(), "Stage complete");
                reports.push(report);
            }

            pending = blocked;
        }

        Ok(reports)
    }
}
