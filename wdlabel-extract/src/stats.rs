//! Run statistics

use crate::accumulator::{FlushOutcome, Step};
use serde::Serialize;
use tracing::info;
use wdlabel_common::StageReport;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub entities: u64,
    pub language_map_entries: u64,
    pub english_facts: u64,
    pub triples: u64,
    pub language_assignments: u64,
    pub rejected_titles: u64,
    pub boundaries: u64,
    pub flushes: u64,
    pub matched_items: u64,
    pub no_english_candidate: u64,
    pub unknown_entities: u64,
    pub skipped_languages: u64,
    pub multilingual_facts: u64,
    pub discarded_languages: u64,
    pub duplicates_dropped: u64,
}

impl ExtractionStats {
    /// Count the effect of one triple on the accumulator
    pub fn record(&mut self, step: &Step) {
        self.triples += 1;
        match step {
            Step::Ignored => {}
            Step::Recorded => self.language_assignments += 1,
            Step::Rejected => {
                self.language_assignments += 1;
                self.rejected_titles += 1;
            }
            Step::Boundary => self.boundaries += 1,
            Step::Flushed(outcome) => {
                self.boundaries += 1;
                self.flushes += 1;
                match outcome {
                    FlushOutcome::Matched(item) => {
                        self.matched_items += 1;
                        self.skipped_languages += item.skipped_languages as u64;
                    }
                    FlushOutcome::NoEnglishCandidate => self.no_english_candidate += 1,
                    FlushOutcome::UnknownEntity(_) => self.unknown_entities += 1,
                }
            }
        }
    }

    pub fn log_summary(&self) {
        info!(
            entities = self.entities,
            english_facts = self.english_facts,
            "English pass complete"
        );
        info!(
            triples = self.triples,
            flushes = self.flushes,
            matched = self.matched_items,
            no_english_candidate = self.no_english_candidate,
            unknown_entities = self.unknown_entities,
            skipped_languages = self.skipped_languages,
            facts = self.multilingual_facts,
            "Multilingual pass complete"
        );
        if self.duplicates_dropped > 0 {
            info!(duplicates = self.duplicates_dropped, "Duplicate facts dropped");
        }
    }

    pub fn to_report(&self, stage: &str) -> StageReport {
        StageReport::new(stage)
            .with("entities", self.entities)
            .with("language_map_entries", self.language_map_entries)
            .with("english_facts", self.english_facts)
            .with("triples", self.triples)
            .with("language_assignments", self.language_assignments)
            .with("rejected_titles", self.rejected_titles)
            .with("boundaries", self.boundaries)
            .with("flushes", self.flushes)
            .with("matched_items", self.matched_items)
            .with("no_english_candidate", self.no_english_candidate)
            .with("unknown_entities", self.unknown_entities)
            .with("skipped_languages", self.skipped_languages)
            .with("multilingual_facts", self.multilingual_facts)
            .with("discarded_languages", self.discarded_languages)
            .with("duplicates_dropped", self.duplicates_dropped)
    }
}
