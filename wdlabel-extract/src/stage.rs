//! Label extraction stage
//!
//! Reads the entity set and the language code table from the themes
//! directory, writes the English labels of every entity, then scans the
//! triple dump for the multilingual labels of the items whose most English
//! title names a known entity.

use crate::accumulator::{FlushOutcome, ItemAccumulator, Step};
use crate::emitter::LabelEmitter;
use crate::language::{EnglishRanking, LanguageResolver, PriorityRanking};
use crate::matcher::EntityMatcher;
use crate::sink::{Deduplicating, FactSink, TsvSink};
use crate::stats::ExtractionStats;
use crate::triples::TripleReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use wdlabel_common::config::TomlConfig;
use wdlabel_common::tsv::{load_string_map, load_subjects};
use wdlabel_common::{DatasetRegistry, Provenance, Result, Stage, StageReport, Theme};

pub const STAGE_NAME: &str = "wikidata-labels";

/// Relation of the language code table rows
pub const LANGUAGE_CODE_RELATION: &str = "<hasThreeLetterLanguageCode>";

/// Triples between two progress log lines
pub const PROGRESS_INTERVAL: u64 = 1_000_000;

#[derive(Debug, Clone)]
struct StageThemes {
    transitive_type: Theme,
    language_code_mapping: Theme,
    english_labels: Theme,
    english_label_sources: Theme,
    multilingual_labels: Theme,
    multilingual_label_sources: Theme,
}

pub struct LabelStage {
    themes: StageThemes,
    dump: PathBuf,
    provenance: Provenance,
    ranking: Arc<dyn EnglishRanking>,
    deduplicate: bool,
    stats: ExtractionStats,
}

impl LabelStage {
    /// Stage configured from `config`, scanning `dump`
    ///
    /// The English ranking is the configured language priority list.
    pub fn from_config(config: &TomlConfig, dump: impl Into<PathBuf>) -> Self {
        let names = &config.themes;
        Self {
            themes: StageThemes {
                transitive_type: Theme::new(&names.transitive_type, "Entities and their transitive types"),
                language_code_mapping: Theme::new(
                    &names.language_code_mapping,
                    "Two-letter to three-letter language codes",
                ),
                english_labels: Theme::new(&names.english_labels, "English labels of all entities"),
                english_label_sources: Theme::new(&names.english_label_sources, "Sources of English labels"),
                multilingual_labels: Theme::new(&names.multilingual_labels, "Multilingual labels from Wikidata"),
                multilingual_label_sources: Theme::new(
                    &names.multilingual_label_sources,
                    "Sources of multilingual labels",
                ),
            },
            dump: dump.into(),
            provenance: Provenance::new(&config.provenance.source_url, &config.provenance.extractor_name),
            ranking: Arc::new(PriorityRanking::new(config.languages.priority.iter().cloned())),
            deduplicate: config.output.deduplicate,
            stats: ExtractionStats::default(),
        }
    }

    /// Replace the English ranking strategy
    pub fn with_ranking(mut self, ranking: Arc<dyn EnglishRanking>) -> Self {
        self.ranking = ranking;
        self
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Write one label dataset and its sources through `fill`
    ///
    /// Returns the facts written and the duplicates dropped.
    fn write_dataset<F>(
        &self,
        registry: &DatasetRegistry,
        labels: &Theme,
        sources: &Theme,
        fill: F,
    ) -> Result<(u64, u64)>
    where
        F: FnOnce(&mut dyn FactSink) -> Result<u64>,
    {
        let tsv = TsvSink::create(&registry.path(labels), &registry.path(sources))?;

        if self.deduplicate {
            let mut sink = Deduplicating::new(tsv);
            let emitted = {
                let dyn_sink: &mut dyn FactSink = &mut sink;
                fill(dyn_sink)?
            };
            sink.finish()?;
            let dropped = sink.dropped();
            Ok((emitted - dropped, dropped))
        } else {
            let mut sink = tsv;
            let emitted = {
                let dyn_sink: &mut dyn FactSink = &mut sink;
                fill(dyn_sink)?
            };
            sink.finish()?;
            Ok((emitted, 0))
        }
    }
}

impl Stage for LabelStage {
    fn name(&self) -> &str {
        STAGE_NAME
    }

    fn inputs(&self) -> Vec<Theme> {
        vec![
            self.themes.transitive_type.clone(),
            self.themes.language_code_mapping.clone(),
        ]
    }

    fn outputs(&self) -> Vec<Theme> {
        vec![
            self.themes.english_labels.clone(),
            self.themes.english_label_sources.clone(),
            self.themes.multilingual_labels.clone(),
            self.themes.multilingual_label_sources.clone(),
        ]
    }

    fn run(&mut self, registry: &DatasetRegistry) -> Result<StageReport> {
        let mut stats = ExtractionStats::default();

        let entities = EntityMatcher::new(load_subjects(&registry.path(&self.themes.transitive_type))?);
        let map = load_string_map(
            &registry.path(&self.themes.language_code_mapping),
            LANGUAGE_CODE_RELATION,
        )?;
        stats.entities = entities.len() as u64;
        stats.language_map_entries = map.len() as u64;
        info!(entities = entities.len(), languages = map.len(), "Loaded input datasets");

        // Open the dump before writing anything so a missing dump leaves no outputs
        let reader = TripleReader::open(&self.dump)?;
        info!(dump = %self.dump.display(), "Opened triple dump");

        let resolver = LanguageResolver::new(map, Arc::clone(&self.ranking));
        let emitter = LabelEmitter::new(self.provenance.clone());

        let (english_facts, english_dropped) = self.write_dataset(
            registry,
            &self.themes.english_labels,
            &self.themes.english_label_sources,
            |sink| emitter.emit_english(&entities, sink),
        )?;
        stats.english_facts = english_facts;
        info!(
            theme = %self.themes.english_labels.name,
            facts = english_facts,
            "English labels written"
        );

        let (multilingual_facts, multilingual_dropped) = self.write_dataset(
            registry,
            &self.themes.multilingual_labels,
            &self.themes.multilingual_label_sources,
            |sink| {
                let mut accumulator = ItemAccumulator::new(&resolver, &entities);
                let mut emitted = 0;

                for triple in reader {
                    let triple = triple?;
                    let step = accumulator.accept(&triple);
                    if let Step::Flushed(FlushOutcome::Matched(item)) = &step {
                        emitted += emitter.emit_foreign(item, sink)?;
                    }
                    stats.record(&step);

                    if stats.triples % PROGRESS_INTERVAL == 0 {
                        info!(
                            triples = stats.triples,
                            matched = stats.matched_items,
                            facts = emitted,
                            "Scanning dump"
                        );
                    }
                }

                let discarded = accumulator.finish();
                if discarded > 0 {
                    debug!(languages = discarded, "Dump ended inside an item, its names are discarded");
                }
                stats.discarded_languages = discarded as u64;
                Ok(emitted)
            },
        )?;
        stats.multilingual_facts = multilingual_facts;
        stats.duplicates_dropped = english_dropped + multilingual_dropped;
        info!(
            theme = %self.themes.multilingual_labels.name,
            facts = multilingual_facts,
            "Multilingual labels written"
        );

        stats.log_summary();
        let report = stats.to_report(STAGE_NAME);
        self.stats = stats;
        Ok(report)
    }
}
