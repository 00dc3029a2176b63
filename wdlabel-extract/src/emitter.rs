//! Label fact emission
//!
//! Both passes stamp every label fact with the same [`Provenance`] and write
//! it together with its source fact.

use crate::accumulator::MatchedItem;
use crate::matcher::EntityMatcher;
use crate::names::{preferred_name, trivial_names_of};
use crate::sink::FactSink;
use wdlabel_common::facts::ENGLISH;
use wdlabel_common::{LabelFact, LanguageLiteral, Provenance, Relation, Result};

pub struct LabelEmitter {
    provenance: Provenance,
}

impl LabelEmitter {
    pub fn new(provenance: Provenance) -> Self {
        Self { provenance }
    }

    /// English pass: one preferred name and the trivial names of every entity
    ///
    /// Entities are visited in ascending order and each one closes a sink
    /// group. Returns the number of facts handed to the sink.
    pub fn emit_english(&self, entities: &EntityMatcher, sink: &mut dyn FactSink) -> Result<u64> {
        let mut written = 0;
        for entity in entities.sorted() {
            // Both derive from the identifier, so the name is decoded once
            let name = preferred_name(entity);
            let names = trivial_names_of(entity);

            self.emit(sink, entity, Relation::PreferredName, name, ENGLISH)?;
            written += 1;

            for variant in names {
                self.emit(sink, entity, Relation::Label, variant, ENGLISH)?;
                written += 1;
            }
            sink.end_group()?;
        }
        Ok(written)
    }

    /// Foreign pass: the trivial names of every title of a matched item
    ///
    /// The item is one sink group.
    pub fn emit_foreign(&self, item: &MatchedItem, sink: &mut dyn FactSink) -> Result<u64> {
        let mut written = 0;
        for (code, title) in &item.names {
            for variant in trivial_names_of(title) {
                self.emit(sink, &item.entity, Relation::Label, variant, code)?;
                written += 1;
            }
        }
        sink.end_group()?;
        Ok(written)
    }

    fn emit(
        &self,
        sink: &mut dyn FactSink,
        entity: &str,
        relation: Relation,
        text: String,
        language: &str,
    ) -> Result<()> {
        let fact = LabelFact::new(entity, relation, LanguageLiteral::new(text, language));
        let source = self.provenance.attribute(&fact);
        sink.write(&fact, &source)
    }
}
