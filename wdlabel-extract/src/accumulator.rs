//! Per-item name buffer of the multilingual pass
//!
//! The dump lists, for each item, the Wikipedia articles about it together
//! with their language. [`ItemAccumulator`] collects those `language → title`
//! pairs until the next item-boundary triple, then flushes the group:
//!
//! 1. pick the most English language among the buffered ones
//! 2. derive the canonical entity from that language's title
//! 3. drop the group unless the entity is known
//! 4. resolve every buffered language to a three-letter code
//!
//! The buffer is emptied by every flush, whatever its outcome. A group that
//! is still buffered when the stream ends is never flushed.

use crate::language::LanguageResolver;
use crate::matcher::EntityMatcher;
use crate::names::{foreign_entity, title_from_subject};
use crate::triples::Triple;
use std::collections::BTreeMap;
use tracing::trace;
use wdlabel_common::facts::strip_quotes;

/// Predicate IRI suffix of language-assignment triples
pub const LANGUAGE_PREDICATE_SUFFIX: &str = "/inLanguage>";

/// Object IRI suffix of item-boundary triples
pub const ITEM_OBJECT_SUFFIX: &str = "#Item>";

/// Raw language code → raw title for the item being accumulated
pub type NameRecord = BTreeMap<String, String>;

/// Accumulator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Buffer empty
    Idle,
    /// Buffer holds at least one name
    Accumulating,
}

/// Group whose most English title names a known entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedItem {
    pub entity: String,
    /// `(three-letter code, raw title)` in ascending order of the raw code
    pub names: Vec<(String, String)>,
    /// Buffered languages dropped by code resolution
    pub skipped_languages: usize,
}

/// Result of flushing one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Matched(MatchedItem),
    /// The ranking found no qualifying language
    NoEnglishCandidate,
    /// The derived entity is not in the entity set
    UnknownEntity(String),
}

/// Effect of one triple on the accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Neither a language assignment nor a boundary
    Ignored,
    /// Language assignment buffered
    Recorded,
    /// Language assignment whose subject is not a Wikipedia title
    Rejected,
    /// Boundary seen with an empty buffer
    Boundary,
    /// Boundary seen with a non-empty buffer
    Flushed(FlushOutcome),
}

/// Buffers one item's names and flushes them at item boundaries
pub struct ItemAccumulator<'r> {
    resolver: &'r LanguageResolver,
    matcher: &'r EntityMatcher,
    buffer: NameRecord,
}

impl<'r> ItemAccumulator<'r> {
    pub fn new(resolver: &'r LanguageResolver, matcher: &'r EntityMatcher) -> Self {
        Self {
            resolver,
            matcher,
            buffer: NameRecord::new(),
        }
    }

    pub fn state(&self) -> AccumulatorState {
        if self.buffer.is_empty() {
            AccumulatorState::Idle
        } else {
            AccumulatorState::Accumulating
        }
    }

    /// Number of languages currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Process one triple
    pub fn accept(&mut self, triple: &Triple) -> Step {
        if triple.predicate.ends_with(LANGUAGE_PREDICATE_SUFFIX) {
            let language = strip_quotes(&triple.object);
            return match title_from_subject(&triple.subject) {
                Some(title) => {
                    self.buffer.insert(language.to_string(), title);
                    Step::Recorded
                }
                None => Step::Rejected,
            };
        }

        if triple.object.ends_with(ITEM_OBJECT_SUFFIX) {
            if self.buffer.is_empty() {
                return Step::Boundary;
            }
            return Step::Flushed(self.flush());
        }

        Step::Ignored
    }

    /// Discard the accumulator, returning the number of unflushed languages
    pub fn finish(self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) -> FlushOutcome {
        let buffer = std::mem::take(&mut self.buffer);

        let Some(language) = self.resolver.most_english(buffer.keys().map(String::as_str)) else {
            trace!(languages = buffer.len(), "No English candidate");
            return FlushOutcome::NoEnglishCandidate;
        };

        let entity = foreign_entity(&buffer[language], language);
        if !self.matcher.contains(&entity) {
            trace!(entity = %entity, "Unknown entity");
            return FlushOutcome::UnknownEntity(entity);
        }

        let mut names = Vec::with_capacity(buffer.len());
        let mut skipped_languages = 0;
        for (raw, title) in &buffer {
            match self.resolver.resolve(raw) {
                Some(code) => names.push((code.to_string(), title.clone())),
                None => skipped_languages += 1,
            }
        }

        FlushOutcome::Matched(MatchedItem {
            entity,
            names,
            skipped_languages,
        })
    }
}
