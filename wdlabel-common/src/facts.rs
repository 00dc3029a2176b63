//! Label and provenance fact types
//!
//! A [`LabelFact`] states that an entity carries a name in a language; every
//! label fact is written together with exactly one [`SourceFact`] that
//! attributes it to a source URL and an extractor.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Language tag used for English literals
pub const ENGLISH: &str = "eng";

/// Kind of name relation carried by a label fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// The single display name of an entity
    PreferredName,
    /// Any name the entity is known by
    Label,
}

impl Relation {
    /// Rendering used in fact files
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::PreferredName => "<hasPreferredName>",
            Relation::Label => "rdfs:label",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String literal tagged with a three-letter language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageLiteral {
    pub text: String,
    pub language: String,
}

impl LanguageLiteral {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}

impl fmt::Display for LanguageLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"@{}", escape_literal(&self.text), self.language)
    }
}

/// `(entity, relation, literal)` name assertion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelFact {
    pub entity: String,
    pub relation: Relation,
    pub literal: LanguageLiteral,
}

impl LabelFact {
    pub fn new(entity: impl Into<String>, relation: Relation, literal: LanguageLiteral) -> Self {
        Self {
            entity: entity.into(),
            relation,
            literal,
        }
    }

    /// Content-derived identifier: identical facts share a reference
    pub fn fact_ref(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.entity.as_bytes());
        hasher.update(b"\t");
        hasher.update(self.relation.as_str().as_bytes());
        hasher.update(b"\t");
        hasher.update(self.literal.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("<id_{}>", &digest[..16])
    }
}

/// Provenance record paired with one label fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFact {
    pub fact_ref: String,
    pub source_url: String,
    pub extractor_name: String,
}

/// Source URL and extractor identity stamped on every emitted fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source_url: String,
    pub extractor_name: String,
}

impl Provenance {
    pub fn new(source_url: impl Into<String>, extractor_name: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            extractor_name: extractor_name.into(),
        }
    }

    /// Source fact for `fact`
    pub fn attribute(&self, fact: &LabelFact) -> SourceFact {
        SourceFact {
            fact_ref: fact.fact_ref(),
            source_url: self.source_url.clone(),
            extractor_name: self.extractor_name.clone(),
        }
    }
}

/// Backslash-escape a literal body
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip the quotes of a literal term, dropping any `@lang` or `^^type` suffix
///
/// Terms that are not quoted are returned unchanged.
pub fn strip_quotes(term: &str) -> &str {
    let term = term.trim();
    if !term.starts_with('"') {
        return term;
    }
    match term.rfind('"') {
        Some(end) if end > 0 => &term[1..end],
        _ => &term[1..],
    }
}
