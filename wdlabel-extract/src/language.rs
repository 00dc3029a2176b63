//! Language code ranking and resolution
//!
//! Two concerns live here:
//! - picking the "most English" language among those observed for one item,
//!   through the pluggable [`EnglishRanking`] strategy
//! - resolving raw dump codes to the three-letter codes used to tag literals

use std::collections::HashMap;
use std::sync::Arc;

/// Two-letter → three-letter language code table
pub type LanguageMap = HashMap<String, String>;

/// Strategy choosing the language closest to an English rendering
///
/// Implementations must be deterministic: the same set of codes always
/// yields the same answer, independent of iteration order.
pub trait EnglishRanking: Send + Sync {
    /// The most English code among `codes`, or `None` if no code qualifies
    fn most_english<'a>(&self, codes: &mut dyn Iterator<Item = &'a str>) -> Option<&'a str>;
}

/// Ranking by position in a fixed priority list
///
/// Codes absent from the list never qualify. Equal ranks are broken by
/// lexicographic order of the code.
#[derive(Debug, Clone)]
pub struct PriorityRanking {
    ranks: HashMap<String, usize>,
}

impl PriorityRanking {
    pub fn new<I, S>(priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranks = HashMap::new();
        for (rank, code) in priority.into_iter().enumerate() {
            ranks.entry(code.into()).or_insert(rank);
        }
        Self { ranks }
    }

    pub fn rank(&self, code: &str) -> Option<usize> {
        self.ranks.get(code).copied()
    }
}

impl EnglishRanking for PriorityRanking {
    fn most_english<'a>(&self, codes: &mut dyn Iterator<Item = &'a str>) -> Option<&'a str> {
        codes
            .filter_map(|code| self.rank(code).map(|rank| (rank, code)))
            .min()
            .map(|(_, code)| code)
    }
}

/// Language ranking plus code resolution for one run
pub struct LanguageResolver {
    map: LanguageMap,
    ranking: Arc<dyn EnglishRanking>,
}

impl LanguageResolver {
    pub fn new(map: LanguageMap, ranking: Arc<dyn EnglishRanking>) -> Self {
        Self { map, ranking }
    }

    /// The most English code among `codes`
    pub fn most_english<'a, I>(&self, codes: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ranking.most_english(&mut codes.into_iter())
    }

    /// Three-letter code for `code`, see [`resolve`]
    pub fn resolve<'a>(&'a self, code: &'a str) -> Option<&'a str> {
        resolve(code, &self.map)
    }

    pub fn map_len(&self) -> usize {
        self.map.len()
    }
}

/// Resolve a raw code to a three-letter code
///
/// Three-letter codes are returned unchanged without a lookup, two-letter
/// codes are looked up in `map`, anything else is unresolvable.
pub fn resolve<'a>(code: &'a str, map: &'a LanguageMap) -> Option<&'a str> {
    match code.chars().count() {
        3 => Some(code),
        2 => map
            .get(code)
            .map(String::as_str)
            .filter(|resolved| resolved.chars().count() == 3),
        _ => None,
    }
}

/// Whether `code` denotes English
pub fn is_english(code: &str) -> bool {
    code == "en" || code == "eng"
}
