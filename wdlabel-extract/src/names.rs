//! Name canonicalization
//!
//! Turns entity identifiers and Wikipedia titles into display names and the
//! small set of "trivial" name variants every entity is known by.

use crate::language::is_english;
use std::collections::BTreeSet;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Placeholder for characters accent folding cannot map to ASCII
pub const UNKNOWN_CHAR: &str = "[?]";

const WIKIPEDIA_HOST_SUFFIX: &str = ".wikipedia.org";
const WIKI_PATH: &str = "/wiki/";

/// Canonical English display name of an entity identifier
///
/// Strips the angle brackets and any `xx/` language prefix, replaces
/// underscores with spaces and decodes escapes.
pub fn preferred_name(entity: &str) -> String {
    decode(&strip_brackets_and_language(entity).replace('_', " "))
}

/// The title, its accent-folded form, and the disambiguation-free and
/// surname-first prefixes, sorted and de-duplicated
///
/// The prefix rules are re-applied to their own results, so applying this
/// function to any returned name yields a subset of the returned set.
pub fn trivial_names_of(title: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut pending = vec![preferred_name(title)];

    while let Some(name) = pending.pop() {
        if name.is_empty() || names.contains(&name) {
            continue;
        }
        pending.extend(variants(&name));
        names.insert(name);
    }
    names
}

fn variants(name: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(4);

    // Decoding again may still change a decoded name ("A%5FB" -> "A_B" -> "A B")
    let canonical = preferred_name(name);
    if canonical != name {
        out.push(canonical);
    }

    let folded = normalize(name);
    if !folded.contains(UNKNOWN_CHAR) {
        out.push(folded);
    }

    // "Mercury (planet)" -> "Mercury"
    if let Some(pos) = name.find(" (") {
        out.push(name[..pos].trim().to_string());
    }

    // "Smith, John" -> "Smith"
    if !name.contains('(') {
        if let Some(pos) = name.find(',') {
            out.push(name[..pos].trim().to_string());
        }
    }

    out
}

/// Canonical identifier of the entity titled `title` in language `language`
///
/// English titles map to `<Title>`, all others to `<language/Title>`.
pub fn foreign_entity(title: &str, language: &str) -> String {
    let title = title.replace(' ', "_");
    if is_english(language) {
        format!("<{}>", title)
    } else {
        format!("<{}/{}>", language, title)
    }
}

/// Wikipedia title from the subject of a language-assignment triple
///
/// The subject is percent-decoded before the prefix is stripped. Subjects
/// that are not Wikipedia article IRIs yield `None`.
pub fn title_from_subject(subject: &str) -> Option<String> {
    strip_wikipedia_prefix(&decode_percentage(subject))
}

/// `<https://de.wikipedia.org/wiki/Merkur_(Planet)>` -> `Merkur_(Planet)`
pub fn strip_wikipedia_prefix(iri: &str) -> Option<String> {
    let rest = iri
        .strip_prefix("<http://")
        .or_else(|| iri.strip_prefix("<https://"))?;
    let slash = rest.find('/')?;
    let (host, path) = rest.split_at(slash);
    if !host.ends_with(WIKIPEDIA_HOST_SUFFIX) {
        return None;
    }
    let title = path.strip_prefix(WIKI_PATH)?;
    let title = title.strip_suffix('>').unwrap_or(title);
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Remove surrounding angle brackets and a `xx/` or `xxx/` language prefix
///
/// The language prefix is only recognized inside brackets.
pub fn strip_brackets_and_language(entity: &str) -> &str {
    let Some(inner) = entity
        .strip_prefix('<')
        .and_then(|e| e.strip_suffix('>'))
    else {
        return entity;
    };

    match inner.find('/') {
        Some(pos @ 2..=3) if inner[..pos].bytes().all(|b| b.is_ascii_lowercase()) => {
            &inner[pos + 1..]
        }
        _ => inner,
    }
}

/// Decode percent escapes, backslash Unicode escapes and XML entities
pub fn decode(s: &str) -> String {
    decode_entities(&decode_backslash(&decode_percentage(s)))
}

/// Percent-decode, keeping malformed escapes verbatim
pub fn decode_percentage(s: &str) -> String {
    if !s.contains('%') {
        return s.to_string();
    }
    let bytes = urlencoding::decode_binary(s.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decode `\uXXXX` (including surrogate pairs) and `\UXXXXXXXX`
fn decode_backslash(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some((c, len)) = unicode_escape(rest) {
            out.push(c);
            rest = &rest[len..];
        } else {
            out.push('\\');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Character and byte length of the escape at the start of `s`
fn unicode_escape(s: &str) -> Option<(char, usize)> {
    let hex = |digits: &str| u32::from_str_radix(digits, 16).ok();

    if let Some(long) = s.strip_prefix("\\U") {
        let code = hex(long.get(..8)?)?;
        return char::from_u32(code).map(|c| (c, 10));
    }

    let code = hex(s.strip_prefix("\\u")?.get(..4)?)?;
    if (0xD800..0xDC00).contains(&code) {
        let low = hex(s.get(6..)?.strip_prefix("\\u")?.get(..4)?)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(combined).map(|c| (c, 12));
    }
    char::from_u32(code).map(|c| (c, 6))
}

/// Decode `&amp; &lt; &gt; &quot; &apos;` and numeric character references
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match rest.find(';').and_then(|end| entity(&rest[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Fold accents and map to ASCII
///
/// Characters that cannot be mapped become [`UNKNOWN_CHAR`].
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if let Some(ascii) = transliterate(c) {
            out.push_str(ascii);
            continue;
        }

        let mut folded = String::new();
        let mut unknown = false;
        decompose_canonical(c, |d| {
            if is_combining_mark(d) {
                return;
            }
            if d.is_ascii() {
                folded.push(d);
            } else {
                unknown = true;
            }
        });

        if unknown {
            out.push_str(UNKNOWN_CHAR);
        } else {
            out.push_str(&folded);
        }
    }
    out
}

/// Letters and punctuation without a canonical decomposition to ASCII
fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'ß' => "ss",
        'ẞ' => "SS",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'ð' => "d",
        'Ð' => "D",
        'þ' => "th",
        'Þ' => "Th",
        'ı' => "i",
        '\u{00A0}' => " ",
        '\u{2010}'..='\u{2015}' => "-",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        _ => return None,
    };
    Some(ascii)
}
