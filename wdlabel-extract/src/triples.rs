//! N-Triples reader
//!
//! Produces the triple stream consumed by the multilingual pass. Terms are
//! kept verbatim: IRIs keep their angle brackets, literals keep their quotes
//! and any `@lang` / `^^<datatype>` suffix.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use wdlabel_common::{Error, Result};

/// `(subject, predicate, object)` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Parse one N-Triples statement
    ///
    /// Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let mut rest = line.trim_start();
        if rest.is_empty() || rest.starts_with('#') {
            return Ok(None);
        }

        let (subject, tail) = take_term(rest)?;
        let (predicate, tail) = take_term(tail.trim_start())?;
        let (object, tail) = take_term(tail.trim_start())?;
        rest = tail.trim_start();

        match rest.strip_prefix('.') {
            Some(after) => {
                let after = after.trim_start();
                if !after.is_empty() && !after.starts_with('#') {
                    return Err(format!("unexpected content after '.': {}", after));
                }
            }
            None => return Err("missing terminating '.'".to_string()),
        }

        Ok(Some(Triple {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
        }))
    }
}

/// Split the leading term off `input`
fn take_term(input: &str) -> std::result::Result<(&str, &str), String> {
    let bytes = input.as_bytes();
    match bytes.first() {
        Some(b'<') => {
            let end = input
                .find('>')
                .ok_or_else(|| "unterminated IRI".to_string())?;
            Ok(input.split_at(end + 1))
        }
        Some(b'_') if input.starts_with("_:") => {
            let end = input
                .find(|c: char| c.is_whitespace())
                .unwrap_or(input.len());
            Ok(input.split_at(end))
        }
        Some(b'"') => {
            let close = closing_quote(input).ok_or_else(|| "unterminated literal".to_string())?;
            let mut end = close + 1;
            let suffix = &input[end..];
            if let Some(lang) = suffix.strip_prefix('@') {
                let len = lang
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(lang.len());
                if len == 0 {
                    return Err("empty language tag".to_string());
                }
                end += 1 + len;
            } else if let Some(datatype) = suffix.strip_prefix("^^") {
                if !datatype.starts_with('<') {
                    return Err("datatype must be an IRI".to_string());
                }
                let len = datatype
                    .find('>')
                    .ok_or_else(|| "unterminated datatype IRI".to_string())?;
                end += 2 + len + 1;
            }
            Ok(input.split_at(end))
        }
        Some(_) => Err(format!(
            "unexpected term start: {}",
            input.chars().take(20).collect::<String>()
        )),
        None => Err("missing term".to_string()),
    }
}

/// Byte index of the quote closing the literal that starts at index 0
fn closing_quote(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Iterator over the triples of an N-Triples source
///
/// Any line that is not a triple, blank or a comment ends the stream with
/// a parse error. The underlying reader is released when the iterator is
/// dropped.
pub struct TripleReader<R> {
    reader: R,
    source_name: String,
    line: usize,
    buf: String,
    failed: bool,
}

impl TripleReader<BufReader<File>> {
    /// Open an N-Triples file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::Config(format!("Cannot open triple dump {}: {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> TripleReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            source_name: source_name.into(),
            line: 0,
            buf: String::new(),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for TripleReader<R> {
    type Item = Result<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(Error::Io(e)));
                }
            }
            self.line += 1;

            match Triple::parse(self.buf.trim_end_matches(['\r', '\n'])) {
                Ok(Some(triple)) => return Some(Ok(triple)),
                Ok(None) => continue,
                Err(message) => {
                    self.failed = true;
                    return Some(Err(Error::parse(&self.source_name, self.line, message)));
                }
            }
        }
    }
}
