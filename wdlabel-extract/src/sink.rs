//! Output sinks for label and source facts
//!
//! Every sink receives facts as `(LabelFact, SourceFact)` pairs so the two
//! output streams stay parallel.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use wdlabel_common::{Error, LabelFact, Result, SourceFact};

/// Destination of emitted facts
pub trait FactSink {
    /// Append one label fact and its provenance
    fn write(&mut self, fact: &LabelFact, source: &SourceFact) -> Result<()>;

    /// Close the current group of related facts
    ///
    /// An entity of the English pass or an item of the foreign pass forms
    /// one group.
    fn end_group(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flush and close the sink
    ///
    /// Facts written after `finish` are unspecified.
    fn finish(&mut self) -> Result<()>;
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct MemorySink {
    pub labels: Vec<LabelFact>,
    pub sources: Vec<SourceFact>,
    pub groups: u64,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FactSink for MemorySink {
    fn write(&mut self, fact: &LabelFact, source: &SourceFact) -> Result<()> {
        self.labels.push(fact.clone());
        self.sources.push(source.clone());
        Ok(())
    }

    fn end_group(&mut self) -> Result<()> {
        self.groups += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// One file written under a temporary name and renamed on completion
///
/// Dropping it uncommitted removes the temporary file.
struct PendingFile {
    target: PathBuf,
    temp: PathBuf,
    writer: Option<BufWriter<File>>,
    committed: bool,
}

impl PendingFile {
    fn create(target: &Path) -> Result<Self> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut temp = target.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);
        let file = File::create(&temp)?;
        Ok(Self {
            target: target.to_path_buf(),
            temp,
            writer: Some(BufWriter::new(file)),
            committed: false,
        })
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| Error::Internal(format!("Dataset already closed: {}", self.target.display())))
    }

    fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Ok(());
        }
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Internal(format!("Dataset already closed: {}", self.target.display())))?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        debug!(path = %self.target.display(), "Dataset materialized");
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.writer.take());
        if fs::remove_file(&self.temp).is_ok() {
            debug!(path = %self.temp.display(), "Removed unfinished dataset");
        }
    }
}

/// Tab-separated label and source files
///
/// Label rows are `factRef \t entity \t relation \t literal`, source rows are
/// `factRef \t sourceURL \t "extractorName"`. Both files only appear under
/// their final names once [`FactSink::finish`] succeeds.
pub struct TsvSink {
    labels: PendingFile,
    sources: PendingFile,
    rows: u64,
    finished: bool,
}

impl TsvSink {
    pub fn create(labels_path: &Path, sources_path: &Path) -> Result<Self> {
        if labels_path == sources_path {
            return Err(Error::InvalidInput(format!(
                "Label and source datasets share a path: {}",
                labels_path.display()
            )));
        }
        Ok(Self {
            labels: PendingFile::create(labels_path)?,
            sources: PendingFile::create(sources_path)?,
            rows: 0,
            finished: false,
        })
    }

    /// Rows written to each file so far
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl FactSink for TsvSink {
    fn write(&mut self, fact: &LabelFact, source: &SourceFact) -> Result<()> {
        writeln!(
            self.labels.writer()?,
            "{}\t{}\t{}\t{}",
            source.fact_ref, fact.entity, fact.relation, fact.literal
        )?;
        writeln!(
            self.sources.writer()?,
            "{}\t{}\t\"{}\"",
            source.fact_ref, source.source_url, source.extractor_name
        )?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.labels.commit()?;
        self.sources.commit()?;
        self.finished = true;
        Ok(())
    }
}

/// Sink wrapper dropping facts whose reference was already written in the
/// current group
///
/// Repeats only arise within one entity or item, so the set of seen
/// references is cleared at every group end and stays small.
pub struct Deduplicating<S> {
    inner: S,
    seen: HashSet<String>,
    dropped: u64,
}

impl<S: FactSink> Deduplicating<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            dropped: 0,
        }
    }

    /// Number of duplicate facts dropped
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FactSink> FactSink for Deduplicating<S> {
    fn write(&mut self, fact: &LabelFact, source: &SourceFact) -> Result<()> {
        if !self.seen.insert(source.fact_ref.clone()) {
            self.dropped += 1;
            return Ok(());
        }
        self.inner.write(fact, source)
    }

    fn end_group(&mut self) -> Result<()> {
        self.seen.clear();
        self.inner.end_group()
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wdlabel_common::{LanguageLiteral, Provenance, Relation};

    fn fact(text: &str) -> (LabelFact, SourceFact) {
        let fact = LabelFact::new(
            "<Mercury_(planet)>",
            Relation::Label,
            LanguageLiteral::new(text, "eng"),
        );
        let source = Provenance::new("<http://wikidata.org>", "WikidataLabelExtractor").attribute(&fact);
        (fact, source)
    }

    #[test]
    fn test_tsv_sink_materializes_on_finish() {
        let dir = TempDir::new().unwrap();
        let labels = dir.path().join("labels.tsv");
        let sources = dir.path().join("sources.tsv");

        let mut sink = TsvSink::create(&labels, &sources).unwrap();
        let (f, s) = fact("Mercury");
        sink.write(&f, &s).unwrap();

        assert!(!labels.exists(), "Dataset must not appear before finish");
        assert!(dir.path().join("labels.tsv.tmp").exists());

        sink.finish().unwrap();
        assert_eq!(sink.rows(), 1);
        assert!(!dir.path().join("labels.tsv.tmp").exists());

        let label_text = fs::read_to_string(&labels).unwrap();
        let source_text = fs::read_to_string(&sources).unwrap();
        assert_eq!(
            label_text,
            format!("{}\t<Mercury_(planet)>\trdfs:label\t\"Mercury\"@eng\n", s.fact_ref)
        );
        assert_eq!(
            source_text,
            format!("{}\t<http://wikidata.org>\t\"WikidataLabelExtractor\"\n", s.fact_ref)
        );
    }

    #[test]
    fn test_unfinished_tsv_sink_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        let labels = dir.path().join("labels.tsv");
        let sources = dir.path().join("sources.tsv");

        {
            let mut sink = TsvSink::create(&labels, &sources).unwrap();
            let (f, s) = fact("Mercury");
            sink.write(&f, &s).unwrap();
            assert!(dir.path().join("sources.tsv.tmp").exists());
        }

        let left: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(left.is_empty(), "left behind {:?}", left);
    }

    #[test]
    fn test_tsv_sink_rejects_shared_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("same.tsv");
        assert!(matches!(TsvSink::create(&path, &path), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_deduplicating_drops_repeated_facts() {
        let mut sink = Deduplicating::new(MemorySink::new());
        let (a, sa) = fact("Mercury");
        let (b, sb) = fact("Mercury (planet)");

        sink.write(&a, &sa).unwrap();
        sink.write(&b, &sb).unwrap();
        sink.write(&a, &sa).unwrap();
        sink.finish().unwrap();

        assert_eq!(sink.dropped(), 1);
        let inner = sink.into_inner();
        assert_eq!(inner.labels, vec![a, b]);
        assert_eq!(inner.sources.len(), 2);
        assert!(inner.finished);
    }

    #[test]
    fn test_deduplicating_forgets_at_group_end() {
        let mut sink = Deduplicating::new(MemorySink::new());
        let (a, sa) = fact("Mercury");

        sink.write(&a, &sa).unwrap();
        sink.end_group().unwrap();
        sink.write(&a, &sa).unwrap();
        sink.write(&a, &sa).unwrap();
        sink.end_group().unwrap();

        assert_eq!(sink.dropped(), 1);
        let inner = sink.into_inner();
        assert_eq!(inner.labels.len(), 2);
        assert_eq!(inner.groups, 2);
    }
}
