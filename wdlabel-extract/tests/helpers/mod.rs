//! Test Helper Utilities
//!
//! Fixture datasets and dump for the label stage

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const IN_LANGUAGE: &str = "<http://schema.org/inLanguage>";
const RDF_TYPE: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>";
const ITEM: &str = "<http://wikiba.se/ontology#Item>";

pub const TRANSITIVE_TYPE: &str = "\
# entity types
<id_1>\t<Mercury_(planet)>\trdf:type\t<wordnet_planet>
<id_2>\t<Venus>\trdf:type\t<wordnet_planet>
<id_3>\t<Venus>\trdf:type\t<wordnet_celestial_body>
<Smith,_John>\trdf:type\t<wordnet_person>
";

pub const LANGUAGE_CODES: &str = "\
\"de\"\t<hasThreeLetterLanguageCode>\t\"deu\"
\"en\"\t<hasThreeLetterLanguageCode>\t\"eng\"
\"fr\"\t<hasThreeLetterLanguageCode>\t\"fra\"
\"de\"\t<hasTwoLetterLanguageCode>\t\"de\"
";

/// N-Triples line assigning `language` to the Wikipedia article `title`
pub fn article(language: &str, title: &str) -> String {
    format!(
        "<https://{}.wikipedia.org/wiki/{}> {} \"{}\" .\n",
        language, title, IN_LANGUAGE, language
    )
}

/// N-Triples line starting a new item
pub fn item(id: &str) -> String {
    format!("<http://www.wikidata.org/entity/{}> {} {} .\n", id, RDF_TYPE, ITEM)
}

/// Dump with two complete items and a trailing unflushed one
pub fn planets_dump() -> String {
    let mut dump = String::from("# wikidata sample\n");
    dump += &item("Q308");
    dump += "<https://en.wikipedia.org/wiki/Mercury_(planet)> <http://schema.org/about> <http://www.wikidata.org/entity/Q308> .\n";
    dump += &article("en", "Mercury_(planet)");
    dump += &article("de", "Merkur_(Planet)");
    dump += &item("Q313");
    dump += &article("en", "Venus");
    dump += &article("fr", "V%C3%A9nus_(plan%C3%A8te)");
    dump += &item("Q111");
    dump += &article("en", "Mars");
    dump += &article("de", "Mars_(Planet)");
    dump
}

/// Themes directory holding the input datasets, and a dump next to it
pub struct Fixture {
    pub dir: TempDir,
    pub themes_dir: PathBuf,
    pub dump: PathBuf,
}

impl Fixture {
    pub fn new(dump: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let themes_dir = dir.path().join("themes");
        fs::create_dir_all(&themes_dir).unwrap();
        fs::write(themes_dir.join("yagoTransitiveType.tsv"), TRANSITIVE_TYPE).unwrap();
        fs::write(themes_dir.join("languageCodeMappings.tsv"), LANGUAGE_CODES).unwrap();

        let dump_path = dir.path().join("wikidata.nt");
        fs::write(&dump_path, dump).unwrap();

        Self {
            dir,
            themes_dir,
            dump: dump_path,
        }
    }

    pub fn dataset(&self, theme: &str) -> PathBuf {
        self.themes_dir.join(format!("{}.tsv", theme))
    }
}

/// Tab-separated columns of every line in `path`
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').map(String::from).collect())
        .collect()
}

/// `(entity, relation, literal)` of every label row in `path`
pub fn read_labels(path: &Path) -> Vec<(String, String, String)> {
    read_rows(path)
        .into_iter()
        .map(|row| {
            assert_eq!(row.len(), 4, "label row has four columns: {:?}", row);
            (row[1].clone(), row[2].clone(), row[3].clone())
        })
        .collect()
}
