//! End-to-end runs of the label stage over fixture datasets

mod helpers;

use helpers::{article, item, planets_dump, read_labels, read_rows, Fixture};
use std::fs;
use std::sync::Arc;
use wdlabel_common::config::TomlConfig;
use wdlabel_common::{DatasetRegistry, Error, Scheduler, Stage};
use wdlabel_extract::{EnglishRanking, LabelStage};

const OUTPUTS: [&str; 4] = [
    "wikipediaLabels",
    "wikipediaLabelSources",
    "wikidataMultiLabels",
    "wikidataMultiLabelSources",
];

fn run_stage(fixture: &Fixture, config: &TomlConfig) -> wdlabel_common::Result<LabelStage> {
    let mut stage = LabelStage::from_config(config, &fixture.dump);
    stage.run(&DatasetRegistry::new(&fixture.themes_dir))?;
    Ok(stage)
}

#[test]
fn test_scheduler_runs_label_stage() {
    let fixture = Fixture::new(&planets_dump());
    let config = TomlConfig::default();

    let mut scheduler = Scheduler::new(DatasetRegistry::new(&fixture.themes_dir));
    scheduler.add_stage(Box::new(LabelStage::from_config(&config, &fixture.dump)));
    let reports = scheduler.run().unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.stage, "wikidata-labels");
    assert_eq!(report.get("entities"), Some(3));
    assert_eq!(report.get("language_map_entries"), Some(3));
    assert_eq!(report.get("english_facts"), Some(8));
    assert_eq!(report.get("triples"), Some(10));
    assert_eq!(report.get("boundaries"), Some(3));
    assert_eq!(report.get("flushes"), Some(2));
    assert_eq!(report.get("matched_items"), Some(2));
    assert_eq!(report.get("multilingual_facts"), Some(9));
    assert_eq!(report.get("discarded_languages"), Some(2));

    for theme in OUTPUTS {
        assert!(fixture.dataset(theme).exists(), "{} materialized", theme);
        assert!(!fixture.themes_dir.join(format!("{}.tsv.tmp", theme)).exists());
    }
}

#[test]
fn test_english_labels() {
    let fixture = Fixture::new(&planets_dump());
    run_stage(&fixture, &TomlConfig::default()).unwrap();

    let labels = read_labels(&fixture.dataset("wikipediaLabels"));
    let expected: Vec<(&str, &str, &str)> = vec![
        ("<Mercury_(planet)>", "<hasPreferredName>", "\"Mercury (planet)\"@eng"),
        ("<Mercury_(planet)>", "rdfs:label", "\"Mercury\"@eng"),
        ("<Mercury_(planet)>", "rdfs:label", "\"Mercury (planet)\"@eng"),
        ("<Smith,_John>", "<hasPreferredName>", "\"Smith, John\"@eng"),
        ("<Smith,_John>", "rdfs:label", "\"Smith\"@eng"),
        ("<Smith,_John>", "rdfs:label", "\"Smith, John\"@eng"),
        ("<Venus>", "<hasPreferredName>", "\"Venus\"@eng"),
        ("<Venus>", "rdfs:label", "\"Venus\"@eng"),
    ];
    let actual: Vec<(&str, &str, &str)> = labels
        .iter()
        .map(|(e, r, l)| (e.as_str(), r.as_str(), l.as_str()))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_multilingual_labels() {
    let fixture = Fixture::new(&planets_dump());
    run_stage(&fixture, &TomlConfig::default()).unwrap();

    let labels = read_labels(&fixture.dataset("wikidataMultiLabels"));
    let literals: Vec<(&str, &str)> = labels
        .iter()
        .map(|(entity, relation, literal)| {
            assert_eq!(relation, "rdfs:label");
            (entity.as_str(), literal.as_str())
        })
        .collect();

    assert_eq!(
        literals,
        vec![
            ("<Mercury_(planet)>", "\"Merkur\"@deu"),
            ("<Mercury_(planet)>", "\"Merkur (Planet)\"@deu"),
            ("<Mercury_(planet)>", "\"Mercury\"@eng"),
            ("<Mercury_(planet)>", "\"Mercury (planet)\"@eng"),
            ("<Venus>", "\"Venus\"@eng"),
            ("<Venus>", "\"Venus\"@fra"),
            ("<Venus>", "\"Venus (planete)\"@fra"),
            ("<Venus>", "\"Vénus\"@fra"),
            ("<Venus>", "\"Vénus (planète)\"@fra"),
        ]
    );
}

#[test]
fn test_sources_parallel_labels() {
    let fixture = Fixture::new(&planets_dump());
    run_stage(&fixture, &TomlConfig::default()).unwrap();

    for (labels, sources) in [
        ("wikipediaLabels", "wikipediaLabelSources"),
        ("wikidataMultiLabels", "wikidataMultiLabelSources"),
    ] {
        let label_rows = read_rows(&fixture.dataset(labels));
        let source_rows = read_rows(&fixture.dataset(sources));
        assert_eq!(label_rows.len(), source_rows.len());

        for (label, source) in label_rows.iter().zip(&source_rows) {
            assert_eq!(label[0], source[0], "fact references pair up");
            assert!(label[0].starts_with("<id_"));
            assert_eq!(source[1], "<http://wikidata.org>");
            assert_eq!(source[2], "\"WikidataLabelExtractor\"");
        }
    }
}

#[test]
fn test_runs_are_byte_identical() {
    let first = Fixture::new(&planets_dump());
    let second = Fixture::new(&planets_dump());
    run_stage(&first, &TomlConfig::default()).unwrap();
    run_stage(&second, &TomlConfig::default()).unwrap();

    for theme in OUTPUTS {
        let a = fs::read(first.dataset(theme)).unwrap();
        let b = fs::read(second.dataset(theme)).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b, "{} differs between runs", theme);
    }
}

#[test]
fn test_missing_dump_writes_nothing() {
    let fixture = Fixture::new("");
    fs::remove_file(&fixture.dump).unwrap();

    let err = run_stage(&fixture, &TomlConfig::default()).err().unwrap();
    assert!(matches!(err, Error::Config(_)), "got {:?}", err);
    for theme in OUTPUTS {
        assert!(!fixture.dataset(theme).exists());
    }
}

#[test]
fn test_malformed_dump_line_aborts() {
    let mut dump = item("Q308");
    dump += &article("en", "Mercury_(planet)");
    dump += "<https://de.wikipedia.org/wiki/Merkur> <http://schema.org/inLanguage>\n";
    dump += &item("Q313");
    let fixture = Fixture::new(&dump);

    match run_stage(&fixture, &TomlConfig::default()) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other.err()),
    }
    for theme in ["wikidataMultiLabels", "wikidataMultiLabelSources"] {
        assert!(!fixture.dataset(theme).exists());
        assert!(!fixture.themes_dir.join(format!("{}.tsv.tmp", theme)).exists());
    }
}

#[test]
fn test_missing_input_blocks_stage() {
    let fixture = Fixture::new(&planets_dump());
    fs::remove_file(fixture.dataset("languageCodeMappings")).unwrap();

    let mut scheduler = Scheduler::new(DatasetRegistry::new(&fixture.themes_dir));
    scheduler.add_stage(Box::new(LabelStage::from_config(
        &TomlConfig::default(),
        &fixture.dump,
    )));

    match scheduler.run() {
        Err(Error::MissingDataset(message)) => {
            assert!(message.contains("languageCodeMappings"), "{}", message)
        }
        other => panic!("expected missing dataset, got {:?}", other),
    }
}

/// Dump whose item lists the same title under `de` and `deu`
fn duplicate_language_dump() -> String {
    let mut dump = item("Q313");
    dump += &article("en", "Venus");
    dump += &article("de", "Venus_(Planet)");
    dump += &article("deu", "Venus_(Planet)");
    dump += &item("Q111");
    dump
}

#[test]
fn test_duplicate_facts_dropped() {
    let fixture = Fixture::new(&duplicate_language_dump());
    let stage = run_stage(&fixture, &TomlConfig::default()).unwrap();

    let labels = read_labels(&fixture.dataset("wikidataMultiLabels"));
    assert_eq!(labels.len(), 3);
    assert_eq!(stage.stats().duplicates_dropped, 2);
    assert_eq!(stage.stats().multilingual_facts, 3);
}

#[test]
fn test_duplicate_facts_kept_without_deduplication() {
    let fixture = Fixture::new(&duplicate_language_dump());
    let mut config = TomlConfig::default();
    config.output.deduplicate = false;
    let stage = run_stage(&fixture, &config).unwrap();

    let labels = read_labels(&fixture.dataset("wikidataMultiLabels"));
    assert_eq!(labels.len(), 5);
    assert_eq!(stage.stats().duplicates_dropped, 0);
}

#[test]
fn test_configured_provenance() {
    let fixture = Fixture::new(&planets_dump());
    let mut config = TomlConfig::default();
    config.provenance.source_url = "<http://example.org/dump>".to_string();
    config.provenance.extractor_name = "TestExtractor".to_string();
    run_stage(&fixture, &config).unwrap();

    let rows = read_rows(&fixture.dataset("wikidataMultiLabelSources"));
    assert!(rows
        .iter()
        .all(|r| r[1] == "<http://example.org/dump>" && r[2] == "\"TestExtractor\""));
}

#[test]
fn test_injected_ranking_changes_entity() {
    /// Prefers German over everything else
    struct GermanFirst;
    impl EnglishRanking for GermanFirst {
        fn most_english<'a>(&self, codes: &mut dyn Iterator<Item = &'a str>) -> Option<&'a str> {
            let codes: Vec<&'a str> = codes.collect();
            codes
                .iter()
                .copied()
                .find(|c| *c == "de")
                .or_else(|| codes.iter().copied().min())
        }
    }

    let fixture = Fixture::new(&planets_dump());
    let mut stage = LabelStage::from_config(&TomlConfig::default(), &fixture.dump)
        .with_ranking(Arc::new(GermanFirst));
    stage.run(&DatasetRegistry::new(&fixture.themes_dir)).unwrap();

    // Mercury now maps to <de/Merkur_(Planet)>, which is unknown
    let labels = read_labels(&fixture.dataset("wikidataMultiLabels"));
    assert!(labels.iter().all(|(entity, _, _)| entity == "<Venus>"));
    assert_eq!(stage.stats().unknown_entities, 1);
    assert_eq!(stage.stats().matched_items, 1);
}
