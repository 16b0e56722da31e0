use std::collections::BTreeSet;
use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use biorem_engine::catalog::ReferenceCatalog;
use biorem_engine::config::{Config, ConfigLoader, SourceEntry, SourceEntryObject};
use biorem_engine::domain::ReferenceSource;
use biorem_engine::error::EngineError;

fn write_catalog(dir: &std::path::Path) {
    fs::write(
        dir.join("database.csv"),
        "ko;cpd;compoundname;genesymbol;referenceAG;compoundclass;enzyme_activity\n\
         K00001;C0001;Compound A;adhE;EPA;X;dehydrogenase\n\
         k00002 ;C0002;Compound B;alkB;EPA;X\n",
    )
    .unwrap();
    fs::write(
        dir.join("hadeg.tsv"),
        "Gene\tko_id\tPathway\tcompound_pathway\nalkB\tK00002\tA_Terminal oxidation\tAlkanes\n",
    )
    .unwrap();
    fs::write(
        dir.join("toxcsm.csv"),
        "SMILES;cpd;value_NR_AR\nCCO;C0001;0.8\n",
    )
    .unwrap();
    fs::write(
        dir.join("kegg_degradation.csv"),
        "ko;pathname;genesymbol\nK00001;Glycolysis;adhE\n",
    )
    .unwrap();
}

fn config_for(dir: &std::path::Path) -> Config {
    let mut config = Config {
        catalog_dir: Some(dir.to_str().unwrap().to_string()),
        ..Config::default()
    };
    config.sources.insert(
        ReferenceSource::Degradation,
        SourceEntry::Shorthand("hadeg.tsv".to_string()),
    );
    config
}

#[test]
fn loads_catalog_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let resolved = ConfigLoader::resolve_config(config_for(dir.path())).unwrap();
    let catalog = ReferenceCatalog::load(&resolved.catalog).unwrap();

    assert_eq!(catalog.table(ReferenceSource::Bioremediation).len(), 2);
    // Short rows are padded, keys are normalized for lookup.
    let row = catalog
        .lookup(ReferenceSource::Bioremediation, "K00002")
        .next()
        .unwrap();
    assert_eq!(row[6], "");
    assert_eq!(catalog.lookup(ReferenceSource::Degradation, "k00002").count(), 1);
    assert_eq!(
        catalog.compounds_in_class("X").unwrap(),
        ["C0001", "C0002"]
            .iter()
            .map(|c| c.to_string())
            .collect::<BTreeSet<_>>()
    );

    let inventory = catalog.inventory();
    assert_eq!(inventory.len(), 4);
    assert_eq!(inventory[2].source, ReferenceSource::Toxicity);
    assert_eq!(inventory[2].join_column, "cpd");
}

#[test]
fn missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    fs::remove_file(dir.path().join("toxcsm.csv")).unwrap();
    let resolved = ConfigLoader::resolve_config(config_for(dir.path())).unwrap();
    let err = ReferenceCatalog::load(&resolved.catalog).unwrap_err();
    assert_matches!(
        err,
        EngineError::Configuration { ref path, .. } if path.ends_with("toxcsm.csv")
    );
}

#[test]
fn missing_join_key_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    fs::write(dir.path().join("other.csv"), "gene,pathway\nalkB,x\n").unwrap();
    let mut config = config_for(dir.path());
    config.sources.insert(
        ReferenceSource::Pathway,
        SourceEntry::Detailed(SourceEntryObject {
            file: "other.csv".to_string(),
            delimiter: Some(",".to_string()),
        }),
    );
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(
        resolved.catalog.source(ReferenceSource::Pathway).path,
        Utf8PathBuf::from(dir.path().to_str().unwrap()).join("other.csv")
    );
    let err = ReferenceCatalog::load(&resolved.catalog).unwrap_err();
    assert_matches!(
        err,
        EngineError::Configuration { ref reason, .. } if reason.contains("`KO`")
    );
}
