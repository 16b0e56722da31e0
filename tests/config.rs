use std::fs;

use assert_matches::assert_matches;

use biorem_engine::config::ConfigLoader;
use biorem_engine::domain::ReferenceSource;
use biorem_engine::error::EngineError;

#[test]
fn reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("biorem.json");
    fs::write(
        &path,
        r#"{
            "catalog_dir": "/srv/catalogs",
            "upload": { "marker": "@", "ortholog_prefix": "K" },
            "sources": {
                "bioremediation": "biorempp.csv",
                "toxicity": { "file": "toxcsm.txt", "delimiter": "\t" }
            }
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.upload.marker, '@');
    let bioremediation = resolved.catalog.source(ReferenceSource::Bioremediation);
    assert_eq!(bioremediation.path.as_str(), "/srv/catalogs/biorempp.csv");
    assert_eq!(bioremediation.delimiter, b';');
    assert_eq!(
        resolved.catalog.source(ReferenceSource::Toxicity).delimiter,
        b'\t'
    );
    assert_eq!(
        resolved.catalog.source(ReferenceSource::Pathway).path.as_str(),
        "/srv/catalogs/kegg_degradation.csv"
    );
}

#[test]
fn explicit_missing_file_is_error() {
    let err = ConfigLoader::resolve(Some("/nonexistent/biorem.json")).unwrap_err();
    assert_matches!(err, EngineError::ConfigRead(_));
}

#[test]
fn invalid_marker_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("biorem.json");
    fs::write(&path, r#"{ "upload": { "marker": ">>" } }"#).unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(EngineError::ConfigParse(_))
    );
}

#[test]
fn unknown_source_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("biorem.json");
    fs::write(&path, r#"{ "sources": { "chebi": "chebi.csv" } }"#).unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(EngineError::ConfigParse(_))
    );
}
