use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_ORTHOLOG_PREFIX, ReferenceSource};
use crate::error::EngineError;

pub const DEFAULT_CONFIG_FILE: &str = "biorem.json";
pub const DEFAULT_SAMPLE_MARKER: char = '>';

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub catalog_dir: Option<String>,
    #[serde(default)]
    pub upload: Option<UploadEntry>,
    #[serde(default)]
    pub sources: BTreeMap<ReferenceSource, SourceEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadEntry {
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub ortholog_prefix: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Shorthand(String),
    Detailed(SourceEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SourceEntryObject {
    pub file: String,
    #[serde(default)]
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub marker: char,
    pub ortholog_prefix: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            marker: DEFAULT_SAMPLE_MARKER,
            ortholog_prefix: DEFAULT_ORTHOLOG_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    pub delimiter: u8,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub sources: BTreeMap<ReferenceSource, SourceFile>,
}

impl CatalogSettings {
    pub fn source(&self, source: ReferenceSource) -> &SourceFile {
        &self.sources[&source]
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub upload: UploadSettings,
    pub catalog: CatalogSettings,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, EngineError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| EngineError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| EngineError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, EngineError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let catalog_dir = Utf8PathBuf::from(config.catalog_dir.as_deref().unwrap_or("data"));

        let upload = match config.upload {
            Some(entry) => resolve_upload(entry)?,
            None => UploadSettings::default(),
        };

        let mut entries = config.sources;
        let sources = ReferenceSource::ALL
            .into_iter()
            .map(|source| {
                let (file, delimiter) = match entries.remove(&source) {
                    Some(SourceEntry::Shorthand(file)) => (file, None),
                    Some(SourceEntry::Detailed(obj)) => (obj.file, obj.delimiter),
                    None => (default_source_file(source).to_string(), None),
                };
                let path = catalog_dir.join(file);
                let delimiter = match delimiter {
                    Some(value) => parse_delimiter(&value)?,
                    None => default_delimiter(&path),
                };
                Ok((source, SourceFile { path, delimiter }))
            })
            .collect::<Result<BTreeMap<_, _>, EngineError>>()?;

        Ok(ResolvedConfig {
            schema_version,
            upload,
            catalog: CatalogSettings { sources },
        })
    }
}

fn resolve_upload(entry: UploadEntry) -> Result<UploadSettings, EngineError> {
    let marker = match entry.marker {
        Some(value) => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if !ch.is_whitespace() => ch,
                _ => {
                    return Err(EngineError::ConfigParse(format!(
                        "upload marker must be a single character, got {value:?}"
                    )));
                }
            }
        }
        None => DEFAULT_SAMPLE_MARKER,
    };
    let ortholog_prefix = match entry.ortholog_prefix {
        Some(value) if value.trim().is_empty() => {
            return Err(EngineError::ConfigParse(
                "ortholog prefix must not be empty".to_string(),
            ));
        }
        Some(value) => value.trim().to_string(),
        None => DEFAULT_ORTHOLOG_PREFIX.to_string(),
    };
    Ok(UploadSettings {
        marker,
        ortholog_prefix,
    })
}

fn parse_delimiter(value: &str) -> Result<u8, EngineError> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Ok(value.as_bytes()[0]),
        _ => Err(EngineError::ConfigParse(format!(
            "delimiter must be a single ASCII character, got {value:?}"
        ))),
    }
}

fn default_delimiter(path: &Utf8PathBuf) -> u8 {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b';',
    }
}

pub fn default_source_file(source: ReferenceSource) -> &'static str {
    match source {
        ReferenceSource::Bioremediation => "database.csv",
        ReferenceSource::Degradation => "hadeg.csv",
        ReferenceSource::Toxicity => "toxcsm.csv",
        ReferenceSource::Pathway => "kegg_degradation.csv",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.upload, UploadSettings::default());
        let bioremediation = resolved.catalog.source(ReferenceSource::Bioremediation);
        assert_eq!(bioremediation.path, Utf8PathBuf::from("data/database.csv"));
        assert_eq!(bioremediation.delimiter, b';');
    }

    #[test]
    fn tsv_defaults_to_tab() {
        let mut config = Config::default();
        config.sources.insert(
            ReferenceSource::Pathway,
            SourceEntry::Shorthand("kegg.tsv".to_string()),
        );
        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.catalog.source(ReferenceSource::Pathway).delimiter, b'\t');
    }
}
