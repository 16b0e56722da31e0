use serde::Serialize;

use crate::config::UploadSettings;
use crate::domain::{OrthologId, OrthologRecord};
use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadStats {
    pub lines: usize,
    pub samples: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub orphaned: usize,
}

#[derive(Debug, Clone)]
pub struct UploadParser {
    settings: UploadSettings,
}

impl Default for UploadParser {
    fn default() -> Self {
        Self::new(UploadSettings::default())
    }
}

impl UploadParser {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    pub fn parse(&self, raw: &str) -> Vec<OrthologRecord> {
        self.parse_with_stats(raw).0
    }

    pub fn parse_with_stats(&self, raw: &str) -> (Vec<OrthologRecord>, UploadStats) {
        let mut stats = UploadStats::default();
        let mut records = Vec::new();
        let mut current: Option<String> = None;

        // trim() leaves a leading U+FEFF in place.
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
        for line in raw.lines() {
            stats.lines += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix(self.settings.marker) {
                let name = name.trim();
                // A bare marker closes the previous sample without opening one.
                current = (!name.is_empty()).then(|| name.to_string());
                if current.is_some() {
                    stats.samples += 1;
                }
                continue;
            }
            let Some(sample) = current.as_ref() else {
                stats.orphaned += 1;
                continue;
            };
            match OrthologId::with_prefix(line, &self.settings.ortholog_prefix) {
                Some(id) => {
                    stats.accepted += 1;
                    records.push(OrthologRecord::new(sample.clone(), id));
                }
                None => stats.rejected += 1,
            }
        }

        (records, stats)
    }
}

pub fn validate(records: &[OrthologRecord], stats: &UploadStats) -> Result<(), EngineError> {
    if records.is_empty() {
        return Err(EngineError::Validation { lines: stats.lines });
    }
    Ok(())
}
