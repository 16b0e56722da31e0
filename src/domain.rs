use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::columns::CanonicalField;
use crate::error::EngineError;

pub const DEFAULT_ORTHOLOG_PREFIX: &str = "K";

pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrthologId(String);

impl OrthologId {
    pub fn with_prefix(value: &str, prefix: &str) -> Option<Self> {
        let normalized = normalize_key(value);
        let prefix = normalize_key(prefix);
        let rest = normalized.strip_prefix(prefix.as_str())?;
        let is_valid = !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_alphanumeric());
        is_valid.then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrthologId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrthologId {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::with_prefix(value, DEFAULT_ORTHOLOG_PREFIX)
            .ok_or_else(|| EngineError::InvalidOrthologId(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrthologRecord {
    pub sample: String,
    pub ortholog_id: OrthologId,
}

impl OrthologRecord {
    pub fn new(sample: impl Into<String>, ortholog_id: OrthologId) -> Self {
        Self {
            sample: sample.into(),
            ortholog_id,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSource {
    Bioremediation,
    Degradation,
    Toxicity,
    Pathway,
}

impl ReferenceSource {
    pub const ALL: [ReferenceSource; 4] = [
        ReferenceSource::Bioremediation,
        ReferenceSource::Degradation,
        ReferenceSource::Toxicity,
        ReferenceSource::Pathway,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReferenceSource::Bioremediation => "bioremediation",
            ReferenceSource::Degradation => "degradation",
            ReferenceSource::Toxicity => "toxicity",
            ReferenceSource::Pathway => "pathway",
        }
    }

    pub fn join_field(&self) -> CanonicalField {
        match self {
            ReferenceSource::Toxicity => CanonicalField::CompoundId,
            _ => CanonicalField::OrthologId,
        }
    }

    // Toxicity tables append the catalog's endpoint columns after these.
    pub fn schema(&self) -> &'static [CanonicalField] {
        match self {
            ReferenceSource::Bioremediation => &[
                CanonicalField::Sample,
                CanonicalField::OrthologId,
                CanonicalField::CompoundId,
                CanonicalField::CompoundName,
                CanonicalField::GeneSymbol,
                CanonicalField::Agency,
                CanonicalField::CompoundClass,
                CanonicalField::EnzymeActivity,
            ],
            ReferenceSource::Degradation => &[
                CanonicalField::Sample,
                CanonicalField::OrthologId,
                CanonicalField::GeneSymbol,
                CanonicalField::Pathway,
                CanonicalField::CompoundPathway,
            ],
            ReferenceSource::Toxicity => &[
                CanonicalField::Sample,
                CanonicalField::OrthologId,
                CanonicalField::CompoundId,
            ],
            ReferenceSource::Pathway => &[
                CanonicalField::Sample,
                CanonicalField::OrthologId,
                CanonicalField::Pathway,
                CanonicalField::GeneSymbol,
            ],
        }
    }
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ReferenceSource {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "bioremediation" | "biorempp" => Ok(ReferenceSource::Bioremediation),
            "degradation" | "hadeg" => Ok(ReferenceSource::Degradation),
            "toxicity" | "toxcsm" => Ok(ReferenceSource::Toxicity),
            "pathway" | "kegg" => Ok(ReferenceSource::Pathway),
            _ => Err(EngineError::UnknownSource(value.to_string())),
        }
    }
}
