use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::columns::{CanonicalField, ColumnResolver};
use crate::error::EngineError;
use crate::table::Table;

static SCORE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^value_(?P<endpoint>(?P<prefix>[A-Za-z]+)_.+)$").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SuperCategory {
    #[serde(rename = "Nuclear Response")]
    NuclearResponse,
    #[serde(rename = "Stress Response")]
    StressResponse,
    #[serde(rename = "Genomic")]
    Genomic,
    #[serde(rename = "Environmental")]
    Environmental,
    #[serde(rename = "Organic")]
    Organic,
}

impl SuperCategory {
    pub const ALL: [SuperCategory; 5] = [
        SuperCategory::NuclearResponse,
        SuperCategory::StressResponse,
        SuperCategory::Genomic,
        SuperCategory::Environmental,
        SuperCategory::Organic,
    ];

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_uppercase().as_str() {
            "NR" => Some(SuperCategory::NuclearResponse),
            "SR" => Some(SuperCategory::StressResponse),
            "GEN" => Some(SuperCategory::Genomic),
            "ENV" => Some(SuperCategory::Environmental),
            "ORG" => Some(SuperCategory::Organic),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuperCategory::NuclearResponse => "Nuclear Response",
            SuperCategory::StressResponse => "Stress Response",
            SuperCategory::Genomic => "Genomic",
            SuperCategory::Environmental => "Environmental",
            SuperCategory::Organic => "Organic",
        }
    }
}

impl fmt::Display for SuperCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToxicityObservation {
    pub compound_id: String,
    pub endpoint: String,
    pub toxicity_score: f64,
    pub super_category: SuperCategory,
    pub endpoint_prefix: String,
}

struct ScoreColumn {
    index: usize,
    endpoint: String,
    prefix: String,
    category: SuperCategory,
}

fn score_columns(columns: &[String]) -> (Vec<ScoreColumn>, usize) {
    let mut mapped = Vec::new();
    let mut unmapped = 0;
    for (index, name) in columns.iter().enumerate() {
        let Some(caps) = SCORE_COLUMN.captures(name) else {
            continue;
        };
        let prefix = &caps["prefix"];
        match SuperCategory::from_prefix(prefix) {
            Some(category) => mapped.push(ScoreColumn {
                index,
                endpoint: caps["endpoint"].to_string(),
                prefix: prefix.to_string(),
                category,
            }),
            None => unmapped += 1,
        }
    }
    (mapped, unmapped)
}

pub fn reshape(wide: &Table) -> Result<Vec<ToxicityObservation>, EngineError> {
    let compound_col = ColumnResolver::new(wide).require(CanonicalField::CompoundId)?;
    let (columns, unmapped) = score_columns(wide.columns());
    let has_score_columns = columns.len() + unmapped > 0;
    if !has_score_columns {
        return Err(EngineError::missing_column("value_*", wide.columns()));
    }

    // Only the compound id and score columns take part in row deduplication.
    let mut selected = Table::new(
        std::iter::once(compound_col)
            .chain(columns.iter().map(|column| column.index))
            .map(|idx| wide.columns()[idx].clone())
            .collect(),
    );
    for row in wide.rows() {
        selected.push_row(
            std::iter::once(compound_col)
                .chain(columns.iter().map(|column| column.index))
                .map(|idx| row[idx].clone())
                .collect(),
        );
    }
    selected.dedup_rows();

    let mut seen = HashSet::new();
    let mut observations = Vec::new();
    let mut dropped_scores = 0usize;
    for row in selected.rows() {
        let compound_id = &row[0];
        for (offset, column) in columns.iter().enumerate() {
            let Some(score) = coerce_score(&row[offset + 1]) else {
                dropped_scores += 1;
                continue;
            };
            let key = (
                compound_id.clone(),
                column.endpoint.clone(),
                score.to_bits(),
                column.category,
            );
            if !seen.insert(key) {
                continue;
            }
            observations.push(ToxicityObservation {
                compound_id: compound_id.clone(),
                endpoint: column.endpoint.clone(),
                toxicity_score: score,
                super_category: column.category,
                endpoint_prefix: column.prefix.clone(),
            });
        }
    }

    debug!(
        compounds = selected.len(),
        endpoints = columns.len(),
        unmapped_endpoints = unmapped,
        dropped_scores,
        observations = observations.len(),
        "reshaped toxicity table"
    );
    Ok(observations)
}

fn coerce_score(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|score| score.is_finite())
}

pub fn pivot_scores(
    observations: &[ToxicityObservation],
) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for observation in observations {
        matrix
            .entry(observation.compound_id.clone())
            .or_default()
            .insert(observation.endpoint.clone(), observation.toxicity_score);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_case_insensitive() {
        assert_eq!(SuperCategory::from_prefix("gen"), Some(SuperCategory::Genomic));
        assert_eq!(SuperCategory::from_prefix("ZZ"), None);
    }

    #[test]
    fn non_numeric_scores_are_dropped() {
        assert_eq!(coerce_score(" 0.25 "), Some(0.25));
        assert_eq!(coerce_score(""), None);
        assert_eq!(coerce_score("High Safety"), None);
        assert_eq!(coerce_score("NaN"), None);
    }

    #[test]
    fn score_column_pattern() {
        let columns = ["value_NR_AR", "label_NR_AR", "value_ZZ_unknown", "value_"]
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let (mapped, unmapped) = score_columns(&columns);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].endpoint, "NR_AR");
        assert_eq!(mapped[0].prefix, "NR");
        assert_eq!(unmapped, 1);
    }
}
