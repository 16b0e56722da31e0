use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::EngineError;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CanonicalField {
    Sample,
    OrthologId,
    CompoundId,
    CompoundName,
    CompoundClass,
    GeneSymbol,
    Agency,
    Pathway,
    CompoundPathway,
    EnzymeActivity,
}

impl CanonicalField {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            CanonicalField::Sample => "Sample",
            CanonicalField::OrthologId => "KO",
            CanonicalField::CompoundId => "Compound_ID",
            CanonicalField::CompoundName => "Compound_Name",
            CanonicalField::CompoundClass => "Compound_Class",
            CanonicalField::GeneSymbol => "Gene_Symbol",
            CanonicalField::Agency => "Agency",
            CanonicalField::Pathway => "Pathway",
            CanonicalField::CompoundPathway => "Compound_Pathway",
            CanonicalField::EnzymeActivity => "Enzyme_Activity",
        }
    }

    // Canonical name first, so output tables resolve against themselves.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Sample => &["Sample", "sample", "sample_id", "Sample_ID", "genome"],
            CanonicalField::OrthologId => &[
                "KO",
                "ko",
                "ko_id",
                "KO_ID",
                "ortholog_id",
                "kegg_ko",
                "ko_number",
            ],
            CanonicalField::CompoundId => &[
                "Compound_ID",
                "cpd",
                "compound_id",
                "compoundid",
                "kegg_compound",
                "compoundname",
            ],
            CanonicalField::CompoundName => &[
                "Compound_Name",
                "compoundname",
                "compound_name",
                "Compound",
                "cpd_name",
            ],
            CanonicalField::CompoundClass => &[
                "Compound_Class",
                "compoundclass",
                "compound_class",
                "Class",
                "class",
            ],
            CanonicalField::GeneSymbol => &[
                "Gene_Symbol",
                "genesymbol",
                "gene_symbol",
                "Gene",
                "gene",
                "symbol",
            ],
            CanonicalField::Agency => &["Agency", "referenceAG", "reference_ag", "agency"],
            CanonicalField::Pathway => &[
                "Pathway",
                "pathway",
                "pathname",
                "Pathway_Name",
                "pathway_name",
            ],
            CanonicalField::CompoundPathway => &[
                "Compound_Pathway",
                "compound_pathway",
                "compoundpathway",
            ],
            CanonicalField::EnzymeActivity => &[
                "Enzyme_Activity",
                "enzyme_activity",
                "enzymeactivity",
                "Enzyme",
            ],
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

pub fn resolve(columns: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| columns.iter().position(|column| column == alias))
        .or_else(|| {
            aliases.iter().find_map(|alias| {
                columns
                    .iter()
                    .position(|column| column.eq_ignore_ascii_case(alias))
            })
        })
}

#[derive(Debug)]
pub struct ColumnResolver<'a> {
    columns: &'a [String],
    cache: HashMap<CanonicalField, Option<usize>>,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self::for_columns(table.columns())
    }

    pub fn for_columns(columns: &'a [String]) -> Self {
        Self {
            columns,
            cache: HashMap::new(),
        }
    }

    pub fn find(&mut self, field: CanonicalField) -> Option<usize> {
        let columns = self.columns;
        *self
            .cache
            .entry(field)
            .or_insert_with(|| resolve(columns, field.aliases()))
    }

    pub fn require(&mut self, field: CanonicalField) -> Result<usize, EngineError> {
        self.find(field)
            .ok_or_else(|| EngineError::missing_column(field.canonical_name(), self.columns))
    }

    // Distinct fields must land on distinct columns; a shared fallback alias
    // such as `compoundname` would otherwise copy one column into two fields.
    pub fn require_all(&mut self, fields: &[CanonicalField]) -> Result<Vec<usize>, EngineError> {
        let mut claimed: HashMap<usize, CanonicalField> = HashMap::new();
        let mut indices = Vec::with_capacity(fields.len());
        for field in fields {
            let idx = self.require(*field)?;
            if let Some(first) = claimed.insert(idx, *field)
                && first != *field
            {
                return Err(EngineError::AmbiguousColumn {
                    column: self.columns[idx].clone(),
                    first: first.canonical_name().to_string(),
                    second: field.canonical_name().to_string(),
                });
            }
            indices.push(idx);
        }
        Ok(indices)
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }
}
