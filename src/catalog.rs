use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::columns::{CanonicalField, ColumnResolver};
use crate::config::CatalogSettings;
use crate::domain::{ReferenceSource, normalize_key};
use crate::error::EngineError;
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct ReferenceTable {
    table: Table,
    key_column: usize,
    index: HashMap<String, Vec<usize>>,
}

impl ReferenceTable {
    fn build(source: ReferenceSource, table: Table) -> Result<Self, EngineError> {
        let key_column = ColumnResolver::new(&table).require(source.join_field())?;
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (row_idx, key) in table.column(key_column).enumerate() {
            let key = normalize_key(key);
            if key.is_empty() {
                continue;
            }
            index.entry(key).or_default().push(row_idx);
        }
        Ok(Self {
            table,
            key_column,
            index,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn key_column(&self) -> usize {
        self.key_column
    }

    pub fn lookup<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a [String]> + 'a {
        let rows = self.table.rows();
        self.index
            .get(&normalize_key(key))
            .into_iter()
            .flatten()
            .map(move |idx| rows[*idx].as_slice())
    }

    pub fn distinct_keys(&self) -> usize {
        self.index.len()
    }
}

#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    bioremediation: ReferenceTable,
    degradation: ReferenceTable,
    toxicity: ReferenceTable,
    pathway: ReferenceTable,
}

impl ReferenceCatalog {
    pub fn load(settings: &CatalogSettings) -> Result<Self, EngineError> {
        let mut tables = BTreeMap::new();
        for source in ReferenceSource::ALL {
            let file = settings.source(source);
            let table = Table::read_delimited(&file.path, file.delimiter)?;
            debug!(
                source = source.name(),
                path = %file.path,
                rows = table.len(),
                "loaded reference table"
            );
            let reference =
                ReferenceTable::build(source, table).map_err(|err| EngineError::Configuration {
                    path: file.path.to_string(),
                    reason: err.to_string(),
                })?;
            tables.insert(source, reference);
        }
        Self::from_reference_tables(tables)
    }

    pub fn from_tables(
        bioremediation: Table,
        degradation: Table,
        toxicity: Table,
        pathway: Table,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            bioremediation: ReferenceTable::build(ReferenceSource::Bioremediation, bioremediation)?,
            degradation: ReferenceTable::build(ReferenceSource::Degradation, degradation)?,
            toxicity: ReferenceTable::build(ReferenceSource::Toxicity, toxicity)?,
            pathway: ReferenceTable::build(ReferenceSource::Pathway, pathway)?,
        })
    }

    fn from_reference_tables(
        mut tables: BTreeMap<ReferenceSource, ReferenceTable>,
    ) -> Result<Self, EngineError> {
        let mut take = |source: ReferenceSource| {
            tables.remove(&source).ok_or_else(|| EngineError::Configuration {
                path: source.name().to_string(),
                reason: "source not loaded".to_string(),
            })
        };
        Ok(Self {
            bioremediation: take(ReferenceSource::Bioremediation)?,
            degradation: take(ReferenceSource::Degradation)?,
            toxicity: take(ReferenceSource::Toxicity)?,
            pathway: take(ReferenceSource::Pathway)?,
        })
    }

    pub fn source(&self, source: ReferenceSource) -> &ReferenceTable {
        match source {
            ReferenceSource::Bioremediation => &self.bioremediation,
            ReferenceSource::Degradation => &self.degradation,
            ReferenceSource::Toxicity => &self.toxicity,
            ReferenceSource::Pathway => &self.pathway,
        }
    }

    pub fn table(&self, source: ReferenceSource) -> &Table {
        self.source(source).table()
    }

    pub fn lookup<'a>(
        &'a self,
        source: ReferenceSource,
        key: &str,
    ) -> impl Iterator<Item = &'a [String]> + 'a {
        self.source(source).lookup(key)
    }

    pub fn compounds_in_class(
        &self,
        compound_class: &str,
    ) -> Result<BTreeSet<String>, EngineError> {
        let table = self.bioremediation.table();
        let mut resolver = ColumnResolver::new(table);
        let class_col = resolver.require(CanonicalField::CompoundClass)?;
        let compound_col = resolver.require(CanonicalField::CompoundId)?;
        let wanted = compound_class.trim();
        Ok(table
            .rows()
            .iter()
            .filter(|row| row[class_col].trim() == wanted)
            .map(|row| row[compound_col].trim().to_string())
            .filter(|compound| !compound.is_empty())
            .collect())
    }

    pub fn inventory(&self) -> Vec<SourceInventory> {
        ReferenceSource::ALL
            .into_iter()
            .map(|source| {
                let reference = self.source(source);
                SourceInventory {
                    source,
                    rows: reference.table().len(),
                    distinct_keys: reference.distinct_keys(),
                    join_column: reference.table().columns()[reference.key_column()].clone(),
                    columns: reference.table().columns().to_vec(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInventory {
    pub source: ReferenceSource,
    pub rows: usize,
    pub distinct_keys: usize,
    pub join_column: String,
    pub columns: Vec<String>,
}
