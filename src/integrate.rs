use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{ReferenceCatalog, ReferenceTable};
use crate::columns::{CanonicalField, ColumnResolver};
use crate::domain::{OrthologRecord, ReferenceSource};
use crate::error::EngineError;
use crate::table::Table;

pub const ENDPOINT_COLUMN_PREFIXES: [&str; 2] = ["value_", "label_"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedTable {
    pub source: ReferenceSource,
    pub table: Table,
}

impl AnnotatedTable {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub source: ReferenceSource,
    pub input_records: usize,
    pub matched_records: usize,
    pub output_rows: usize,
    pub unmatched_orthologs: BTreeSet<String>,
}

impl JoinReport {
    pub fn dropped_records(&self) -> usize {
        self.input_records - self.matched_records
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Integration {
    pub tables: BTreeMap<ReferenceSource, AnnotatedTable>,
    pub reports: Vec<JoinReport>,
}

impl Integration {
    pub fn table(&self, source: ReferenceSource) -> &AnnotatedTable {
        &self.tables[&source]
    }

    pub fn report(&self, source: ReferenceSource) -> Option<&JoinReport> {
        self.reports.iter().find(|report| report.source == source)
    }
}

pub fn integrate(
    records: &[OrthologRecord],
    catalog: &ReferenceCatalog,
) -> Result<Integration, EngineError> {
    if records.is_empty() {
        return Err(EngineError::Validation { lines: 0 });
    }

    let joined = ReferenceSource::ALL
        .par_iter()
        .map(|source| integrate_source(records, catalog, *source))
        .collect::<Result<Vec<_>, EngineError>>()?;

    let mut tables = BTreeMap::new();
    let mut reports = Vec::with_capacity(joined.len());
    for (annotated, report) in joined {
        tables.insert(annotated.source, annotated);
        reports.push(report);
    }
    Ok(Integration { tables, reports })
}

pub fn integrate_source(
    records: &[OrthologRecord],
    catalog: &ReferenceCatalog,
    source: ReferenceSource,
) -> Result<(AnnotatedTable, JoinReport), EngineError> {
    let (table, report) = match source {
        ReferenceSource::Toxicity => join_toxicity(records, catalog)?,
        _ => join_by_ortholog(records, catalog.source(source), source)?,
    };
    debug!(
        source = source.name(),
        input = report.input_records,
        matched = report.matched_records,
        rows = report.output_rows,
        "joined upload against reference source"
    );
    Ok((AnnotatedTable { source, table }, report))
}

fn canonical_columns(fields: &[CanonicalField]) -> Vec<String> {
    fields
        .iter()
        .map(|field| field.canonical_name().to_string())
        .collect()
}

struct ReportBuilder {
    source: ReferenceSource,
    input_records: usize,
    matched_records: usize,
    unmatched: BTreeSet<String>,
}

impl ReportBuilder {
    fn new(source: ReferenceSource, input_records: usize) -> Self {
        Self {
            source,
            input_records,
            matched_records: 0,
            unmatched: BTreeSet::new(),
        }
    }

    fn record(&mut self, record: &OrthologRecord, produced: usize) {
        if produced > 0 {
            self.matched_records += 1;
        } else {
            self.unmatched.insert(record.ortholog_id.to_string());
        }
    }

    fn finish(self, output_rows: usize) -> JoinReport {
        JoinReport {
            source: self.source,
            input_records: self.input_records,
            matched_records: self.matched_records,
            output_rows,
            unmatched_orthologs: self.unmatched,
        }
    }
}

fn join_by_ortholog(
    records: &[OrthologRecord],
    reference: &ReferenceTable,
    source: ReferenceSource,
) -> Result<(Table, JoinReport), EngineError> {
    let schema = source.schema();
    let mut resolver = ColumnResolver::new(reference.table());
    // Sample and KO come from the upload record, the rest from the reference row.
    let carried = resolver.require_all(&schema[2..])?;

    let mut table = Table::new(canonical_columns(schema));
    let mut report = ReportBuilder::new(source, records.len());
    for record in records {
        let mut produced = 0;
        for row in reference.lookup(record.ortholog_id.as_str()) {
            let mut out = Vec::with_capacity(schema.len());
            out.push(record.sample.clone());
            out.push(record.ortholog_id.to_string());
            out.extend(carried.iter().map(|idx| row[*idx].clone()));
            table.push_row(out);
            produced += 1;
        }
        report.record(record, produced);
    }
    let output_rows = table.len();
    Ok((table, report.finish(output_rows)))
}

// The toxicity catalog is keyed by compound: orthologs reach it through
// the compounds the bioremediation catalog links them to.
fn join_toxicity(
    records: &[OrthologRecord],
    catalog: &ReferenceCatalog,
) -> Result<(Table, JoinReport), EngineError> {
    let bridge = catalog.source(ReferenceSource::Bioremediation);
    let bridge_compound = ColumnResolver::new(bridge.table()).require(CanonicalField::CompoundId)?;

    let toxicity = catalog.source(ReferenceSource::Toxicity);
    let endpoint_columns = endpoint_columns(toxicity.table().columns());

    let mut columns = canonical_columns(ReferenceSource::Toxicity.schema());
    columns.extend(
        endpoint_columns
            .iter()
            .map(|idx| toxicity.table().columns()[*idx].clone()),
    );
    let mut table = Table::new(columns);
    let mut report = ReportBuilder::new(ReferenceSource::Toxicity, records.len());

    for record in records {
        let mut produced = 0;
        for bridge_row in bridge.lookup(record.ortholog_id.as_str()) {
            for row in toxicity.lookup(&bridge_row[bridge_compound]) {
                let mut out = Vec::with_capacity(3 + endpoint_columns.len());
                out.push(record.sample.clone());
                out.push(record.ortholog_id.to_string());
                out.push(row[toxicity.key_column()].clone());
                out.extend(endpoint_columns.iter().map(|idx| row[*idx].clone()));
                table.push_row(out);
                produced += 1;
            }
        }
        report.record(record, produced);
    }
    let output_rows = table.len();
    Ok((table, report.finish(output_rows)))
}

fn endpoint_columns(columns: &[String]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let lower = name.to_ascii_lowercase();
            ENDPOINT_COLUMN_PREFIXES
                .iter()
                .any(|prefix| lower.starts_with(prefix))
        })
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_columns_by_prefix() {
        let columns = ["cpd", "value_NR_AR", "Label_SR_ARE", "SMILES"]
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(endpoint_columns(&columns), vec![1, 2]);
    }
}
