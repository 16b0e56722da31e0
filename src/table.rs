use std::collections::HashSet;

use camino::Utf8Path;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::EngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows<C, R, V>(columns: C, rows: R) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = V>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut table = Self::new(columns.into_iter().map(Into::into).collect());
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect());
        }
        table
    }

    pub fn read_delimited(path: &Utf8Path, delimiter: u8) -> Result<Self, EngineError> {
        let config_error = |reason: String| EngineError::Configuration {
            path: path.to_string(),
            reason,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path.as_std_path())
            .map_err(|err| config_error(err.to_string()))?;

        let columns = reader
            .headers()
            .map_err(|err| config_error(err.to_string()))?
            .iter()
            .map(|name| name.trim().to_string())
            .collect::<Vec<_>>();
        if columns.iter().all(|name| name.is_empty()) {
            return Err(config_error("missing header row".to_string()));
        }

        let mut table = Self::new(columns);
        for record in reader.records() {
            let record = record.map_err(|err| config_error(err.to_string()))?;
            table.push_row(record.iter().map(|cell| cell.trim().to_string()).collect());
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&[String]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| predicate(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    pub fn dedup_rows(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
    }
}

struct RecordRef<'a> {
    columns: &'a [String],
    row: &'a [String],
}

impl Serialize for RecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row) {
            if value.is_empty() {
                map.serialize_entry(column, &Option::<&str>::None)?;
            } else {
                map.serialize_entry(column, value)?;
            }
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RecordRef {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_header() {
        let table = Table::from_rows(["a", "b", "c"], [vec!["1"], vec!["1", "2", "3", "4"]]);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_eq!(table.rows()[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn dedup_keeps_first() {
        let mut table = Table::from_rows(["a"], [["x"], ["y"], ["x"]]);
        table.dedup_rows();
        assert_eq!(table.column(0).collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn serializes_as_records() {
        let table = Table::from_rows(["Sample", "KO"], [["S1", ""]]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"Sample":"S1","KO":null}]"#);
    }
}
