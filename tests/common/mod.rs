#![allow(dead_code)]

use biorem_engine::catalog::ReferenceCatalog;
use biorem_engine::table::Table;

pub fn bioremediation() -> Table {
    Table::from_rows(
        [
            "ko",
            "cpd",
            "compoundname",
            "genesymbol",
            "referenceAG",
            "compoundclass",
            "enzyme_activity",
        ],
        [
            ["K00001", "C0001", "Compound A", "adhE", "EPA", "X", "dehydrogenase"],
            ["K00002", "C0002", "Compound B", "alkB", "EPA", "X", "monooxygenase"],
            ["K00002", "C0002", "Compound B", "alkB", "IARC", "X", "monooxygenase"],
            ["K00003", "C0003", "Compound C", "catA", "WFD", "Y", "dioxygenase"],
        ],
    )
}

pub fn degradation() -> Table {
    Table::from_rows(
        ["Gene", "ko_id", "Pathway", "compound_pathway"],
        [
            ["alkB", "K00002", "A_Terminal oxidation", "Alkanes"],
            ["catA", "K00003", "B_Ortho cleavage", "Aromatics"],
        ],
    )
}

pub fn toxicity() -> Table {
    Table::from_rows(
        [
            "SMILES",
            "cpd",
            "value_NR_AR",
            "label_NR_AR",
            "value_SR_ARE",
            "value_ZZ_unknown",
        ],
        [
            ["CCO", "C0001", "0.8", "High Toxicity", "0.1", "0.9"],
            ["CCC", "C0002", "0.3", "Low Toxicity", "", "0.4"],
        ],
    )
}

pub fn pathway() -> Table {
    Table::from_rows(
        ["ko", "pathname", "genesymbol"],
        [
            ["K00001", "Glycolysis", "adhE"],
            ["K00001", "Fatty acid degradation", "adhE"],
        ],
    )
}

pub fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::from_tables(bioremediation(), degradation(), toxicity(), pathway()).unwrap()
}

pub fn column<'a>(table: &'a Table, name: &str) -> Vec<&'a str> {
    let idx = table.column_index(name).unwrap();
    table.column(idx).collect()
}
