use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::normalize_key;

#[derive(Debug)]
pub(crate) struct ChecklistRecord {
    pub(crate) row: usize,
    pub(crate) section: String,
    pub(crate) component: String,
    pub(crate) severity: Option<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ChecklistRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    // Row numbers are 1-based and count the header line.
    for (index, record) in csv_reader.deserialize::<ChecklistRow>().enumerate() {
        let row = record?;
        records.push(ChecklistRecord {
            row: index + 2,
            section: row.section,
            component: normalize_key(&row.component),
            severity: row.severity.map(|value| value.to_ascii_lowercase()),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ChecklistRow {
    #[serde(rename = "Section")]
    section: String,
    #[serde(rename = "Component")]
    component: String,
    #[serde(rename = "Severity", default, deserialize_with = "empty_string_as_none")]
    severity: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
