//! Import of inspection checklists exported as `Section,Component,Severity` CSV.

mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::domain::{DamageAssessment, DamageSection};

#[derive(Debug)]
pub enum ChecklistImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownSection { row: usize, value: String },
    MissingComponent { row: usize },
}

impl std::fmt::Display for ChecklistImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecklistImportError::Io(err) => write!(f, "failed to read checklist: {}", err),
            ChecklistImportError::Csv(err) => write!(f, "invalid checklist CSV data: {}", err),
            ChecklistImportError::UnknownSection { row, value } => {
                write!(f, "row {}: unknown section '{}'", row, value)
            }
            ChecklistImportError::MissingComponent { row } => {
                write!(f, "row {}: component name is blank", row)
            }
        }
    }
}

impl std::error::Error for ChecklistImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChecklistImportError::Io(err) => Some(err),
            ChecklistImportError::Csv(err) => Some(err),
            ChecklistImportError::UnknownSection { .. }
            | ChecklistImportError::MissingComponent { .. } => None,
        }
    }
}

impl From<std::io::Error> for ChecklistImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ChecklistImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Builds a `DamageAssessment` from checklist rows. Severities are validated later,
/// when the assessment is priced against the active tables.
pub struct ChecklistImporter;

impl ChecklistImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DamageAssessment, ChecklistImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<DamageAssessment, ChecklistImportError> {
        let mut assessment = DamageAssessment::new();
        let mut applied: HashSet<(DamageSection, String)> = HashSet::new();

        for record in parser::parse_records(reader)? {
            let section = DamageSection::from_key(&record.section).ok_or_else(|| {
                ChecklistImportError::UnknownSection {
                    row: record.row,
                    value: record.section.clone(),
                }
            })?;
            if record.component.is_empty() {
                return Err(ChecklistImportError::MissingComponent { row: record.row });
            }

            // First recorded severity wins; blank rows never overwrite.
            let Some(severity) = record.severity else {
                continue;
            };
            if !applied.insert((section, record.component.clone())) {
                continue;
            }
            assessment.section_mut(section).set(record.component, severity);
        }

        Ok(assessment)
    }
}
