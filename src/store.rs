use std::path::Path;

use anyhow::Context;

use crate::models::{Case, CasesData};

pub fn read_cases_file(path: &Path) -> anyhow::Result<CasesData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let data = CasesData::from_json_str(&raw)
        .with_context(|| format!("{} is not a valid cases document", path.display()))?;
    Ok(data)
}

pub fn write_cases_file(path: &Path, data: &CasesData) -> anyhow::Result<()> {
    let mut encoded = serde_json::to_string_pretty(data)?;
    encoded.push('\n');
    std::fs::write(path, encoded).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Reads `key,type,day,severity` rows, validating each case.
pub fn read_csv_cases(csv_path: &Path) -> anyhow::Result<Vec<(String, Case)>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        key: String,
        #[serde(rename = "type")]
        case_type: String,
        day: String,
        severity: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut cases = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // Header occupies line 1.
        let line = index + 2;
        let case = Case::parse(row.case_type.trim(), row.day.trim(), row.severity.trim())
            .with_context(|| format!("{} line {line}", csv_path.display()))?;
        cases.push((row.key.trim().to_string(), case));
    }

    Ok(cases)
}
