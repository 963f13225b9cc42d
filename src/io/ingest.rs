//! CSV ingest of an already aligned monthly series.
//!
//! Expected header: `date,inflation,policy_rate,fx_log` (any column order,
//! extra columns ignored). Dates are ISO `YYYY-MM-DD` month starts. Rows with a
//! blank value in any required column are dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::data::MIN_OBSERVATIONS;
use crate::domain::{AlignedSeries, Variable};
use crate::error::AppError;

pub fn read_aligned_csv(path: &Path) -> Result<AlignedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Config(format!("failed to open CSV '{}': {e}", path.display())))?;
    read_aligned(file)
}

pub fn read_aligned<R: Read>(input: R) -> Result<AlignedSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Config(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_col = column(&header_map, "date")?;
    let value_cols = [
        column(&header_map, Variable::Inflation.name())?,
        column(&header_map, Variable::PolicyRate.name())?,
        column(&header_map, Variable::FxLog.name())?,
    ];

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = record.map_err(|e| AppError::Config(format!("line {line}: {e}")))?;

        let raw_date = record.get(date_col).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| AppError::Config(format!("line {line}: invalid date '{raw_date}': {e}")))?;

        let mut values = [0.0; 3];
        let mut missing = false;
        for (slot, &col) in values.iter_mut().zip(&value_cols) {
            let raw = record.get(col).unwrap_or("");
            if raw.is_empty() {
                missing = true;
                break;
            }
            *slot = raw
                .parse::<f64>()
                .map_err(|e| AppError::Config(format!("line {line}: invalid number '{raw}': {e}")))?;
        }
        if missing {
            dropped += 1;
            continue;
        }
        rows.push((date, values));
    }

    if dropped > 0 {
        warn!(dropped, "dropped rows with missing values");
    }
    if rows.len() < MIN_OBSERVATIONS {
        return Err(AppError::DataAlignment(format!(
            "only {} complete rows, need at least {MIN_OBSERVATIONS}",
            rows.len()
        )));
    }
    debug!(rows = rows.len(), "read aligned CSV");
    AlignedSeries::from_rows(&rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_ascii_lowercase(), i))
        .collect()
}

fn column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| AppError::Config(format!("CSV is missing required column '{name}'")))
}
