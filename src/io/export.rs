//! Scenario CSV and result JSON exports.
//!
//! The CSV is meant for spreadsheets: `date,base,positive,negative` with ISO
//! dates and values rounded to 2 decimals. The JSON document carries the run
//! metadata, the summary table, the full paths and the inflation residuals with
//! their autocorrelation.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::ForecastResult;
use crate::domain::{ModelKind, ScenarioKind, ScenarioParams, Variable};
use crate::error::AppError;
use crate::report::{ACF_LAGS, AcfPoint};
use crate::scenario::ScenarioSet;

/// One row of the scenarios CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub date: NaiveDate,
    pub base: f64,
    pub positive: f64,
    pub negative: f64,
}

fn value_at(set: &ScenarioSet, kind: ScenarioKind, idx: usize) -> Result<f64, AppError> {
    set.path(kind)
        .and_then(|p| p.values.get(idx))
        .copied()
        .ok_or_else(|| AppError::Export(format!("{} path has no value at row {idx}", kind.column_name())))
}

pub fn write_scenarios_csv(path: &Path, set: &ScenarioSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Export(format!("failed to create scenarios CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["date"];
    header.extend(ScenarioKind::ALL.iter().map(|k| k.column_name()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::Export(format!("failed to write CSV header: {e}")))?;

    for (idx, date) in set.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        for kind in ScenarioKind::ALL {
            record.push(format!("{:.2}", value_at(set, kind, idx)?));
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::Export(format!("failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::Export(format!("failed to flush scenarios CSV: {e}")))
}

pub fn read_scenarios_csv(path: &Path) -> Result<Vec<ScenarioRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Export(format!("failed to open scenarios CSV '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    reader
        .deserialize()
        .map(|row| row.map_err(|e| AppError::Export(format!("invalid scenarios CSV row: {e}"))))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfRecord {
    pub variable: Variable,
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    pub non_stationary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub scenario: ScenarioKind,
    pub mean: f64,
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub scenario: ScenarioKind,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub tool: String,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub observations: usize,
    pub years_to_project: u32,
    pub params: ScenarioParams,
    pub model: ModelKind,
    pub lag_order: usize,
    pub coint_rank: usize,
    pub non_stationary: Vec<Variable>,
    pub adf: Vec<AdfRecord>,
    pub summary: Vec<SummaryRecord>,
    pub dates: Vec<NaiveDate>,
    pub transition_date: Option<NaiveDate>,
    pub paths: Vec<PathRecord>,
    pub residual_dates: Vec<NaiveDate>,
    pub residuals: Vec<f64>,
    pub residual_acf: Vec<AcfPoint>,
}

impl ResultDocument {
    pub fn from_result(result: &ForecastResult) -> Self {
        Self {
            tool: "infl".to_string(),
            history_start: result.history.first_date(),
            history_end: result.history.last_date(),
            observations: result.history.len(),
            years_to_project: result.years_to_project,
            params: result.params,
            model: result.model_kind(),
            lag_order: result.choice().lag_order(),
            coint_rank: result.coint_rank(),
            non_stationary: result.non_stationary(),
            adf: result
                .analysis
                .stationarity
                .outcomes
                .iter()
                .map(|(variable, out)| AdfRecord {
                    variable: *variable,
                    statistic: out.statistic,
                    p_value: out.p_value,
                    used_lag: out.used_lag,
                    non_stationary: out.is_non_stationary(),
                })
                .collect(),
            summary: result
                .summary
                .rows
                .iter()
                .map(|(scenario, s)| SummaryRecord {
                    scenario: *scenario,
                    mean: s.mean,
                    std: s.std,
                    max: s.max,
                    min: s.min,
                })
                .collect(),
            dates: result.scenarios.dates().to_vec(),
            transition_date: result.scenarios.transition_date(),
            paths: result
                .scenarios
                .paths
                .iter()
                .map(|p| PathRecord {
                    scenario: p.kind,
                    values: p.values.clone(),
                })
                .collect(),
            residual_dates: result.diagnostics.residuals.dates.clone(),
            residuals: result.diagnostics.residuals.values.clone(),
            residual_acf: result.diagnostics.residuals.acf(ACF_LAGS),
        }
    }
}

pub fn write_result_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Export(format!("failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ResultDocument::from_result(result))
        .map_err(|e| AppError::Export(format!("failed to write result JSON: {e}")))
}

pub fn read_result_json(path: &Path) -> Result<ResultDocument, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::Export(format!("failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::Export(format!("invalid result JSON: {e}")))
}
