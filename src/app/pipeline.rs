//! The projection pipeline shared by every front-end.
//!
//! analyze -> select/estimate -> forecast -> reconstruct -> scenarios -> diagnostics
//!
//! Each stage is a plain function over the previous stage's output; nothing is
//! kept between runs except what a caller chooses to put in a
//! `ProjectionCache`.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use crate::analysis::{Analysis, analyze};
use crate::data::{CountryPreset, SeriesSource, align_monthly, fetch_raw};
use crate::domain::{AlignedSeries, Country, ModelKind, ScenarioParams, Variable};
use crate::error::AppError;
use crate::fit::{FittedModel, ModelChoice, fit_model};
use crate::forecast::{ForecastBundle, forecast_levels};
use crate::report::{Diagnostics, extract_diagnostics};
use crate::scenario::{ScenarioSet, ScenarioSummary, build_scenarios};

/// Everything needed to run one country projection against a remote source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionRequest {
    pub country: Country,
    pub start: NaiveDate,
    pub years_to_project: u32,
    pub params: ScenarioParams,
}

/// All computed outputs of a single projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub history: AlignedSeries,
    pub analysis: Analysis,
    pub model: FittedModel,
    /// Reconstructed (levels) forecast bundle.
    pub forecast: ForecastBundle,
    pub scenarios: ScenarioSet,
    pub summary: ScenarioSummary,
    pub diagnostics: Diagnostics,
    pub params: ScenarioParams,
    pub years_to_project: u32,
}

impl ForecastResult {
    pub fn model_kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn choice(&self) -> ModelChoice {
        self.model.choice()
    }

    pub fn coint_rank(&self) -> usize {
        self.analysis.cointegration.rank
    }

    pub fn non_stationary(&self) -> Vec<Variable> {
        self.analysis.non_stationary()
    }

    pub fn non_stationary_names(&self) -> Vec<&'static str> {
        self.non_stationary().into_iter().map(Variable::name).collect()
    }
}

/// Fetch, align and project for one country.
pub fn project(source: &dyn SeriesSource, request: &ProjectionRequest) -> Result<ForecastResult, AppError> {
    request.params.validate(request.years_to_project)?;

    let preset = CountryPreset::for_country(request.country);
    info!(
        country = request.country.display_name(),
        source = source.name(),
        start = %request.start,
        "fetching series"
    );
    let raw = fetch_raw(source, &preset, request.start)?;
    let series = align_monthly(&raw, preset.inflation_input)?;

    project_aligned(series, request.years_to_project, &request.params)
}

/// Run the engine on an already aligned series.
pub fn project_aligned(
    series: AlignedSeries,
    years_to_project: u32,
    params: &ScenarioParams,
) -> Result<ForecastResult, AppError> {
    params.validate(years_to_project)?;
    let steps = years_to_project as usize * 12;
    info!(
        rows = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        years_to_project,
        years_model = params.years_model,
        "projection started"
    );

    let analysis = analyze(&series)?;
    let model = fit_model(&series, &analysis)?;
    let forecast = forecast_levels(&model, &series, steps)?;
    let scenarios = build_scenarios(&forecast, params, series.last_value(Variable::Inflation));
    let summary = ScenarioSummary::from_set(&scenarios);
    let diagnostics = extract_diagnostics(&model, &series);

    Ok(ForecastResult {
        history: series,
        analysis,
        model,
        forecast,
        scenarios,
        summary,
        diagnostics,
        params: *params,
        years_to_project,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: String,
    country: Country,
    start: NaiveDate,
    years_to_project: u32,
    years_model: u32,
    /// Targets and thetas by bit pattern.
    rule_bits: [u64; 6],
}

impl CacheKey {
    fn new(source: &str, request: &ProjectionRequest) -> Self {
        let p = &request.params;
        Self {
            source: source.to_string(),
            country: request.country,
            start: request.start,
            years_to_project: request.years_to_project,
            years_model: p.years_model,
            rule_bits: [
                p.target_central.to_bits(),
                p.target_low.to_bits(),
                p.target_high.to_bits(),
                p.theta_central.to_bits(),
                p.theta_low.to_bits(),
                p.theta_high.to_bits(),
            ],
        }
    }
}

/// Caller-side memo of whole projections, keyed by source and request.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entries: HashMap<CacheKey, ForecastResult>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached result for `request`, running `project` on a miss.
    /// Failures are not cached.
    pub fn get_or_project(
        &mut self,
        source: &dyn SeriesSource,
        request: &ProjectionRequest,
    ) -> Result<&ForecastResult, AppError> {
        let key = CacheKey::new(source.name(), request);
        if !self.entries.contains_key(&key) {
            let result = project(source, request)?;
            self.entries.insert(key.clone(), result);
        } else {
            info!(source = source.name(), "projection cache hit");
        }
        self.entries
            .get(&key)
            .ok_or_else(|| AppError::Config("projection cache lost an entry".to_string()))
    }
}
