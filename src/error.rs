//! Crate-wide error type.
//!
//! Every stage of the pipeline returns `Result<T, AppError>`. Variants follow the
//! failure taxonomy of the projection engine; each one maps to a process exit
//! code so the binary can stay a thin wrapper.

use thiserror::Error;

use crate::domain::ModelKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// Invalid CLI arguments or missing credentials.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, authentication, or empty payload from a series provider.
    #[error("failed to fetch series '{series}': {message}")]
    DataFetch { series: String, message: String },

    /// Not enough usable monthly observations after resampling and cleanup.
    #[error("data alignment failed: {0}")]
    DataAlignment(String),

    /// ADF or Johansen numerical failure.
    #[error("{test} failed: {message}")]
    StatisticalTest { test: &'static str, message: String },

    /// Model estimation or forecasting failure for the chosen model.
    #[error("{model} estimation failed during {step}: {message}")]
    Estimation {
        model: ModelKind,
        step: &'static str,
        message: String,
    },

    /// Scenario parameters rejected before the pipeline runs.
    #[error("invalid scenario configuration: {0}")]
    ScenarioConfig(String),

    /// Writing or reading an export file.
    #[error("export error: {0}")]
    Export(String),
}

impl AppError {
    pub fn fetch(series: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataFetch {
            series: series.into(),
            message: message.into(),
        }
    }

    pub fn stat_test(test: &'static str, message: impl Into<String>) -> Self {
        Self::StatisticalTest {
            test,
            message: message.into(),
        }
    }

    pub fn estimation(model: ModelKind, step: &'static str, message: impl Into<String>) -> Self {
        Self::Estimation {
            model,
            step,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::ScenarioConfig(_) | AppError::Export(_) => 2,
            AppError::DataAlignment(_) => 3,
            AppError::DataFetch { .. } => 4,
            AppError::StatisticalTest { .. } | AppError::Estimation { .. } => 5,
        }
    }
}
