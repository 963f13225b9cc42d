//! Command-line parsing for the inflation scenario engine.
//!
//! Argument parsing and command dispatch stay separate from the statistics
//! and pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::data::sample::SampleRegime;
use crate::domain::{Country, MAX_YEARS_TO_PROJECT, MIN_YEARS_TO_PROJECT, ScenarioParams};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "infl", version, about = "Inflation scenario projections (VAR/VECM)")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the country's series from its provider and project scenarios.
    Project(ProjectArgs),
    /// Project scenarios from an aligned CSV (`date,inflation,policy_rate,fx_log`).
    Offline(OfflineArgs),
    /// Project scenarios from a seeded synthetic series (no network).
    Demo(DemoArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ProjectArgs {
    /// First observation date requested from the provider (YYYY-MM-DD).
    /// Defaults to the country preset's start.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

#[derive(Debug, Args, Clone)]
pub struct OfflineArgs {
    /// Aligned monthly CSV.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of monthly observations to generate.
    #[arg(long, default_value_t = 240)]
    pub months: usize,

    /// Which auxiliary variables carry a stochastic trend.
    #[arg(long, value_enum, default_value_t = SampleRegime::Cointegrated)]
    pub regime: SampleRegime,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct ScenarioArgs {
    /// Country preset (series ids and default scenario parameters).
    #[arg(short = 'c', long, value_enum, default_value_t = Country::Mexico)]
    pub country: Country,

    /// Projection horizon in years.
    #[arg(
        short = 'y',
        long,
        default_value_t = 30,
        value_parser = clap::value_parser!(u32).range(MIN_YEARS_TO_PROJECT as i64..=MAX_YEARS_TO_PROJECT as i64)
    )]
    pub years: u32,

    /// Years driven by the statistical forecast before mean reversion starts.
    #[arg(long)]
    pub years_model: Option<u32>,

    /// Long-run target of the base scenario.
    #[arg(long)]
    pub target_central: Option<f64>,

    /// Long-run target of the positive scenario.
    #[arg(long)]
    pub target_low: Option<f64>,

    /// Long-run target of the negative scenario.
    #[arg(long)]
    pub target_high: Option<f64>,

    /// Convergence speed of the base scenario.
    #[arg(long)]
    pub theta_central: Option<f64>,

    /// Convergence speed of the positive scenario.
    #[arg(long)]
    pub theta_low: Option<f64>,

    /// Convergence speed of the negative scenario.
    #[arg(long)]
    pub theta_high: Option<f64>,

    /// Export scenario paths to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full result document to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Print the fitted model's summary text.
    #[arg(long)]
    pub summary: bool,

    /// Print inflation residual statistics.
    #[arg(long)]
    pub residuals: bool,
}

impl ScenarioArgs {
    /// Country defaults overridden by any flag the user supplied.
    pub fn params(&self) -> ScenarioParams {
        let d = ScenarioParams::for_country(self.country);
        ScenarioParams {
            years_model: self.years_model.unwrap_or(d.years_model),
            target_central: self.target_central.unwrap_or(d.target_central),
            target_low: self.target_low.unwrap_or(d.target_low),
            target_high: self.target_high.unwrap_or(d.target_high),
            theta_central: self.theta_central.unwrap_or(d.theta_central),
            theta_low: self.theta_low.unwrap_or(d.theta_low),
            theta_high: self.theta_high.unwrap_or(d.theta_high),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_country_defaults() {
        let cli = Cli::parse_from(["infl", "demo", "-c", "us", "--theta-low", "0.2", "--years-model", "8"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        let params = args.scenario.params();
        assert_eq!(params.theta_low, 0.2);
        assert_eq!(params.years_model, 8);
        assert_eq!(params.target_high, 3.5);
        assert_eq!(args.scenario.years, 30);
    }

    #[test]
    fn years_outside_range_are_rejected() {
        assert!(Cli::try_parse_from(["infl", "demo", "--years", "4"]).is_err());
        assert!(Cli::try_parse_from(["infl", "demo", "--years", "51"]).is_err());
        assert!(Cli::try_parse_from(["infl", "demo", "--years", "50"]).is_ok());
    }

    #[test]
    fn project_accepts_start_date() {
        let cli = Cli::parse_from(["infl", "-v", "project", "--start", "2010-01-01"]);
        assert_eq!(cli.verbose, 1);
        let Command::Project(args) = cli.command else {
            panic!("expected project");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2010, 1, 1));
    }
}
