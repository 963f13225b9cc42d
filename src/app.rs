//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the log subscriber
//! - picks the data source for the subcommand
//! - runs the projection pipeline
//! - prints the report and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DemoArgs, OfflineArgs, ProjectArgs, ScenarioArgs};
use crate::data::sample::{SampleSpec, generate_aligned};
use crate::data::{BanxicoClient, CountryPreset, FredClient, SeriesSource};
use crate::domain::Country;
use crate::error::AppError;

pub mod pipeline;

use pipeline::{ForecastResult, ProjectionRequest};

/// Entry point for the `infl` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Project(args) => handle_project(args),
        Command::Offline(args) => handle_offline(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// The provider behind a country preset. Credentials are checked here,
/// before any request.
pub fn source_for(country: Country) -> Result<Box<dyn SeriesSource>, AppError> {
    Ok(match country {
        Country::Mexico => Box::new(BanxicoClient::from_env()?),
        Country::Usa => Box::new(FredClient::from_env()?),
    })
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    let opts = &args.scenario;
    let params = opts.params();
    params.validate(opts.years)?;

    let preset = CountryPreset::for_country(opts.country);
    let request = ProjectionRequest {
        country: opts.country,
        start: args.start.unwrap_or(preset.default_start),
        years_to_project: opts.years,
        params,
    };
    let source = source_for(opts.country)?;
    let result = pipeline::project(source.as_ref(), &request)?;
    emit(&result, opts, opts.country.display_name())
}

fn handle_offline(args: OfflineArgs) -> Result<(), AppError> {
    let opts = &args.scenario;
    let params = opts.params();
    let series = crate::io::read_aligned_csv(&args.input)?;
    let result = pipeline::project_aligned(series, opts.years, &params)?;
    emit(&result, opts, &args.input.display().to_string())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let opts = &args.scenario;
    let params = opts.params();
    let series = generate_aligned(&SampleSpec::new(args.months, args.seed, args.regime))?;
    let result = pipeline::project_aligned(series, opts.years, &params)?;
    emit(&result, opts, &format!("synthetic, seed {}", args.seed))
}

fn emit(result: &ForecastResult, opts: &ScenarioArgs, title: &str) -> Result<(), AppError> {
    println!("{}", crate::report::format_report(result, title));

    if opts.residuals {
        let residuals = &result.diagnostics.residuals;
        println!("{}", crate::report::format_residual_stats(&residuals.stats()));
        println!(
            "{}",
            crate::report::format_residual_acf(&residuals.acf(crate::report::ACF_LAGS))
        );
    }
    if opts.summary {
        println!("{}", result.diagnostics.summary);
    }

    if let Some(path) = &opts.export {
        crate::io::write_scenarios_csv(path, &result.scenarios)?;
        info!(path = %path.display(), "wrote scenarios CSV");
    }
    if let Some(path) = &opts.export_json {
        crate::io::write_result_json(path, result)?;
        info!(path = %path.display(), "wrote result JSON");
    }
    Ok(())
}
