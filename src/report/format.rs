//! Formatted terminal output.
//!
//! Formatting lives in one place so the statistics and pipeline code stay
//! free of presentation concerns.

use crate::analysis::Analysis;
use crate::app::pipeline::ForecastResult;
use crate::domain::{ScenarioKind, Variable};
use crate::fit::ModelChoice;
use crate::report::{AcfPoint, ResidualStats};
use crate::scenario::{ScenarioSet, ScenarioSummary};

/// Full run report: header, tests, model, scenario table and yearly snapshot.
pub fn format_report(result: &ForecastResult, title: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== infl - Inflation scenarios ({title}) ===\n"));
    out.push_str(&format!(
        "History: {} .. {} ({} months)\n",
        result.history.first_date(),
        result.history.last_date(),
        result.history.len()
    ));
    out.push_str(&format!(
        "Horizon: {} years | model segment: {} years\n",
        result.years_to_project, result.params.years_model
    ));

    out.push('\n');
    out.push_str(&format_tests(&result.analysis));

    out.push_str("\nChosen model:\n");
    out.push_str(&format_choice(&result.choice()));

    out.push_str("\nScenario summary:\n");
    out.push_str(&format_summary_table(&result.summary));

    out.push_str("\nYearly snapshot (last month of each projection year):\n");
    out.push_str(&format_yearly_snapshot(&result.scenarios));

    out
}

/// ADF table for the auxiliaries and the Johansen outcome when it ran.
pub fn format_tests(analysis: &Analysis) -> String {
    let mut out = String::new();
    out.push_str("Stationarity (ADF, constant):\n");
    out.push_str(
        format!(
            "{:<12} {:>10} {:>8} {:>5} {:>8} {:<15}\n",
            "variable", "statistic", "p-value", "lags", "5% cv", "verdict"
        )
        .trim_end(),
    );
    out.push('\n');
    for (var, adf) in &analysis.stationarity.outcomes {
        let verdict = if adf.is_non_stationary() { "non-stationary" } else { "stationary" };
        out.push_str(&format!(
            "{:<12} {:>10.4} {:>8.4} {:>5} {:>8.3} {verdict}\n",
            var.name(),
            adf.statistic,
            adf.p_value,
            adf.used_lag,
            adf.critical_values.five,
        ));
    }

    out.push_str("\nCointegration (Johansen trace, 95%):\n");
    match &analysis.cointegration.johansen {
        None => out.push_str("  skipped: fewer than two non-stationary variables\n"),
        Some(j) => {
            for (r, (trace, cv)) in j.trace_stats.iter().zip(&j.critical_values).enumerate() {
                let mark = if *trace > cv[1] { "*" } else { " " };
                out.push_str(&format!("{mark} r <= {r}: trace={trace:>9.3} cv95={:>8.4}\n", cv[1]));
            }
        }
    }
    out.push_str(&format!("  rank: {}\n", analysis.cointegration.rank));
    out
}

pub fn format_choice(choice: &ModelChoice) -> String {
    match choice {
        ModelChoice::VarDifferenced { lag_order, differenced } => {
            let names: Vec<&str> = differenced.iter().map(|v| v.name()).collect();
            let diff = if names.is_empty() { "none".to_string() } else { names.join(", ") };
            format!("- VAR({lag_order}) | differenced: {diff}\n")
        }
        ModelChoice::Vecm {
            lag_order,
            k_ar_diff,
            coint_rank,
        } => format!("- VECM | rank={coint_rank} | k_ar_diff={k_ar_diff} (levels VAR order {lag_order})\n"),
    }
}

pub fn format_summary_table(summary: &ScenarioSummary) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<10} {:>10} {:>10} {:>10} {:>10}\n", "scenario", "mean %", "std", "max %", "min %").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<10} {:-<10} {:-<10} {:-<10}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for (kind, s) in &summary.rows {
        out.push_str(&format!(
            "{:<10} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
            kind.display_name(),
            s.mean,
            s.std,
            s.max,
            s.min
        ));
    }
    out
}

/// One row per projection year, sampled at the year's last month.
pub fn format_yearly_snapshot(set: &ScenarioSet) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<6} {:<10}", "year", "date"));
    for kind in ScenarioKind::ALL {
        out.push_str(&format!(" {:>9}", kind.display_name()));
    }
    out.push('\n');

    let dates = set.dates();
    for (year, idx) in (11..dates.len()).step_by(12).enumerate() {
        let phase = if idx >= set.transition { "~" } else { " " };
        out.push_str(&format!("{:<6} {:<10}", year + 1, dates[idx].format("%Y-%m").to_string()));
        for kind in ScenarioKind::ALL {
            let v = set.path(kind).and_then(|p| p.values.get(idx)).copied().unwrap_or(f64::NAN);
            out.push_str(&format!(" {v:>9.2}"));
        }
        out.push_str(&format!(" {phase}\n"));
    }
    if let Some(date) = set.transition_date() {
        out.push_str(&format!("(~ mean reversion toward target from {})\n", date.format("%Y-%m")));
    }
    out
}

pub fn format_residual_stats(stats: &ResidualStats) -> String {
    format!(
        "Residuals ({} equation): n={} mean={:.6} std={:.6}\n",
        Variable::Inflation,
        stats.count,
        stats.mean,
        stats.std
    )
}

/// Residual autocorrelation table; lags outside their band are starred.
pub fn format_residual_acf(acf: &[AcfPoint]) -> String {
    let mut out = String::new();
    out.push_str("Residual autocorrelation (95% Bartlett band)
");
    out.push_str(&format!("{:>4} {:>9} {:>9}
", "lag", "acf", "band"));
    for point in acf {
        let mark = if point.is_significant() { " *" } else { "" };
        out.push_str(&format!(
            "{:>4} {:>9.4} {:>9.4}{mark}
",
            point.lag, point.value, point.half_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::month_start_after;
    use crate::scenario::{ScenarioPath, ScenarioStats};

    fn set(months: usize, transition: usize) -> ScenarioSet {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..months as u32).map(|i| month_start_after(start, i).unwrap()).collect();
        let paths = ScenarioKind::ALL
            .into_iter()
            .enumerate()
            .map(|(k, kind)| ScenarioPath {
                kind,
                dates: dates.clone(),
                values: (0..months).map(|i| k as f64 + i as f64 / 100.0).collect(),
            })
            .collect();
        ScenarioSet { paths, transition }
    }

    #[test]
    fn snapshot_has_one_row_per_year() {
        let text = format_yearly_snapshot(&set(36, 24));
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with(char::is_numeric)).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("2025-12"));
        assert!(rows[2].contains("2027-12"));
        assert!(rows[2].trim_end().ends_with('~'));
        assert!(text.contains("mean reversion toward target from 2027-01"));
    }

    #[test]
    fn summary_table_lists_fixed_rows() {
        let stats = ScenarioStats {
            mean: 3.5,
            std: 0.25,
            max: 4.0,
            min: 3.0,
        };
        let summary = ScenarioSummary {
            rows: ScenarioKind::ALL.into_iter().map(|k| (k, stats)).collect(),
        };
        let text = format_summary_table(&summary);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("Base"));
        assert!(lines[3].starts_with("Positive"));
        assert!(lines[4].starts_with("Negative"));
        assert!(lines[2].contains("3.500"));
    }

    #[test]
    fn choice_line_names_differenced_columns() {
        let choice = ModelChoice::VarDifferenced {
            lag_order: 2,
            differenced: vec![Variable::FxLog],
        };
        assert_eq!(format_choice(&choice), "- VAR(2) | differenced: fx_log\n");
    }

    #[test]
    fn acf_table_stars_significant_lags() {
        let acf = [
            AcfPoint {
                lag: 1,
                value: 0.45,
                half_width: 0.12,
            },
            AcfPoint {
                lag: 2,
                value: -0.05,
                half_width: 0.15,
            },
        ];
        let text = format_residual_acf(&acf);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with('1'));
        assert!(lines[2].ends_with(" *"));
        assert!(lines[3].contains("-0.0500"));
        assert!(!lines[3].ends_with('*'));
    }
}
