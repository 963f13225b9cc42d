//! Export round trips through the filesystem.

use inflation_scenarios::app::pipeline::project_aligned;
use inflation_scenarios::data::sample::{SampleSpec, generate_aligned};
use inflation_scenarios::domain::{Country, ScenarioKind, ScenarioParams};
use inflation_scenarios::io::{read_aligned_csv, read_result_json, read_scenarios_csv, write_result_json, write_scenarios_csv};

#[test]
fn scenarios_csv_round_trips_to_two_decimals() {
    let params = ScenarioParams::for_country(Country::Mexico);
    let series = generate_aligned(&SampleSpec::one_trending(150, 11)).unwrap();
    let result = project_aligned(series, 10, &params).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.csv");
    write_scenarios_csv(&path, &result.scenarios).unwrap();
    let rows = read_scenarios_csv(&path).unwrap();

    assert_eq!(rows.len(), 120);
    let base = &result.scenarios.path(ScenarioKind::Base).unwrap().values;
    let negative = &result.scenarios.path(ScenarioKind::Negative).unwrap().values;
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.date, result.scenarios.dates()[i]);
        assert!((row.base - base[i]).abs() <= 0.005 + 1e-9);
        assert!((row.negative - negative[i]).abs() <= 0.005 + 1e-9);
    }
}

#[test]
fn result_json_carries_run_metadata() {
    let params = ScenarioParams::for_country(Country::Usa);
    let series = generate_aligned(&SampleSpec::cointegrated(200, 42)).unwrap();
    let result = project_aligned(series, 8, &params).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    write_result_json(&path, &result).unwrap();
    let doc = read_result_json(&path).unwrap();

    assert_eq!(doc.model, result.model_kind());
    assert_eq!(doc.coint_rank, result.coint_rank());
    assert_eq!(doc.params, params);
    assert_eq!(doc.dates.len(), 96);
    assert_eq!(doc.paths.len(), 3);
    assert_eq!(doc.summary.len(), 3);
    assert_eq!(doc.residuals.len(), result.diagnostics.residuals.values.len());
    assert_eq!(doc.residual_acf.len(), 24);
    assert_eq!(doc.residual_acf[0].lag, 1);
    assert_eq!(doc.residual_acf[23].lag, 24);
    assert!(doc.residual_acf.iter().all(|p| p.value.abs() <= 1.0 && p.half_width > 0.0));
    assert_eq!(doc.transition_date, result.scenarios.transition_date());
}

#[test]
fn offline_csv_reproduces_in_memory_projection() {
    let params = ScenarioParams::for_country(Country::Mexico);
    let series = generate_aligned(&SampleSpec::stationary(150, 17)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aligned.csv");
    let mut text = String::from("date,inflation,policy_rate,fx_log\n");
    for (i, d) in series.dates().iter().enumerate() {
        let v = series.values();
        text.push_str(&format!("{d},{:?},{:?},{:?}\n", v[(i, 0)], v[(i, 1)], v[(i, 2)]));
    }
    std::fs::write(&path, text).unwrap();

    let loaded = read_aligned_csv(&path).unwrap();
    assert_eq!(loaded, series);

    let a = project_aligned(series, 6, &params).unwrap();
    let b = project_aligned(loaded, 6, &params).unwrap();
    assert_eq!(a.scenarios, b.scenarios);
}
