//! Monthly alignment of the three raw series.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use super::{Observations, RawSeries};
use crate::domain::{AlignedSeries, InflationInput, month_start_after};
use crate::error::AppError;

/// Fewest aligned rows the estimators are allowed to run on.
pub const MIN_OBSERVATIONS: usize = 60;

type Monthly = BTreeMap<NaiveDate, f64>;

/// Average the observations that fall inside each calendar month.
pub fn monthly_mean(obs: &[(NaiveDate, f64)]) -> Monthly {
    let mut acc: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for &(date, value) in obs {
        if !value.is_finite() {
            continue;
        }
        let Some(month) = date.with_day(1) else {
            continue;
        };
        let slot = acc.entry(month).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(month, (sum, n))| (month, sum / n as f64))
        .collect()
}

/// Fill every month between the first and last observation with the latest
/// value seen so far.
fn forward_fill(monthly: &Monthly) -> Monthly {
    let mut out = Monthly::new();
    let (Some((&first, _)), Some((&last, _))) = (monthly.first_key_value(), monthly.last_key_value()) else {
        return out;
    };
    let mut month = first;
    let mut current = f64::NAN;
    while month <= last {
        if let Some(&v) = monthly.get(&month) {
            current = v;
        }
        out.insert(month, current);
        match month_start_after(month, 1) {
            Some(next) => month = next,
            None => break,
        }
    }
    out
}

/// `(index_t / index_{t-12} - 1) * 100` on a contiguous monthly index.
fn year_on_year(index: &Monthly) -> Monthly {
    index
        .iter()
        .filter_map(|(&month, &value)| {
            let prior = month.checked_sub_months(chrono::Months::new(12))?;
            let base = *index.get(&prior)?;
            (base != 0.0).then(|| (month, (value / base - 1.0) * 100.0))
        })
        .collect()
}

fn prepare(name: &str, obs: &Observations) -> Result<Monthly, AppError> {
    let filled = forward_fill(&monthly_mean(obs));
    if filled.is_empty() {
        return Err(AppError::DataAlignment(format!("{name} has no usable observations")));
    }
    Ok(filled)
}

/// Resample the raw series to month starts and join them on a common grid.
pub fn align_monthly(raw: &RawSeries, inflation_input: InflationInput) -> Result<AlignedSeries, AppError> {
    let inflation = match inflation_input {
        InflationInput::AnnualRate => prepare("inflation", &raw.inflation)?,
        InflationInput::PriceIndex => year_on_year(&prepare("inflation", &raw.inflation)?),
    };
    let policy_rate = prepare("policy rate", &raw.policy_rate)?;
    let exchange_rate = prepare("exchange rate", &raw.exchange_rate)?;

    if let Some((month, v)) = exchange_rate.iter().find(|(_, v)| **v <= 0.0) {
        return Err(AppError::DataAlignment(format!(
            "non-positive exchange rate {v} in {month}, cannot take log"
        )));
    }

    let mut rows = Vec::new();
    for (&month, &infl) in &inflation {
        if let (Some(&rate), Some(&fx)) = (policy_rate.get(&month), exchange_rate.get(&month)) {
            rows.push((month, [infl, rate, fx.ln()]));
        }
    }
    debug!(
        inflation = inflation.len(),
        policy_rate = policy_rate.len(),
        exchange_rate = exchange_rate.len(),
        joined = rows.len(),
        "monthly alignment"
    );

    if rows.len() < MIN_OBSERVATIONS {
        return Err(AppError::DataAlignment(format!(
            "only {} overlapping monthly observations, need at least {MIN_OBSERVATIONS}",
            rows.len()
        )));
    }

    let series = AlignedSeries::from_rows(&rows)?;
    info!(
        first = %series.first_date(),
        last = %series.last_date(),
        rows = series.len(),
        "aligned series"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Variable;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn months(start: NaiveDate, n: u32, f: impl Fn(u32) -> f64) -> Observations {
        (0..n)
            .map(|i| (month_start_after(start, i).unwrap(), f(i)))
            .collect()
    }

    #[test]
    fn monthly_mean_averages_within_month() {
        let obs = vec![(d(2024, 1, 2), 4.0), (d(2024, 1, 15), 6.0), (d(2024, 2, 1), 1.0)];
        let m = monthly_mean(&obs);
        assert_eq!(m.len(), 2);
        assert_eq!(m[&d(2024, 1, 1)], 5.0);
        assert_eq!(m[&d(2024, 2, 1)], 1.0);
    }

    #[test]
    fn gaps_are_forward_filled() {
        let monthly: Monthly = [(d(2024, 1, 1), 1.0), (d(2024, 4, 1), 4.0)].into_iter().collect();
        let filled = forward_fill(&monthly);
        assert_eq!(filled.values().copied().collect::<Vec<_>>(), vec![1.0, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn price_index_becomes_year_on_year_percent() {
        let start = d(2010, 1, 1);
        let raw = RawSeries {
            inflation: months(start, 100, |i| 100.0 * 1.02f64.powf(i as f64 / 12.0)),
            policy_rate: months(start, 100, |_| 2.5),
            exchange_rate: months(start, 100, |_| 20.0),
        };
        let series = align_monthly(&raw, InflationInput::PriceIndex).unwrap();

        assert_eq!(series.len(), 88);
        assert_eq!(series.first_date(), d(2011, 1, 1));
        for v in series.column(Variable::Inflation) {
            assert!((v - 2.0).abs() < 1e-9);
        }
        assert!((series.last_value(Variable::FxLog) - 20f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn grid_is_the_overlap_of_all_series() {
        let raw = RawSeries {
            inflation: months(d(2005, 1, 1), 120, |i| 3.0 + (i % 5) as f64 * 0.1),
            policy_rate: months(d(2006, 1, 1), 120, |_| 4.0),
            exchange_rate: months(d(2004, 6, 1), 100, |_| 12.0),
        };
        let series = align_monthly(&raw, InflationInput::AnnualRate).unwrap();
        assert_eq!(series.first_date(), d(2006, 1, 1));
        assert_eq!(series.last_date(), d(2012, 9, 1));
    }

    #[test]
    fn short_overlap_is_an_alignment_error() {
        let raw = RawSeries {
            inflation: months(d(2020, 1, 1), 30, |_| 3.0),
            policy_rate: months(d(2020, 1, 1), 30, |_| 4.0),
            exchange_rate: months(d(2020, 1, 1), 30, |_| 18.0),
        };
        let err = align_monthly(&raw, InflationInput::AnnualRate).unwrap_err();
        assert!(matches!(err, AppError::DataAlignment(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn non_positive_exchange_rate_is_rejected() {
        let raw = RawSeries {
            inflation: months(d(2015, 1, 1), 80, |_| 3.0),
            policy_rate: months(d(2015, 1, 1), 80, |_| 4.0),
            exchange_rate: months(d(2015, 1, 1), 80, |i| if i == 40 { 0.0 } else { 18.0 }),
        };
        assert!(matches!(
            align_monthly(&raw, InflationInput::AnnualRate),
            Err(AppError::DataAlignment(_))
        ));
    }
}
