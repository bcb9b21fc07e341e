//! Annualized return over irregular cash flows.
use crate::core::cashflow::CashFlow;
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.25;
const INITIAL_GUESS: f64 = 0.1;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;
/// Plausible XIRR range, in percent.
const MIN_PERCENT: f64 = -100.0;
const MAX_PERCENT: f64 = 1000.0;

/// Computes XIRR as a percentage rounded to 2 decimals, e.g. `12.5` for 12.5%.
///
/// Uses Newton-Raphson on NPV(rate) = sum(amount / (1 + rate)^years) starting
/// from 10%. Returns `None` when there are fewer than two flows, when the
/// iteration hits a zero or non-finite derivative, when it does not converge
/// within the iteration cap, or when the result falls outside
/// [-100%, 1000%].
pub fn xirr(cash_flows: &[CashFlow]) -> Option<f64> {
    if cash_flows.len() < 2 {
        debug!("XIRR needs at least 2 cash flows, got {}", cash_flows.len());
        return None;
    }

    let mut flows = cash_flows.to_vec();
    flows.sort_by_key(|cf| cf.date);
    let first = flows[0].date;
    let series: Vec<(f64, f64)> = flows
        .iter()
        .map(|cf| ((cf.date - first).num_days() as f64 / DAYS_PER_YEAR, cf.amount))
        .collect();

    let rate = newton_raphson(&series)?;
    let percent = rate * 100.0;
    if !(MIN_PERCENT..=MAX_PERCENT).contains(&percent) {
        debug!("XIRR out of bounds: {percent}");
        return None;
    }
    Some((percent * 100.0).round() / 100.0)
}

fn npv(rate: f64, series: &[(f64, f64)]) -> f64 {
    series
        .iter()
        .map(|(years, amount)| amount / (1.0 + rate).powf(*years))
        .sum()
}

fn npv_derivative(rate: f64, series: &[(f64, f64)]) -> f64 {
    series
        .iter()
        .map(|(years, amount)| -years * amount / (1.0 + rate).powf(years + 1.0))
        .sum()
}

fn newton_raphson(series: &[(f64, f64)]) -> Option<f64> {
    let mut rate = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let value = npv(rate, series);
        let slope = npv_derivative(rate, series);
        if slope == 0.0 || !slope.is_finite() || !value.is_finite() {
            debug!("XIRR iteration stalled at rate {rate}");
            return None;
        }
        let next = rate - value / slope;
        if !next.is_finite() {
            return None;
        }
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    debug!("XIRR did not converge in {MAX_ITERATIONS} iterations");
    None
}
