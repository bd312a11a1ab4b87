// src/services/estimator.rs
use log::debug;

use crate::error::ProjectionError;
use crate::models::{AssetClass, Fundamentals, ModelParameters};

/// Annualization constant: trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Hard caps for commodity estimates.
const COMMODITY_MU_RANGE: (f64, f64) = (0.02, 0.10);
const COMMODITY_SIGMA_RANGE: (f64, f64) = (0.05, 0.25);

/// Post-adjustment clamp for stock estimates. The 0.10 volatility floor
/// is policy, not a derived bound; tune with care.
const STOCK_MU_RANGE: (f64, f64) = (-0.05, 0.25);
const STOCK_SIGMA_RANGE: (f64, f64) = (0.10, 0.60);

/// Heuristic adjustments applied to stock estimates, in this order. The
/// order matters: each rule sees the drift and volatility left by the
/// previous one.
const STOCK_ADJUSTMENTS: [AdjustmentRule; 3] = [
    AdjustmentRule::Roe,
    AdjustmentRule::PeRatio,
    AdjustmentRule::DebtEquity,
];

/// One named fundamental-ratio adjustment band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentRule {
    Roe,
    PeRatio,
    DebtEquity,
}

impl AdjustmentRule {
    pub fn apply(&self, fundamentals: &Fundamentals, mu: f64, sigma: f64) -> (f64, f64) {
        match self {
            AdjustmentRule::Roe => match fundamentals.roe {
                Some(roe) if roe > 0.25 => (mu + 0.05, sigma),
                Some(roe) if roe > 0.15 => (mu + 0.03, sigma),
                Some(roe) if roe > 0.0 && roe < 0.05 => (mu - 0.02, sigma),
                _ => (mu, sigma),
            },
            AdjustmentRule::PeRatio => match fundamentals.pe_ratio {
                Some(pe) if pe > 80.0 => (mu - 0.03, sigma + 0.20),
                Some(pe) if pe > 50.0 => (mu, sigma + 0.10),
                Some(pe) if pe > 0.0 && pe < 15.0 => (mu + 0.01, sigma),
                _ => (mu, sigma),
            },
            AdjustmentRule::DebtEquity => match fundamentals.debt_to_equity {
                Some(de) if de > 3.0 => (mu, sigma + 0.15),
                Some(de) if de > 1.5 => (mu, sigma + 0.08),
                Some(de) if de > 0.0 && de < 0.5 => (mu, sigma - 0.02),
                _ => (mu, sigma),
            },
        }
    }
}

/// Estimate annualized drift and volatility from a chronological series
/// of closing prices, with asset-class safety caps applied.
pub fn estimate_parameters(
    prices: &[f64],
    asset_class: AssetClass,
    fundamentals: &Fundamentals,
) -> Result<ModelParameters, ProjectionError> {
    let returns = simple_returns(prices);
    if returns.is_empty() {
        return Err(ProjectionError::InsufficientData(prices.len()));
    }

    let mu = mean(&returns) * TRADING_DAYS_PER_YEAR;
    let sigma = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    debug!(
        "Raw estimate from {} returns: mu={:.4} sigma={:.4}",
        returns.len(),
        mu,
        sigma
    );

    let (mu, sigma) = match asset_class {
        AssetClass::Gold | AssetClass::Silver => (
            clamp(mu, COMMODITY_MU_RANGE),
            clamp(sigma, COMMODITY_SIGMA_RANGE),
        ),
        AssetClass::Stock => {
            let (mu, sigma) = STOCK_ADJUSTMENTS
                .iter()
                .fold((mu, sigma), |(m, s), rule| rule.apply(fundamentals, m, s));
            (clamp(mu, STOCK_MU_RANGE), clamp(sigma, STOCK_SIGMA_RANGE))
        }
        AssetClass::MutualFund => (mu, sigma),
    };

    Ok(ModelParameters { mu, sigma })
}

/// Simple period-over-period returns of consecutive prices.
fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn clamp(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.clamp(lo, hi)
}
