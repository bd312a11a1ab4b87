// src/services/market_data.rs
use log::{debug, error, info};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

use crate::error::ProjectionError;
use crate::models::{Fundamentals, PriceQuote};

/// Lookback window for daily close history. The quote endpoint reuses the
/// same window so live prices stay consistent with what the estimator
/// sees.
const HISTORY_RANGE: &str = "10y";
const HISTORY_INTERVAL: &str = "1d";

/// A hung upstream is treated the same as an unreachable one.
const FETCH_TIMEOUT_SECS: u64 = 20;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn base_url() -> String {
    env::var("MARKET_DATA_BASE_URL")
        .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string())
}

fn http_client() -> Result<Client, ProjectionError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProjectionError::FetchFailure(e.to_string()))
}

/// Ticker symbols are interpolated into upstream URLs; anything outside
/// the usual ticker alphabet is rejected before we go on the wire.
fn is_valid_symbol(symbol: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9.^=-]{1,12}$")
        .map(|re| re.is_match(symbol))
        .unwrap_or(false)
}

/// Fetch the 10-year daily closing-price series for a ticker. Null and
/// non-positive data points are dropped; an empty result is a failure.
pub async fn fetch_price_history(symbol: &str) -> Result<Vec<f64>, ProjectionError> {
    if !is_valid_symbol(symbol) {
        return Err(ProjectionError::FetchFailure(format!(
            "invalid ticker symbol: {}",
            symbol
        )));
    }

    let url = format!(
        "{}/v8/finance/chart/{}?range={}&interval={}",
        base_url(),
        symbol,
        HISTORY_RANGE,
        HISTORY_INTERVAL
    );
    info!("Fetching price history from URL: {}", url);

    let client = http_client()?;
    let body: Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let closes = body
        .pointer("/chart/result/0/indicators/quote/0/close")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProjectionError::FetchFailure(format!("no close series in response for {}", symbol))
        })?;

    let prices: Vec<f64> = closes
        .iter()
        .filter_map(Value::as_f64)
        .filter(|p| *p > 0.0)
        .collect();

    if prices.is_empty() {
        return Err(ProjectionError::FetchFailure(format!(
            "empty history for {}",
            symbol
        )));
    }

    debug!("Fetched {} closing prices for {}", prices.len(), symbol);
    Ok(prices)
}

/// Current and previous close for the price endpoint.
pub async fn fetch_quote(symbol: &str) -> Result<PriceQuote, ProjectionError> {
    let prices = fetch_price_history(symbol).await?;

    let c = prices[prices.len() - 1];
    // With a single data point the previous close defaults to the current.
    let pc = if prices.len() > 1 {
        prices[prices.len() - 2]
    } else {
        c
    };

    Ok(PriceQuote {
        symbol: symbol.to_string(),
        c,
        pc,
    })
}

/// Best-effort fundamental ratios. Anything that cannot be fetched or
/// parsed is simply absent; this never fails.
pub async fn fetch_fundamentals(symbol: &str) -> Fundamentals {
    match try_fetch_fundamentals(symbol).await {
        Ok(fundamentals) => fundamentals,
        Err(e) => {
            error!("Fundamentals lookup failed for {}: {}", symbol, e);
            Fundamentals::default()
        }
    }
}

async fn try_fetch_fundamentals(symbol: &str) -> Result<Fundamentals, ProjectionError> {
    if !is_valid_symbol(symbol) {
        return Err(ProjectionError::FetchFailure(format!(
            "invalid ticker symbol: {}",
            symbol
        )));
    }

    let url = format!(
        "{}/v10/finance/quoteSummary/{}?modules=summaryDetail%2CfinancialData%2CdefaultKeyStatistics",
        base_url(),
        symbol
    );
    info!("Fetching fundamentals from URL: {}", url);

    let client = http_client()?;
    let body: Value = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let result = body
        .pointer("/quoteSummary/result/0")
        .cloned()
        .unwrap_or(Value::Null);

    // The provider quotes debt/equity in percent; the adjustment bands
    // expect a plain ratio.
    let debt_to_equity = result
        .pointer("/financialData/debtToEquity/raw")
        .and_then(Value::as_f64)
        .map(|v| v / 100.0);

    Ok(Fundamentals {
        pe_ratio: result
            .pointer("/summaryDetail/trailingPE/raw")
            .and_then(Value::as_f64),
        eps: result
            .pointer("/defaultKeyStatistics/trailingEps/raw")
            .and_then(Value::as_f64),
        roe: result
            .pointer("/financialData/returnOnEquity/raw")
            .and_then(Value::as_f64),
        debt_to_equity,
    })
}
