// src/services/projection.rs
use log::{error, info, warn};
use std::collections::BTreeMap;

use crate::error::ProjectionError;
use crate::models::{
    AssetClass, Fundamentals, HorizonOutcome, ModelParameters, ProjectionRequest, ProjectionResult,
};
use crate::services::cache::KeyValueStore;
use crate::services::{estimator, market_data, simulation};

/// Bump to invalidate previously cached projections wholesale.
pub const CACHE_VERSION: &str = "v2";
/// Bump when the shape or meaning of cached parameters changes.
pub const PARAM_SCHEMA_VERSION: &str = "v1";

const PROJECTION_TTL_SECONDS: i64 = 24 * 60 * 60;
const PARAMETER_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Parameters used whenever real history cannot be obtained.
pub const DEFAULT_MU: f64 = 0.06;
pub const DEFAULT_SIGMA: f64 = 0.10;

/// Projection horizons, in years.
pub const HORIZONS: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Last-resort deterministic growth assumptions.
const FALLBACK_GROWTH_RATE: f64 = 0.05;
const FALLBACK_BAND: f64 = 0.10;

/// Produce a projection for the request. This is the full degrade chain:
/// projection cache, parameter cache, live estimation, simulation, and
/// finally a deterministic closed-form fallback. It always returns a
/// finite-valued, well-formed result.
pub async fn run_projection(
    store: &dyn KeyValueStore,
    request: &ProjectionRequest,
) -> ProjectionResult {
    let symbol = request.asset_class.canonical_symbol(&request.symbol);

    let projection_key = format!(
        "projection:{}:{}:{}:{}",
        CACHE_VERSION, request.asset_class, symbol, request.invested_amount
    );
    if let Some(cached) = store.get(&projection_key) {
        match serde_json::from_value::<ProjectionResult>(cached) {
            Ok(result) => {
                info!("Projection cache hit for {}", projection_key);
                return result;
            }
            Err(e) => warn!(
                "Discarding unreadable projection cache entry {}: {}",
                projection_key, e
            ),
        }
    }

    let result = match compute_projection(store, request, symbol).await {
        Ok(result) => result,
        Err(e) => {
            error!(
                "Projection computation failed for {} ({}), using deterministic fallback: {}",
                symbol, request.asset_class, e
            );
            fallback_projection(request.invested_amount)
        }
    };

    let result = sanitize_result(result);

    match serde_json::to_value(&result) {
        Ok(value) => store.set(&projection_key, value, PROJECTION_TTL_SECONDS),
        Err(e) => warn!(
            "Skipping projection cache write for {}: {}",
            projection_key, e
        ),
    }

    result
}

async fn compute_projection(
    store: &dyn KeyValueStore,
    request: &ProjectionRequest,
    symbol: &str,
) -> Result<ProjectionResult, ProjectionError> {
    if !request.invested_amount.is_finite() || request.invested_amount <= 0.0 {
        return Err(ProjectionError::Computation(format!(
            "invested amount {} is not usable",
            request.invested_amount
        )));
    }

    let (params, is_simulated) = resolve_parameters(store, request, symbol).await;

    if !params.mu.is_finite() || !params.sigma.is_finite() || params.sigma < 0.0 {
        return Err(ProjectionError::Computation(format!(
            "degenerate parameters mu={} sigma={}",
            params.mu, params.sigma
        )));
    }

    let projection = simulation::simulate_horizons(
        request.invested_amount,
        &params,
        &HORIZONS,
        simulation::DEFAULT_PATHS,
    );

    Ok(ProjectionResult {
        params,
        projection,
        is_simulated,
    })
}

/// Parameter-cache lookup, then live estimation, then the process-wide
/// defaults. The returned flag is true only on the default branch.
async fn resolve_parameters(
    store: &dyn KeyValueStore,
    request: &ProjectionRequest,
    symbol: &str,
) -> (ModelParameters, bool) {
    let parameter_key = format!(
        "params:{}:{}:{}",
        PARAM_SCHEMA_VERSION, request.asset_class, symbol
    );

    if let Some(cached) = store.get(&parameter_key) {
        match serde_json::from_value::<ModelParameters>(cached) {
            Ok(params) => {
                info!("Parameter cache hit for {}", parameter_key);
                return (params, false);
            }
            Err(e) => warn!(
                "Discarding unreadable parameter cache entry {}: {}",
                parameter_key, e
            ),
        }
    }

    match estimate_live(request, symbol).await {
        Ok(params) => {
            info!(
                "Estimated parameters for {}: mu={:.4} sigma={:.4}",
                symbol, params.mu, params.sigma
            );
            match serde_json::to_value(params) {
                Ok(value) => store.set(&parameter_key, value, PARAMETER_TTL_SECONDS),
                Err(e) => warn!(
                    "Skipping parameter cache write for {}: {}",
                    parameter_key, e
                ),
            }
            (params, false)
        }
        Err(e) => {
            // Defaults are never written to the parameter cache; a later
            // request should retry the real estimation.
            warn!("Falling back to default parameters for {}: {}", symbol, e);
            (
                ModelParameters {
                    mu: DEFAULT_MU,
                    sigma: DEFAULT_SIGMA,
                },
                true,
            )
        }
    }
}

async fn estimate_live(
    request: &ProjectionRequest,
    symbol: &str,
) -> Result<ModelParameters, ProjectionError> {
    let prices = market_data::fetch_price_history(symbol).await?;
    let fundamentals = gather_fundamentals(request, symbol).await;
    estimator::estimate_parameters(&prices, request.asset_class, &fundamentals)
}

/// Caller-supplied ratios win; for stocks, anything missing is filled
/// best-effort from the fundamentals collaborator. Other asset classes
/// never consult fundamentals.
async fn gather_fundamentals(request: &ProjectionRequest, symbol: &str) -> Fundamentals {
    let supplied = Fundamentals {
        pe_ratio: request.pe_ratio,
        eps: request.eps,
        roe: request.roe,
        debt_to_equity: request.debt_to_equity,
    };

    if request.asset_class != AssetClass::Stock {
        return supplied;
    }
    if supplied.pe_ratio.is_some()
        && supplied.eps.is_some()
        && supplied.roe.is_some()
        && supplied.debt_to_equity.is_some()
    {
        return supplied;
    }

    let fetched = market_data::fetch_fundamentals(symbol).await;
    supplied.or_else_from(&fetched)
}

/// Closed-form compound growth used when everything else has failed.
/// This path performs no I/O and cannot fail.
pub fn fallback_projection(invested_amount: f64) -> ProjectionResult {
    let mut projection = BTreeMap::new();
    for horizon in HORIZONS {
        let expected = invested_amount * (1.0 + FALLBACK_GROWTH_RATE).powi(horizon as i32);
        projection.insert(
            horizon,
            HorizonOutcome {
                expected_value: expected,
                best_case: expected * (1.0 + FALLBACK_BAND),
                worst_case: expected * (1.0 - FALLBACK_BAND),
            },
        );
    }

    ProjectionResult {
        params: ModelParameters {
            mu: DEFAULT_MU,
            sigma: DEFAULT_SIGMA,
        },
        projection,
        is_simulated: true,
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Every numeric field must serialize to a plain JSON number.
fn sanitize_result(mut result: ProjectionResult) -> ProjectionResult {
    result.params.mu = finite_or(result.params.mu, DEFAULT_MU);
    result.params.sigma = finite_or(result.params.sigma, DEFAULT_SIGMA);
    for outcome in result.projection.values_mut() {
        outcome.expected_value = finite_or(outcome.expected_value, 0.0);
        outcome.best_case = finite_or(outcome.best_case, 0.0);
        outcome.worst_case = finite_or(outcome.worst_case, 0.0);
    }
    result
}
