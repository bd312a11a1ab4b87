// src/handlers/fundamentals.rs
use warp::reply::Json;
use warp::Rejection;
use crate::services::market_data::fetch_fundamentals;
use log::info;

/// Best-effort: missing or unfetchable ratios are simply absent from the
/// response, so a total failure renders as an empty object.
pub async fn get_fundamentals(symbol: String) -> Result<Json, Rejection> {
    let fundamentals = fetch_fundamentals(&symbol).await;
    info!("Fundamentals for {}: {:?}", symbol, fundamentals);
    Ok(warp::reply::json(&fundamentals))
}
