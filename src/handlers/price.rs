// src/handlers/price.rs
use warp::reply::Json;
use warp::Rejection;
use crate::handlers::error::ApiError;
use crate::services::market_data::fetch_quote;
use log::{error, info};

pub async fn get_price(symbol: String) -> Result<Json, Rejection> {
    match fetch_quote(&symbol).await {
        Ok(quote) => {
            info!("Quote for {}: c={} pc={}", quote.symbol, quote.c, quote.pc);
            Ok(warp::reply::json(&quote))
        }
        Err(e) => {
            error!("Failed to fetch quote for {}: {}", symbol, e);
            Err(warp::reject::custom(ApiError::external_error(format!(
                "Price not found for {}",
                symbol
            ))))
        }
    }
}
