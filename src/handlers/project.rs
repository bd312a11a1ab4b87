// src/handlers/project.rs
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;
use crate::models::ProjectionRequest;
use crate::services::cache::KeyValueStore;
use crate::services::projection::run_projection;
use log::info;

/// The projection endpoint never fails outwardly: every upstream or
/// computation problem is absorbed into `isSimulated` by the engine.
pub async fn post_project(
    request: ProjectionRequest,
    store: Arc<dyn KeyValueStore>,
) -> Result<Json, Rejection> {
    info!(
        "Projection request: {} {} amount={}",
        request.asset_class, request.symbol, request.invested_amount
    );

    let result = run_projection(store.as_ref(), &request).await;
    Ok(warp::reply::json(&result))
}
