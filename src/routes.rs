// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::{
    fundamentals::get_fundamentals, price::get_price, project::post_project,
};
use crate::services::cache::KeyValueStore;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        // The only custom rejection source is the upstream price lookup.
        code = warp::http::StatusCode::NOT_FOUND;
        message = api_error.message.clone();
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid request body".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    store: Arc<dyn KeyValueStore>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let store_filter = warp::any().map(move || store.clone());

    let price_route = warp::path!("price" / String)
        .and(warp::get())
        .and_then(get_price);

    let fundamentals_route = warp::path!("fundamentals" / String)
        .and(warp::get())
        .and_then(get_fundamentals);

    let project_route = warp::path!("project")
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter)
        .and_then(post_project);

    info!("All routes configured successfully.");

    price_route
        .or(fundamentals_route)
        .or(project_route)
        .recover(handle_rejection)
}
