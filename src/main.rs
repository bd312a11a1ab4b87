use env_logger;
use log::{info, warn};
use warp::Filter;
use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use finsim_projection::routes;
use finsim_projection::services::cache::{FileCache, KeyValueStore};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    // Get port from the environment, default to 8000
    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 8000");
        "8000".to_string()
    });

    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    // The cache store is an explicit instance handed to the routes, never
    // a process-wide global.
    let cache_file = env::var("CACHE_FILE").unwrap_or_else(|_| {
        warn!("$CACHE_FILE not set, defaulting to cache_store.json");
        "cache_store.json".to_string()
    });
    let store: Arc<dyn KeyValueStore> = Arc::new(FileCache::new(cache_file.as_str()));
    info!("Cache store loaded from {}", cache_file);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    // Set up routes
    let api = routes::routes(store).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;
}
