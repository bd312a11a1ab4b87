// src/bin/train_model.rs
//
// Placeholder for the offline training pipeline. In a real scenario this
// would download a daily-price dataset, engineer rolling-window features,
// fit a returns model and a volatility model, and save the fitted
// artifacts for the service to load. The service never invokes it.
use finsim_projection::BoxError;
use log::info;

fn main() -> Result<(), BoxError> {
    env_logger::init();

    info!("Starting Offline Training...");

    info!("Fetching Dataset...");
    // Daily close history for the training universe.

    info!("Feature Engineering...");
    // Rolling 1Y / 3Y return and volatility windows.

    info!("Training Return Model...");
    info!("Training Volatility Model...");

    info!("Saving Models...");
    // Serialize fitted artifacts next to the cache store.

    info!("Training Complete. (MOCK)");
    Ok(())
}
