mod app;
mod core;

use crate::app::lifecycle::{StartupContext, build_shutdown_pipeline, build_start_pipeline};
use actix_web::rt::signal;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[actix_web::main]
async fn main() {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "exchange.yaml".to_string());

    let startup_pipeline = build_start_pipeline(config_path.into());
    let startup_ctx = StartupContext::default();

    match startup_pipeline.run(&startup_ctx).await {
        Ok(_) => tracing::info!("startup successful"),
        Err(e) => panic!("startup failed: {e:?}"),
    }

    signal::ctrl_c().await.expect("failed to listen for sigint");

    let shutdown_pipeline = build_shutdown_pipeline();
    match shutdown_pipeline.run(&startup_ctx).await {
        Ok(_) => tracing::info!("shutdown successful"),
        Err(e) => tracing::error!("shutdown encountered errors: {e:?}"),
    }
}
