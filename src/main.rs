mod config;
mod error;
mod handlers;
mod models;
mod services;
mod web;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::NutritionistHandler;
use services::{GeminiService, ModelGateway};
use web::server::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger so RUST_LOG from .env applies
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting AI Nutritionist...");

    let config = Config::from_env()?;

    let gemini = GeminiService::new(config.gemini.clone())?;
    log::info!(
        "✅ Gemini service initialized (vision: {}, text: {})",
        config.gemini.vision_model,
        config.gemini.text_model
    );

    let gateway = Arc::new(gemini) as Arc<dyn ModelGateway>;
    let handler = Arc::new(NutritionistHandler::new(gateway));
    let app = create_router(handler, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
