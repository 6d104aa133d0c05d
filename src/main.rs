use anyhow::Context;
use cardsmith::{
    config::{self, CliArgs},
    create_app, db,
    services::{FlashcardGenerator, GenerationService, OpenRouterClient, OpenRouterConfig},
    AppState,
};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenv::dotenv().ok();

    // Initialize logging, defaulting to info level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Resolve configuration from defaults, config file, env and CLI args
    let args = CliArgs::parse();
    let config = config::get_config(args);

    let api_key = config
        .openrouter_api_key
        .clone()
        .context("OPENROUTER_API_KEY must be set")?;

    // Initialize the database pool and apply migrations
    let pool = Arc::new(db::init_pool(&config.database_url));
    {
        let mut conn = pool
            .get()
            .context("Failed to get a database connection for migrations")?;
        cardsmith::run_migrations(&mut conn);
    }

    // Wire up the generation pipeline
    let chat_client = Arc::new(OpenRouterClient::new(OpenRouterConfig {
        api_key,
        base_url: config.openrouter_base_url.clone(),
        default_model: config.openrouter_model.clone(),
        default_system_message: "You are a helpful AI assistant.".to_string(),
    }));
    let generator = Arc::new(FlashcardGenerator::new(chat_client));
    let generations = Arc::new(GenerationService::new(pool.clone(), generator));

    // Build the application with routes
    let app = create_app(AppState { pool, generations });

    // Run it
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
