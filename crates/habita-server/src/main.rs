//! Habita server entry point.

use std::sync::Arc;

use habita_db::{DbManager, run_migrations, seed_reference_data};
use habita_identity::CognitoIdentityProvider;
use habita_server::config::ServerConfig;
use habita_server::{AppState, build_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("habita=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting habita server...");

    let config = ServerConfig::from_env();

    let db = DbManager::connect(&config.db)
        .await
        .expect("database connection failed");
    let client = db.client();
    run_migrations(&client).await.expect("migrations failed");
    seed_reference_data(&client)
        .await
        .expect("reference data seeding failed");

    let identity = CognitoIdentityProvider::new(config.identity.clone())
        .expect("identity client construction failed");

    let state = Arc::new(AppState::new(client, Arc::new(identity)));
    let router = build_router(state, config.cors_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("bind failed");
    tracing::info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, router).await.expect("server error");
}
