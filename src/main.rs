use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use orar::metrics::init_metrics;
use orar::store::postgres::PgStore;
use orar::{AppState, init_router, logging};
use orar_config::{CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
use orar_db::{init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init_tracing()?;

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let state = AppState::build(
        Arc::new(PgStore::new(pool)),
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    );
    let metrics = init_metrics()?;
    let app = init_router(state, metrics);

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app).await?;
    Ok(())
}
