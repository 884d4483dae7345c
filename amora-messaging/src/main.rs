use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;

use amora_shared::clients::db::{create_pool, DbPool};
use amora_shared::clients::realtime::RealtimeClient;
use amora_shared::clients::redis::RedisClient;
use config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub realtime: RealtimeClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-messaging");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let redis = RedisClient::connect(&config.redis_url).await?;
    let realtime = RealtimeClient::new(redis);

    let state = Arc::new(AppState { db, config, realtime });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/messages", post(routes::messages::create_message).get(routes::messages::list_messages))
        .route("/messages/thread/:user_id", get(routes::messages::get_thread))
        .route("/messages/unread-count", get(routes::messages::get_unread_count))
        .route("/messages/:id", delete(routes::messages::delete_message))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-messaging starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
