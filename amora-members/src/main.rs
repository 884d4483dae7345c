use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;

use amora_shared::clients::db::{create_pool, DbPool};
use amora_shared::clients::minio::MinioClient;
use amora_shared::clients::realtime::RealtimeClient;
use amora_shared::clients::redis::RedisClient;
use config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub minio: MinioClient,
    pub realtime: RealtimeClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-members");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let redis = RedisClient::connect(&config.redis_url).await?;
    let realtime = RealtimeClient::new(redis);
    let minio = MinioClient::new(
        &config.minio_endpoint,
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
        &config.minio_public_url,
    )
    .await;

    let state = Arc::new(AppState { db, config, minio, realtime });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Member directory
        .route("/members", get(routes::members::list_members))
        .route("/members/:user_id", get(routes::members::get_member))
        .route("/members/:user_id/photos", get(routes::members::get_member_photos))
        // Own profile
        .route("/me", patch(routes::profile::update_profile))
        .route("/me/last-active", post(routes::profile::update_last_active))
        // Photos
        .route("/me/photos", post(routes::photos::upload_photo)
            .layer(DefaultBodyLimit::max(10 * 1024 * 1024)))
        .route("/me/photos/:id", axum::routing::delete(routes::photos::delete_photo))
        .route("/me/photos/:id/main", put(routes::photos::set_main_photo))
        // Likes
        .route("/likes", get(routes::likes::list_like_ids))
        .route("/likes/members", get(routes::likes::list_liked_members))
        .route("/likes/:target_id", put(routes::likes::toggle_like))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-members starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
