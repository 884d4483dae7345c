use axum::routing::{get, post};
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
use amora_shared::clients::email::EmailClient;
use amora_shared::clients::redis::RedisClient;
use config::AppConfig;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub redis: RedisClient,
    pub email: EmailClient,
    pub http_client: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-auth");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let redis = RedisClient::connect(&config.redis_url).await?;
    let email = EmailClient::new(&config.resend_api_key, &config.email_from, &config.email_from_name);
    let http_client = reqwest::Client::new();

    let state = Arc::new(AppState { db, config, redis, email, http_client });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Registration and sessions
        .route("/auth/register", post(routes::register::register))
        .route("/auth/login", post(routes::login::login))
        .route("/auth/logout", post(routes::logout::logout))
        .route("/auth/refresh", post(routes::refresh::refresh_token))
        .route("/auth/me", get(routes::me::me))
        // Email verification and password reset
        .route("/auth/verify-email", post(routes::verify_email::verify_email))
        .route("/auth/forgot-password", post(routes::forgot_password::forgot_password))
        .route("/auth/reset-password", post(routes::reset_password::reset_password))
        // Social login
        .route("/auth/oauth/google", post(routes::oauth::google_oauth))
        .route("/auth/complete-profile", post(routes::complete_profile::complete_profile))
        // Realtime channel subscription authorization
        .route("/realtime/auth", post(routes::realtime_auth::realtime_auth))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-auth starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
