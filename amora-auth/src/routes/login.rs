use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::{TokenPair, UserRole};
use amora_shared::types::ApiResponse;

use crate::models::{NewRefreshToken, TokenType, User};
use crate::schema::{refresh_tokens, users};
use crate::services::{password, tokens};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user: User = users::table
        .filter(users::email.eq(req.email.to_lowercase()))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    // Social-login accounts have no password
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    if !password::verify_password(&req.password, hash)? {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"));
    }

    // Unverified addresses cannot log in; re-send the verification link
    if user.email_verified.is_none() {
        let token = tokens::issue_email_token(&mut conn, &user.email, TokenType::Verification)?;
        let verify_url = format!("{}/verify-email?token={}", state.config.app_base_url, token.token);
        if let Err(e) = state.email.send_verification_email(&user.email, &verify_url).await {
            tracing::error!(error = %e, "failed to send verification email");
        }
        return Err(AppError::new(
            ErrorCode::EmailNotVerified,
            "please verify your email before logging in",
        ));
    }

    let role = user.role.parse::<UserRole>().unwrap_or(UserRole::Member);

    let (token_pair, refresh_hash) = tokens::create_token_pair(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_access_ttl,
    )?;

    let new_rt = NewRefreshToken {
        user_id: user.id,
        token_hash: refresh_hash,
        expires_at: chrono::Utc::now() + chrono::Duration::seconds(state.config.jwt_refresh_ttl),
    };
    diesel::insert_into(refresh_tokens::table)
        .values(&new_rt)
        .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(ApiResponse::ok(token_pair)))
}
