use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::ApiResponse;

use crate::models::{Token, TokenType, User};
use crate::schema::{refresh_tokens, tokens, users};
use crate::services::password;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    password::validate_password(&req.password)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let token: Token = tokens::table
        .filter(tokens::token.eq(&req.token))
        .filter(tokens::token_type.eq(TokenType::PasswordReset.as_str()))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid, "invalid token"))?;

    if token.expires < chrono::Utc::now() {
        return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
    }

    let user: User = users::table
        .filter(users::email.eq(&token.email))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::NotFound, "user not found"))?;

    let new_hash = password::hash_password(&req.password)?;

    // New hash lands and the token is consumed atomically
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::update(users::table.find(user.id))
            .set((
                users::password_hash.eq(Some(new_hash)),
                users::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(conn)?;
        diesel::delete(tokens::table.find(token.id)).execute(conn)?;
        Ok(())
    })?;

    // Revoke all live sessions for this user
    diesel::update(
        refresh_tokens::table
            .filter(refresh_tokens::user_id.eq(user.id))
            .filter(refresh_tokens::revoked_at.is_null()),
    )
    .set(refresh_tokens::revoked_at.eq(Some(chrono::Utc::now())))
    .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, "password reset");

    Ok(Json(ApiResponse::ok("password updated, please log in again")))
}
