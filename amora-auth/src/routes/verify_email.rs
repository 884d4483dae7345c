use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::ApiResponse;

use crate::models::{Token, TokenType, User};
use crate::schema::{tokens, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let token: Token = tokens::table
        .filter(tokens::token.eq(&req.token))
        .filter(tokens::token_type.eq(TokenType::Verification.as_str()))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid, "invalid token"))?;

    if token.expires < chrono::Utc::now() {
        return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
    }

    let user: User = users::table
        .filter(users::email.eq(&token.email))
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::NotFound, "user not found"))?;

    // Mark verified and consume the token together
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::update(users::table.find(user.id))
            .set(users::email_verified.eq(Some(chrono::Utc::now())))
            .execute(conn)?;
        diesel::delete(tokens::table.find(token.id)).execute(conn)?;
        Ok(())
    })?;

    tracing::info!(user_id = %user.id, "email verified");

    Ok(Json(ApiResponse::ok("email verified")))
}
