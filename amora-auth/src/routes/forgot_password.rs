use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::ApiResponse;

use crate::models::{TokenType, User};
use crate::schema::users;
use crate::services::tokens;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let email = req.email.to_lowercase();

    // Rate limit
    let rate_key = format!("reset:rate:{email}");
    let allowed = state.redis.rate_limit_check(&rate_key, 1, 60).await.unwrap_or(true);
    if !allowed {
        return Err(AppError::new(ErrorCode::RateLimited, "please wait before requesting a new link"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user = users::table
        .filter(users::email.eq(&email))
        .first::<User>(&mut conn);

    if let Ok(user) = user {
        let token = tokens::issue_email_token(&mut conn, &user.email, TokenType::PasswordReset)?;
        let reset_url = format!("{}/reset-password?token={}", state.config.app_base_url, token.token);
        if let Err(e) = state.email.send_password_reset_email(&user.email, &reset_url).await {
            tracing::error!(error = %e, "failed to send reset email");
        }
    }

    // Always return success to prevent email enumeration
    Ok(Json(ApiResponse::ok("if the email exists, a reset link has been sent")))
}
