use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::{TokenPair, UserRole};
use amora_shared::types::ApiResponse;

use crate::models::{NewOAuthAccount, NewRefreshToken, NewUser, OAuthAccount, User};
use crate::schema::{oauth_accounts, refresh_tokens, users};
use crate::services::tokens;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleOAuthRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(alias = "sub")]
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OAuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub is_new_user: bool,
    /// false until the member form is submitted via /auth/complete-profile
    pub profile_complete: bool,
}

pub async fn google_oauth(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleOAuthRequest>,
) -> AppResult<Json<ApiResponse<OAuthResponse>>> {
    // Exchange code for token
    let token_response = state.http_client
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("code", req.code.as_str()),
            ("client_id", &state.config.google_client_id),
            ("client_secret", &state.config.google_client_secret),
            ("redirect_uri", &state.config.google_redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::OAuthError, format!("google token exchange failed: {e}")))?;

    if !token_response.status().is_success() {
        let body = token_response.text().await.unwrap_or_default();
        return Err(AppError::new(ErrorCode::OAuthError, format!("google token error: {body}")));
    }

    let google_token: GoogleTokenResponse = token_response.json().await
        .map_err(|e| AppError::new(ErrorCode::OAuthError, format!("invalid token response: {e}")))?;

    // Fetch user info
    let user_info_response = state.http_client
        .get("https://www.googleapis.com/oauth2/v3/userinfo")
        .bearer_auth(&google_token.access_token)
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::OAuthError, format!("google userinfo failed: {e}")))?;

    let google_user: GoogleUserInfo = user_info_response.json().await
        .map_err(|e| AppError::new(ErrorCode::OAuthError, format!("invalid userinfo response: {e}")))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Check if this OAuth account is already linked
    let existing_oauth = oauth_accounts::table
        .filter(oauth_accounts::provider.eq("google"))
        .filter(oauth_accounts::provider_uid.eq(&google_user.id))
        .first::<OAuthAccount>(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(e.to_string()))?;

    let (user, is_new_user) = if let Some(oauth_account) = existing_oauth {
        let user: User = users::table
            .find(oauth_account.user_id)
            .first(&mut conn)
            .map_err(|_| AppError::new(ErrorCode::OAuthError, "linked user no longer exists"))?;
        (user, false)
    } else {
        let email = google_user.email.to_lowercase();
        let existing_user = users::table
            .filter(users::email.eq(&email))
            .first::<User>(&mut conn)
            .optional()
            .map_err(|e| AppError::internal(e.to_string()))?;

        let is_new = existing_user.is_none();
        let user = match existing_user {
            Some(user) => user,
            None => {
                // Social accounts have no password and arrive verified, but
                // the member profile is still missing at this point.
                let display_name = google_user
                    .name
                    .unwrap_or_else(|| email.split('@').next().unwrap_or("member").to_string());
                let new_user = NewUser {
                    name: display_name,
                    email,
                    password_hash: None,
                    email_verified: Some(chrono::Utc::now()),
                    image: google_user.picture,
                    profile_complete: false,
                };
                diesel::insert_into(users::table)
                    .values(&new_user)
                    .get_result::<User>(&mut conn)?
            }
        };

        let new_oauth = NewOAuthAccount {
            user_id: user.id,
            provider: "google".to_string(),
            provider_uid: google_user.id,
        };
        diesel::insert_into(oauth_accounts::table)
            .values(&new_oauth)
            .execute(&mut conn)?;

        (user, is_new)
    };

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

    tracing::info!(user_id = %user.id, is_new = is_new_user, "google oauth login");

    Ok(Json(ApiResponse::ok(OAuthResponse {
        tokens: token_pair,
        is_new_user,
        profile_complete: user.profile_complete,
    })))
}
