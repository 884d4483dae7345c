use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::User;
use crate::schema::users;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
    pub profile_complete: bool,
    pub email_verified: bool,
}

/// Identity for the navbar: name, avatar, and the flags the client routes on.
pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MeResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record: User = users::table
        .find(user.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::NotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(MeResponse {
        id: record.id,
        name: record.name,
        email: record.email,
        image: record.image,
        role: record.role,
        profile_complete: record.profile_complete,
        email_verified: record.email_verified.is_some(),
    })))
}
