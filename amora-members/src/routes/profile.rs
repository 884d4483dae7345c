use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::Member;
use crate::schema::{members, users};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Member>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let member = members::table
        .filter(members::user_id.eq(user.id))
        .first::<Member>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::MemberNotFound, "member profile not found"))?;

    let name_changed = member.name != req.name;

    let updated = conn.transaction::<Member, diesel::result::Error, _>(|conn| {
        // A renamed member also renames the owning user record
        if name_changed {
            diesel::update(users::table.find(user.id))
                .set(users::name.eq(&req.name))
                .execute(conn)?;
        }

        diesel::update(members::table.find(member.id))
            .set((
                members::name.eq(&req.name),
                members::description.eq(&req.description),
                members::city.eq(&req.city),
                members::country.eq(&req.country),
                members::updated.eq(chrono::Utc::now()),
            ))
            .get_result::<Member>(conn)
    })?;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- POST /me/last-active ---

/// Presence signal: bumps `members.updated`, which feeds the default
/// directory sort and the online indicator.
pub async fn update_last_active(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated_rows = diesel::update(members::table.filter(members::user_id.eq(user.id)))
        .set(members::updated.eq(chrono::Utc::now()))
        .execute(&mut conn)?;

    if updated_rows == 0 {
        return Err(AppError::new(ErrorCode::MemberNotFound, "member profile not found"));
    }

    Ok(Json(ApiResponse::ok("ok")))
}
