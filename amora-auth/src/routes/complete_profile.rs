use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::{Member, NewMember, User};
use crate::routes::register::{age_on, validate_gender};
use crate::schema::{members, users};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteProfileRequest {
    pub gender: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
}

/// Social-login accounts land without a member profile; this creates it and
/// flips `profile_complete`, mirroring what password registration does in
/// one step.
pub async fn complete_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteProfileRequest>,
) -> AppResult<Json<ApiResponse<Member>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    validate_gender(&req.gender)?;

    if age_on(chrono::Utc::now().date_naive(), req.date_of_birth) < 18 {
        return Err(AppError::new(ErrorCode::ValidationError, "you must be at least 18 years old"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let record: User = users::table
        .find(user.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::NotFound, "user not found"))?;

    if record.profile_complete {
        return Err(AppError::new(ErrorCode::ProfileAlreadyComplete, "profile is already complete"));
    }

    // Name and avatar come from the social profile
    let new_member = NewMember {
        user_id: record.id,
        name: record.name.clone(),
        gender: req.gender,
        date_of_birth: req.date_of_birth,
        description: req.description,
        city: req.city,
        country: req.country,
        image: record.image.clone(),
    };

    let member = conn.transaction::<Member, diesel::result::Error, _>(|conn| {
        let member: Member = diesel::insert_into(members::table)
            .values(&new_member)
            .get_result(conn)?;
        diesel::update(users::table.find(record.id))
            .set(users::profile_complete.eq(true))
            .execute(conn)?;
        Ok(member)
    })?;

    tracing::info!(user_id = %record.id, member_id = %member.id, "social profile completed");

    Ok(Json(ApiResponse::ok(member)))
}
