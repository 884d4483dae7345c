use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::clients::realtime;
use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::{Like, Member, NewLike};
use crate::schema::{likes, members, users};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ToggleLikeResponse {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
struct LikeNotification {
    user_id: Uuid,
    name: String,
    image: Option<String>,
}

// --- PUT /likes/:target_id - toggle ---

/// One directed edge per ordered pair. Liking twice removes the edge; the
/// unique pair constraint absorbs concurrent duplicate inserts.
pub async fn toggle_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ToggleLikeResponse>>> {
    if target_id == user.id {
        return Err(AppError::new(ErrorCode::CannotLikeSelf, "you cannot like yourself"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let existing = likes::table
        .filter(likes::source_user_id.eq(user.id))
        .filter(likes::target_user_id.eq(target_id))
        .first::<Like>(&mut conn)
        .optional()?;

    if let Some(like) = existing {
        diesel::delete(likes::table.find(like.id)).execute(&mut conn)?;
        return Ok(Json(ApiResponse::ok(ToggleLikeResponse { liked: false })));
    }

    // Target must exist before an edge is created
    let target_exists: bool = users::table
        .find(target_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);
    if !target_exists {
        return Err(AppError::new(ErrorCode::MemberNotFound, "member not found"));
    }

    let new_like = NewLike {
        source_user_id: user.id,
        target_user_id: target_id,
    };
    let inserted = diesel::insert_into(likes::table)
        .values(&new_like)
        .execute(&mut conn);

    match inserted {
        Ok(_) => {}
        // Lost a race with an identical like; treat as already liked
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Ok(Json(ApiResponse::ok(ToggleLikeResponse { liked: true })));
        }
        Err(e) => return Err(AppError::Database(e)),
    }

    // Nudge the liked user's notification listener
    if let Ok(source) = members::table
        .filter(members::user_id.eq(user.id))
        .first::<Member>(&mut conn)
    {
        let notification = LikeNotification {
            user_id: user.id,
            name: source.name,
            image: source.image,
        };
        state
            .realtime
            .publish(&realtime::private_channel(target_id), realtime::LIKE_NEW, &notification)
            .await;
    }

    tracing::info!(source = %user.id, target = %target_id, "like created");

    Ok(Json(ApiResponse::ok(ToggleLikeResponse { liked: true })))
}

// --- GET /likes - ids the caller has liked ---

pub async fn list_like_ids(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Uuid>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let ids: Vec<Uuid> = likes::table
        .filter(likes::source_user_id.eq(user.id))
        .select(likes::target_user_id)
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(ids)))
}

// --- GET /likes/members?type=source|target|mutual ---

#[derive(Debug, Deserialize)]
pub struct LikedMembersParams {
    #[serde(default = "default_list_type", rename = "type")]
    pub list_type: String,
}

fn default_list_type() -> String { "source".into() }

pub async fn list_liked_members(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<LikedMembersParams>,
) -> AppResult<Json<ApiResponse<Vec<Member>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let user_ids: Vec<Uuid> = match params.list_type.as_str() {
        // members the caller liked
        "source" => likes::table
            .filter(likes::source_user_id.eq(user.id))
            .select(likes::target_user_id)
            .load(&mut conn)?,
        // members who liked the caller
        "target" => likes::table
            .filter(likes::target_user_id.eq(user.id))
            .select(likes::source_user_id)
            .load(&mut conn)?,
        // both edges exist
        "mutual" => {
            let liked: Vec<Uuid> = likes::table
                .filter(likes::source_user_id.eq(user.id))
                .select(likes::target_user_id)
                .load(&mut conn)?;
            likes::table
                .filter(likes::target_user_id.eq(user.id))
                .filter(likes::source_user_id.eq_any(liked))
                .select(likes::source_user_id)
                .load(&mut conn)?
        }
        other => {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                format!("unknown list type '{other}', expected source, target, or mutual"),
            ));
        }
    };

    let liked_members = members::table
        .filter(members::user_id.eq_any(user_ids))
        .order(members::updated.desc())
        .load::<Member>(&mut conn)?;

    Ok(Json(ApiResponse::ok(liked_members)))
}
