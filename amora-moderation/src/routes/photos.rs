use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::middleware::AdminUser;
use amora_shared::types::ApiResponse;

use crate::models::{Member, Photo};
use crate::schema::{members, photos, users};
use crate::AppState;

// --- GET /admin/photos - the approval queue ---

pub async fn list_unapproved(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Photo>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let queue = photos::table
        .filter(photos::is_approved.eq(false))
        .order(photos::created_at.asc())
        .load::<Photo>(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(queue)))
}

// --- POST /admin/photos/:id/approve ---

/// Approving a member's first photo also makes it their avatar: when the
/// owning member has no image yet, the url is backfilled onto both the
/// member and the user record, in the same transaction as the approval.
pub async fn approve_photo(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Photo>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let photo: Photo = photos::table
        .find(photo_id)
        .first(&mut conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

    let member: Member = members::table
        .find(photo.member_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::MemberNotFound, "photo owner not found"))?;

    let approved = conn.transaction::<Photo, diesel::result::Error, _>(|conn| {
        let approved: Photo = diesel::update(photos::table.find(photo.id))
            .set(photos::is_approved.eq(true))
            .get_result(conn)?;

        if member.image.is_none() {
            diesel::update(members::table.find(member.id))
                .set(members::image.eq(Some(&approved.url)))
                .execute(conn)?;
            diesel::update(users::table.find(member.user_id))
                .set(users::image.eq(Some(&approved.url)))
                .execute(conn)?;
        }

        Ok(approved)
    })?;

    tracing::info!(
        admin_id = %admin.0.id,
        photo_id = %photo_id,
        member_id = %member.id,
        "photo approved"
    );

    Ok(Json(ApiResponse::ok(approved)))
}

// --- POST /admin/photos/:id/reject ---

/// Rejection removes the remote asset first, then the row. A failed storage
/// delete is logged and does not keep the row alive (recorded product
/// decision: an orphaned remote asset beats a photo stuck in the queue).
pub async fn reject_photo(
    admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let photo: Photo = photos::table
        .find(photo_id)
        .first(&mut conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

    if let Some(ref key) = photo.public_id {
        if let Err(e) = state.minio.delete(key).await {
            tracing::error!(error = %e, photo_id = %photo.id, "failed to delete rejected photo from storage");
        }
    }

    diesel::delete(photos::table.find(photo.id)).execute(&mut conn)?;

    tracing::info!(admin_id = %admin.0.id, photo_id = %photo_id, "photo rejected");

    Ok(Json(ApiResponse::ok("photo rejected")))
}
