use axum::extract::{Multipart, Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::{Member, NewPhoto, Photo};
use crate::schema::{members, photos, users};
use crate::AppState;

fn load_own_member(
    conn: &mut diesel::pg::PgConnection,
    user_id: Uuid,
) -> AppResult<Member> {
    members::table
        .filter(members::user_id.eq(user_id))
        .first::<Member>(conn)
        .map_err(|_| AppError::new(ErrorCode::MemberNotFound, "member profile not found"))
}

fn load_owned_photo(
    conn: &mut diesel::pg::PgConnection,
    photo_id: Uuid,
    member_id: Uuid,
) -> AppResult<Photo> {
    let photo = photos::table
        .find(photo_id)
        .first::<Photo>(conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

    if photo.member_id != member_id {
        return Err(AppError::new(ErrorCode::PhotoNotFound, "photo not found"));
    }
    Ok(photo)
}

// --- POST /me/photos ---

/// Uploads go to external storage first, then a row is inserted unapproved;
/// the photo stays invisible to other members until moderation approves it.
pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Photo>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let member = load_own_member(&mut conn, user.id)?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoUploadFailed, "no file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let ext = match content_type.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => {
            return Err(AppError::new(
                ErrorCode::PhotoUploadFailed,
                "unsupported image format, accepted: jpeg, png, webp, gif",
            ));
        }
    };

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, format!("failed to read file data: {e}")))?;

    let file_id = Uuid::now_v7();
    let key = format!("members/{}/{}.{}", member.id, file_id, ext);

    let url = state
        .minio
        .upload(&key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, e))?;

    let new_photo = NewPhoto {
        member_id: member.id,
        url,
        public_id: Some(key),
        is_approved: false,
    };

    let photo: Photo = diesel::insert_into(photos::table)
        .values(&new_photo)
        .get_result(&mut conn)
        .map_err(AppError::Database)?;

    tracing::info!(member_id = %member.id, photo_id = %photo.id, "photo uploaded, awaiting moderation");

    Ok(Json(ApiResponse::ok(photo)))
}

// --- PUT /me/photos/:id/main ---

#[derive(Debug, Serialize)]
pub struct MainPhotoResponse {
    pub image: String,
}

/// Only an approved photo can become the avatar; the url lands on both the
/// member and the owning user record.
pub async fn set_main_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MainPhotoResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let member = load_own_member(&mut conn, user.id)?;
    let photo = load_owned_photo(&mut conn, photo_id, member.id)?;

    if !photo.is_approved {
        return Err(AppError::new(
            ErrorCode::PhotoNotApproved,
            "an unapproved photo cannot be your main photo",
        ));
    }

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::update(users::table.find(user.id))
            .set(users::image.eq(Some(&photo.url)))
            .execute(conn)?;
        diesel::update(members::table.find(member.id))
            .set(members::image.eq(Some(&photo.url)))
            .execute(conn)?;
        Ok(())
    })?;

    Ok(Json(ApiResponse::ok(MainPhotoResponse { image: photo.url })))
}

// --- DELETE /me/photos/:id ---

/// Storage deletion is best-effort: a failed remote delete is logged and the
/// row is removed anyway.
pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let member = load_own_member(&mut conn, user.id)?;
    let photo = load_owned_photo(&mut conn, photo_id, member.id)?;

    if let Some(ref key) = photo.public_id {
        if let Err(e) = state.minio.delete(key).await {
            tracing::error!(error = %e, photo_id = %photo.id, "failed to delete photo from storage");
        }
    }

    diesel::delete(photos::table.find(photo.id)).execute(&mut conn)?;

    tracing::info!(member_id = %member.id, photo_id = %photo.id, "photo deleted");

    Ok(Json(ApiResponse::ok("photo deleted")))
}
