use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::pagination::{Paginated, PaginationParams};
use amora_shared::types::ApiResponse;

use crate::models::{Member, Photo};
use crate::schema::{members, photos, users};
use crate::services::filters::dob_window;
use crate::AppState;

// --- Filter params ---

#[derive(Debug, Deserialize)]
pub struct MemberFilterParams {
    #[serde(default = "default_age_min")]
    pub age_min: u32,
    #[serde(default = "default_age_max")]
    pub age_max: u32,
    /// comma-separated, e.g. "male,female"
    pub gender: Option<String>,
    #[serde(default = "default_order_by")]
    pub order_by: String,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_age_min() -> u32 { 18 }
fn default_age_max() -> u32 { 100 }
fn default_order_by() -> String { "updated".into() }
fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 12 }

impl MemberFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn genders(&self) -> Option<Vec<String>> {
        let raw = self.gender.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(raw.split(',').map(|g| g.trim().to_string()).collect())
    }
}

// --- GET /members - filtered member directory ---

pub async fn list_members(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<MemberFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Member>>>> {
    if params.age_min > params.age_max {
        return Err(AppError::new(ErrorCode::ValidationError, "age_min cannot exceed age_max"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let today = chrono::Utc::now().date_naive();
    let (earliest, latest) = dob_window(today, params.age_min, params.age_max);
    let genders = params.genders();
    let pagination = params.pagination();

    // Boxed queries cannot be reused, so items and count are built twice
    let mut query = members::table
        .inner_join(users::table)
        .filter(members::user_id.ne(user.id))
        .filter(users::profile_complete.eq(true))
        .filter(members::date_of_birth.between(earliest, latest))
        .select(members::all_columns)
        .into_boxed();
    if let Some(ref genders) = genders {
        query = query.filter(members::gender.eq_any(genders));
    }
    query = match params.order_by.as_str() {
        "created" => query.order(members::created.desc()),
        _ => query.order(members::updated.desc()),
    };

    let items: Vec<Member> = query
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Member>(&mut conn)
        .map_err(AppError::Database)?;

    let mut count_query = members::table
        .inner_join(users::table)
        .filter(members::user_id.ne(user.id))
        .filter(users::profile_complete.eq(true))
        .filter(members::date_of_birth.between(earliest, latest))
        .select(diesel::dsl::count_star())
        .into_boxed();
    if let Some(ref genders) = genders {
        count_query = count_query.filter(members::gender.eq_any(genders));
    }

    let total: i64 = count_query
        .get_result(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &pagination))))
}

// --- GET /members/:user_id ---

pub async fn get_member(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Member>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let member = members::table
        .filter(members::user_id.eq(user_id))
        .first::<Member>(&mut conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound, "member not found"))?;

    Ok(Json(ApiResponse::ok(member)))
}

// --- GET /members/:user_id/photos ---

/// Owners see every photo they uploaded; everyone else only the approved
/// ones. The moderation boundary is enforced here, at read time.
pub async fn get_member_photos(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Photo>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let member = members::table
        .filter(members::user_id.eq(user_id))
        .first::<Member>(&mut conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound, "member not found"))?;

    let mut query = photos::table
        .filter(photos::member_id.eq(member.id))
        .into_boxed();
    if user.id != user_id {
        query = query.filter(photos::is_approved.eq(true));
    }

    let member_photos = query
        .order(photos::created_at.asc())
        .load::<Photo>(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(member_photos)))
}
