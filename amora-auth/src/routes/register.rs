use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::ApiResponse;

use crate::models::{Member, NewMember, NewUser, TokenType, User};
use crate::schema::{members, users};
use crate::services::{password, tokens};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, message = "name must be at least 3 characters"))]
    pub name: String,
    pub password: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "country is required"))]
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Age in whole years on `today`.
pub fn age_on(today: NaiveDate, date_of_birth: NaiveDate) -> i32 {
    let mut age = today.years_since(date_of_birth).unwrap_or(0) as i32;
    if date_of_birth > today {
        age = -1;
    }
    age
}

pub fn validate_gender(gender: &str) -> Result<(), AppError> {
    match gender {
        "male" | "female" => Ok(()),
        _ => Err(AppError::new(ErrorCode::ValidationError, "gender must be 'male' or 'female'")),
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<RegisterResponse>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    password::validate_password(&req.password)?;
    validate_gender(&req.gender)?;

    if age_on(chrono::Utc::now().date_naive(), req.date_of_birth) < 18 {
        return Err(AppError::new(ErrorCode::ValidationError, "you must be at least 18 years old"));
    }

    let password_hash = password::hash_password(&req.password)?;
    let email = req.email.to_lowercase();
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Check if email already exists
    let exists: bool = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);

    if exists {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    // User and member are created together, atomically
    let new_user = NewUser {
        name: req.name.clone(),
        email: email.clone(),
        password_hash: Some(password_hash),
        email_verified: None,
        image: None,
        profile_complete: true,
    };

    let user = conn.transaction::<User, diesel::result::Error, _>(|conn| {
        let user: User = diesel::insert_into(users::table)
            .values(&new_user)
            .get_result(conn)?;

        let new_member = NewMember {
            user_id: user.id,
            name: req.name.clone(),
            gender: req.gender.clone(),
            date_of_birth: req.date_of_birth,
            description: req.description.clone(),
            city: req.city.clone(),
            country: req.country.clone(),
            image: None,
        };
        diesel::insert_into(members::table)
            .values(&new_member)
            .get_result::<Member>(conn)?;

        Ok(user)
    })?;

    // Issue a verification token and email the link
    let token = tokens::issue_email_token(&mut conn, &user.email, TokenType::Verification)?;
    let verify_url = format!("{}/verify-email?token={}", state.config.app_base_url, token.token);
    if let Err(e) = state.email.send_verification_email(&user.email, &verify_url).await {
        tracing::error!(error = %e, "failed to send verification email");
    }

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok(Json(ApiResponse::ok_with_message(
        RegisterResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        },
        "verification email sent",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_boundaries() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        // 18th birthday today counts as 18
        assert_eq!(age_on(today, NaiveDate::from_ymd_opt(2008, 8, 6).unwrap()), 18);
        // birthday tomorrow is still 17
        assert_eq!(age_on(today, NaiveDate::from_ymd_opt(2008, 8, 7).unwrap()), 17);
        assert_eq!(age_on(today, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()), 36);
        // future date of birth never passes an age gate
        assert!(age_on(today, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()) < 0);
    }

    #[test]
    fn gender_values() {
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("female").is_ok());
        assert!(validate_gender("MALE").is_err());
        assert!(validate_gender("").is_err());
    }
}
