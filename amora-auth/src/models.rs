use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{members, oauth_accounts, refresh_tokens, tokens, users};

// --- Users ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub profile_complete: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub profile_complete: bool,
}

// --- Members ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = members)]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub description: String,
    pub city: String,
    pub country: String,
    pub image: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = members)]
pub struct NewMember {
    pub user_id: Uuid,
    pub name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub description: String,
    pub city: String,
    pub country: String,
    pub image: Option<String>,
}

// --- Email tokens ---

/// Single-use credential for email verification or password reset. At most
/// one live token per email: issuing a new one deletes any prior token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Verification,
    PasswordReset,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Verification => "VERIFICATION",
            TokenType::PasswordReset => "PASSWORD_RESET",
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = tokens)]
pub struct Token {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub token_type: String,
    pub expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tokens)]
pub struct NewToken {
    pub email: String,
    pub token: String,
    pub token_type: String,
    pub expires: DateTime<Utc>,
}

// --- Refresh tokens ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = refresh_tokens)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

// --- OAuth accounts ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = oauth_accounts)]
pub struct OAuthAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_uid: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = oauth_accounts)]
pub struct NewOAuthAccount {
    pub user_id: Uuid,
    pub provider: String,
    pub provider_uid: String,
}
