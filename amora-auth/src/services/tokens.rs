use chrono::{Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use amora_shared::errors::AppError;
use amora_shared::types::auth::{Claims, TokenPair, UserRole};

use crate::models::{NewToken, Token, TokenType};
use crate::schema::tokens;

// --- JWT session tokens ---

pub fn create_access_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, role, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

pub fn create_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn create_token_pair(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    access_ttl: i64,
) -> Result<(TokenPair, String), AppError> {
    let access_token = create_access_token(user_id, role, secret, access_ttl)?;
    let refresh_token = create_refresh_token();
    let refresh_hash = hash_token(&refresh_token);
    let pair = TokenPair::new(access_token, refresh_token, access_ttl);
    Ok((pair, refresh_hash))
}

// --- Single-use email tokens ---

const EMAIL_TOKEN_TTL_HOURS: i64 = 24;

pub fn generate_email_token() -> String {
    let mut bytes = [0u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issue a token for `email`, replacing any prior token for that address so
/// at most one is live at a time. Replace and insert run in one transaction.
pub fn issue_email_token(
    conn: &mut PgConnection,
    email: &str,
    token_type: TokenType,
) -> Result<Token, AppError> {
    let new_token = NewToken {
        email: email.to_string(),
        token: generate_email_token(),
        token_type: token_type.as_str().to_string(),
        expires: Utc::now() + Duration::hours(EMAIL_TOKEN_TTL_HOURS),
    };

    let token = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(tokens::table.filter(tokens::email.eq(email))).execute(conn)?;
        diesel::insert_into(tokens::table)
            .values(&new_token)
            .get_result::<Token>(conn)
    })?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn refresh_token_format() {
        let token = create_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, create_refresh_token());
    }

    #[test]
    fn token_hash_is_stable() {
        let token = "abc123";
        assert_eq!(hash_token(token), hash_token(token));
        assert_eq!(hash_token(token).len(), 64);
        assert_ne!(hash_token(token), hash_token("abc124"));
    }

    #[test]
    fn email_token_format() {
        let token = generate_email_token();
        assert_eq!(token.len(), 96);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn access_token_roundtrip() {
        let user_id = Uuid::now_v7();
        let token = create_access_token(user_id, UserRole::Member, "test-secret", 3600).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test-secret".as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.role, UserRole::Member);
    }
}
