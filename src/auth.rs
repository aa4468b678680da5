use axum::http::{header, HeaderMap};
use chrono::{NaiveDateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::Row;
use thiserror::Error;

use crate::db::DatabaseProxy;

const AUTH_COOKIE_NAME: &str = "auth_token";

/// Resolved caller identity. Session issuance lives elsewhere; this service
/// only resolves an opaque token to a user id or refuses the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("session expired")]
    Expired,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// True when the session lookup itself failed, as opposed to the token
    /// being absent, unknown, or expired. Callers must not answer this with a
    /// 401: the caller's credentials were never checked.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AuthError::Database(_))
    }
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = get_cookie(headers, AUTH_COOKIE_NAME) {
        return Some(token);
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|value| value.to_string())
}

pub async fn verify_request_token(
    proxy: &DatabaseProxy,
    token: &str,
) -> Result<AuthUser, AuthError> {
    let token_hash = hash_token(token);

    let row = sqlx::query(
        r#"SELECT "user_id", "expires_at" FROM "sessions" WHERE "token_hash" = $1 LIMIT 1"#,
    )
    .bind(&token_hash)
    .fetch_optional(proxy.pool())
    .await?;

    let Some(row) = row else {
        return Err(AuthError::InvalidToken);
    };

    let expires_at: NaiveDateTime = row.try_get("expires_at")?;
    if expires_at <= Utc::now().naive_utc() {
        return Err(AuthError::Expired);
    }

    let user_id: String = row.try_get("user_id")?;
    Ok(AuthUser { id: user_id })
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let mut iter = pair.trim().splitn(2, '=');
        if iter.next() == Some(name) {
            return iter.next().map(|value| value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let first = hash_token("abc");
        let second = hash_token("abc");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, hash_token("abd"));
    }

    #[test]
    fn test_extract_token_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=1; auth_token=from-cookie".parse().unwrap(),
        );
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_store_failure_is_not_a_credential_failure() {
        assert!(AuthError::Database(sqlx::Error::PoolTimedOut).is_store_failure());
        assert!(!AuthError::MissingToken.is_store_failure());
        assert!(!AuthError::InvalidToken.is_store_failure());
        assert!(!AuthError::Expired.is_store_failure());
    }

    #[test]
    fn test_extract_token_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer tok".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("tok"));

        let empty = HeaderMap::new();
        assert_eq!(extract_token(&empty), None);
    }
}
