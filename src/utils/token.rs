//! Session tokens: an HS256 JWT that names the user and nothing else. Role and
//! approval status are looked up again on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_session_token(
    user_id: i64,
    secret: &str,
    ttl_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(ttl_minutes)).timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn read_session_token(token: &str, secret: &str) -> Result<i64, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_names_the_user() {
        let token = issue_session_token(42, "secret", 30).unwrap();
        assert_eq!(read_session_token(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_session_token(42, "secret", 30).unwrap();
        assert!(read_session_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_session_token(42, "secret", -10).unwrap();
        assert!(read_session_token(&token, "secret").is_err());
    }
}
