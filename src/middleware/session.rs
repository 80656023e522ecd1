//! Cookie sessions and the role guards built on them.
//!
//! The cookie only carries a signed user id. Every guarded request loads the
//! user again, so a role change or a revoked approval takes effect at once.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::utils::token::{issue_session_token, read_session_token};
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";

const LOGIN_REQUIRED: &str = "Please log in to access this page.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub ttl_minutes: i64,
}

/// Browser-session cookie; the token's own expiry bounds its lifetime.
fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn start_session(jar: CookieJar, settings: &SessionSettings, user: &User) -> Result<CookieJar> {
    let token = issue_session_token(user.id, &settings.secret, settings.ttl_minutes)?;
    tracing::info!(user_id = user.id, role = %user.role(), "session started");
    Ok(jar.add(session_cookie(token)))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}

async fn load_session_user(parts: &Parts, state: &AppState) -> Result<User> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or_else(|| Error::Unauthorized(LOGIN_REQUIRED.into()))?;

    let user_id = read_session_token(&token, &state.session.secret).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        Error::Unauthorized(SESSION_EXPIRED.into())
    })?;

    let user = state
        .user_service
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::Unauthorized(LOGIN_REQUIRED.into()))?;

    // an approval revoked mid-session logs the professional out
    if let Some(reason) = user.professional().and_then(|p| p.approval.login_denial()) {
        return Err(Error::Unauthorized(reason.into()));
    }
    Ok(user)
}

/// Signed-in user if there is one; pages open to everybody use this to send
/// logged-in visitors to their dashboard.
pub struct MaybeUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match load_session_user(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(Error::Unauthorized(_)) => Ok(MaybeUser(None)),
            Err(e) => Err(e),
        }
    }
}

macro_rules! role_guard {
    ($(#[$doc:meta])* $name:ident, $role:expr) => {
        $(#[$doc])*
        pub struct $name(pub User);

        #[axum::async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = Error;

            async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
                let user = load_session_user(parts, state).await?;
                user.authorize($role)?;
                Ok($name(user))
            }
        }
    };
}

role_guard!(
    /// Guard for `/admin/*` pages.
    AdminUser,
    Role::Admin
);
role_guard!(CustomerUser, Role::Customer);
role_guard!(
    /// Only approved professionals get through; pending or rejected ones are
    /// treated as logged out.
    ProfessionalUser,
    Role::Professional
);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::user::UserKind;

    fn customer() -> User {
        User {
            id: 11,
            email: "c@example.com".into(),
            password_hash: String::new(),
            full_name: "Cee".into(),
            address: "Somewhere".into(),
            postal_code: "12345".into(),
            created_at: Utc::now(),
            kind: UserKind::Customer,
        }
    }

    #[test]
    fn session_cookie_is_http_only_and_carries_the_user() {
        let settings = SessionSettings {
            secret: "test-secret".into(),
            ttl_minutes: 30,
        };
        let jar = start_session(CookieJar::new(), &settings, &customer()).unwrap();
        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(read_session_token(cookie.value(), "test-secret").unwrap(), 11);
    }

    #[test]
    fn ending_a_session_drops_the_cookie() {
        let settings = SessionSettings {
            secret: "s".into(),
            ttl_minutes: 5,
        };
        let jar = start_session(CookieJar::new(), &settings, &customer()).unwrap();
        let jar = end_session(jar);
        assert!(jar.get(SESSION_COOKIE).is_none());
    }
}
