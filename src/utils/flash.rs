//! One-shot status messages carried across a redirect in a cookie.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        // serializing a two-field struct cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn set_flash(jar: CookieJar, level: FlashLevel, message: &str) -> CookieJar {
    jar.add(flash_cookie(Flash::new(level, message).encode()))
}

/// Reads the pending flash (if any) and schedules the cookie for removal.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::decode(c.value()));
    if jar.get(FLASH_COOKIE).is_some() {
        (jar.remove(flash_cookie(String::new())), flash)
    } else {
        (jar, flash)
    }
}

pub fn redirect_with_flash(to: &str, level: FlashLevel, message: &str) -> Response {
    let jar = set_flash(CookieJar::new(), level, message);
    (jar, Redirect::to(to)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

    fn jar_with_cookie(raw: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", FLASH_COOKIE, raw)).unwrap(),
        );
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn flash_survives_the_cookie_round_trip() {
        let flash = Flash::new(FlashLevel::Warning, "This request is no longer available.");
        let jar = jar_with_cookie(&flash.encode());
        let (_, taken) = take_flash(jar);
        assert_eq!(taken, Some(flash));
    }

    #[test]
    fn tampered_cookie_is_ignored() {
        let (_, taken) = take_flash(jar_with_cookie("%%%not-base64"));
        assert!(taken.is_none());
    }

    #[test]
    fn missing_cookie_yields_nothing() {
        let (_, taken) = take_flash(CookieJar::new());
        assert!(taken.is_none());
    }

    #[test]
    fn redirect_sets_cookie_and_location() {
        let response = redirect_with_flash("/login", FlashLevel::Success, "Registration successful!");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash="));
    }
}
