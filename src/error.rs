use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::flash::{redirect_with_flash, FlashLevel};
use crate::views::error_page;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signed-in user hit a page that belongs to another role.
    #[error("Access denied")]
    AccessDenied { home: &'static str },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Errors caused by what the user did, which pages report with a flash message
    /// instead of failing the request.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::AccessDenied { .. }
                | Error::Forbidden(_)
                | Error::InvalidTransition(_)
                | Error::Conflict(_)
                | Error::Validation(_)
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Error::AccessDenied { .. } => "Access denied.".to_string(),
            Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::InvalidTransition(msg)
            | Error::Conflict(msg)
            | Error::Validation(msg) => msg.clone(),
            _ => "An unexpected error occurred".to_string(),
        }
    }

    /// Turns a user-facing error into a warning flash on `to`; anything else is
    /// handed back so the request fails normally.
    pub fn flash_or_fail(self, to: &str) -> Result<Response> {
        if self.is_user_facing() {
            let level = match self {
                Error::Validation(_) => FlashLevel::Danger,
                _ => FlashLevel::Warning,
            };
            Ok(redirect_with_flash(to, level, &self.user_message()))
        } else {
            Err(self)
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Unauthorized(msg) => {
                return redirect_with_flash("/login", FlashLevel::Info, &msg);
            }
            Error::AccessDenied { home } => {
                return redirect_with_flash(home, FlashLevel::Danger, "Access denied.");
            }
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::InvalidTransition(msg) => (StatusCode::CONFLICT, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, error_page(status, &message)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(crate::utils::validation::describe(&errors))
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::PasswordHash(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = Error::Unauthorized("Please log in.".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }

    #[test]
    fn access_denied_redirects_home() {
        let response = Error::AccessDenied {
            home: "/customer/dashboard",
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/customer/dashboard");
    }

    #[test]
    fn conflict_is_flashed_but_database_errors_are_not() {
        let flashed = Error::Conflict("taken".into()).flash_or_fail("/professional/dashboard");
        assert_eq!(flashed.unwrap().status(), StatusCode::SEE_OTHER);

        let failed = Error::Internal("boom".into()).flash_or_fail("/professional/dashboard");
        assert!(matches!(failed, Err(Error::Internal(_))));
    }

    #[test]
    fn not_found_renders_page() {
        let response = Error::NotFound("Service not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
