pub mod catalog_service;
pub mod document_service;
pub mod report_service;
pub mod request_service;
pub mod search_service;
pub mod user_service;

/// Postgres `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
