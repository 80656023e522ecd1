use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: i64,
}

/// Service joined with the name of its category, for listings. The request
/// count is what a delete would take with it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceListing {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: i64,
    pub category_name: String,
    pub request_count: i64,
}
