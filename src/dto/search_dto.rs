use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::service::ServiceListing;
use crate::models::service_request::RequestView;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminSearchQuery {
    pub query: String,
    #[serde(rename = "type")]
    pub search_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerSearchQuery {
    pub search_type: String,
    pub search_query: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfessionalSearchForm {
    pub search_criteria: String,
    pub search_term: String,
}

/// A professional who has taken on work for a service, offered to customers
/// searching the catalog.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceProfessionalMatch {
    pub service_id: i64,
    pub service_name: String,
    pub base_price: Decimal,
    pub professional_id: i64,
    pub professional_name: String,
    pub experience_years: i32,
    pub address: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummaryRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub postal_code: String,
    pub approval_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum AdminSearchResults {
    Service(Vec<ServiceListing>),
    Customer(Vec<UserSummaryRow>),
    Professional(Vec<UserSummaryRow>),
    ServiceRequest(Vec<RequestView>),
}
