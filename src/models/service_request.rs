use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

/// Lifecycle of a booking:
/// `requested -> accepted -> (in_progress) -> completed -> closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Requested,
    Accepted,
    InProgress,
    Completed,
    Closed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Requested,
        RequestStatus::Accepted,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Requested => "requested",
            RequestStatus::Accepted => "accepted",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Closed => "closed",
        }
    }

    /// A professional has been assigned in every state after `requested`.
    pub fn is_claimed(&self) -> bool {
        !matches!(self, RequestStatus::Requested)
    }

    pub fn can_close(&self) -> bool {
        matches!(self, RequestStatus::Accepted | RequestStatus::InProgress)
    }

    pub fn accepts_feedback(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Closed)
    }

    /// Statuses that count as work taken on by a professional.
    pub fn engaged() -> [RequestStatus; 4] {
        [
            RequestStatus::Accepted,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Closed,
        ]
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "request status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceRequest {
    pub id: i64,
    pub customer_id: i64,
    pub professional_id: Option<i64>,
    pub service_id: i64,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
}

/// A request joined with its service, category and both parties, as shown on
/// dashboards and search pages.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RequestView {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub service_id: i64,
    pub service_name: String,
    pub base_price: Decimal,
    pub category_name: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_postal_code: String,
    pub professional_id: Option<i64>,
    pub professional_name: Option<String>,
}
