//! Read-only search pages. A blank query returns nothing rather than the
//! whole table.

use sqlx::PgPool;

use crate::dto::search_dto::{AdminSearchResults, ServiceProfessionalMatch, UserSummaryRow};
use crate::error::{Error, Result};
use crate::models::service::ServiceListing;
use crate::models::service_request::RequestView;
use crate::services::request_service::REQUEST_VIEW_SELECT;
use crate::utils::validation::{like_pattern, like_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSearchKind {
    Service,
    Customer,
    Professional,
    ServiceRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSearchKind {
    ServiceName,
    PostalCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfessionalSearchKind {
    Date,
    Address,
    PostalCode,
}

impl AdminSearchKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "service" => Ok(Self::Service),
            "customer" => Ok(Self::Customer),
            "professional" => Ok(Self::Professional),
            "service_request" => Ok(Self::ServiceRequest),
            _ => Err(unknown_kind()),
        }
    }
}

impl CustomerSearchKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "service_name" => Ok(Self::ServiceName),
            "postal_code" | "pin_code" => Ok(Self::PostalCode),
            _ => Err(unknown_kind()),
        }
    }
}

impl ProfessionalSearchKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "date" => Ok(Self::Date),
            "address" | "location" => Ok(Self::Address),
            "postal_code" | "pin_code" => Ok(Self::PostalCode),
            _ => Err(unknown_kind()),
        }
    }
}

fn unknown_kind() -> Error {
    Error::Validation("Please choose what to search by.".into())
}

fn non_blank(term: &str) -> Option<&str> {
    let term = term.trim();
    (!term.is_empty()).then_some(term)
}

#[derive(Clone)]
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_search(
        &self,
        kind: AdminSearchKind,
        term: &str,
    ) -> Result<Option<AdminSearchResults>> {
        let Some(term) = non_blank(term) else {
            return Ok(None);
        };
        let pattern = like_pattern(term);

        let results = match kind {
            AdminSearchKind::Service => {
                let rows = sqlx::query_as::<_, ServiceListing>(
                    r#"
                    SELECT s.id, s.name, s.description, s.base_price, s.category_id,
                           c.name AS category_name,
                           (SELECT COUNT(*) FROM service_requests sr WHERE sr.service_id = s.id) AS request_count
                    FROM services s
                    JOIN service_categories c ON c.id = s.category_id
                    WHERE s.name ILIKE $1 OR s.description ILIKE $1
                    ORDER BY s.name ASC
                    "#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?;
                AdminSearchResults::Service(rows)
            }
            AdminSearchKind::Customer => {
                AdminSearchResults::Customer(self.users_matching("customer", &pattern).await?)
            }
            AdminSearchKind::Professional => AdminSearchResults::Professional(
                self.users_matching("professional", &pattern).await?,
            ),
            AdminSearchKind::ServiceRequest => {
                let rows = sqlx::query_as::<_, RequestView>(&format!(
                    r#"{}
                    WHERE sr.status ILIKE $1 OR s.name ILIKE $1 OR p.full_name ILIKE $1
                    ORDER BY sr.created_at DESC, sr.id DESC
                    "#,
                    REQUEST_VIEW_SELECT
                ))
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?;
                AdminSearchResults::ServiceRequest(rows)
            }
        };
        Ok(Some(results))
    }

    async fn users_matching(&self, role: &str, pattern: &str) -> Result<Vec<UserSummaryRow>> {
        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT id, email, full_name, postal_code, approval_status, created_at
            FROM users
            WHERE role = $1 AND (full_name ILIKE $2 OR email ILIKE $2)
            ORDER BY full_name ASC
            "#,
        )
        .bind(role)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Approved professionals who have taken on work for matching services.
    pub async fn customer_search(
        &self,
        kind: CustomerSearchKind,
        term: &str,
    ) -> Result<Vec<ServiceProfessionalMatch>> {
        let Some(term) = non_blank(term) else {
            return Ok(Vec::new());
        };
        let filter = match kind {
            CustomerSearchKind::ServiceName => "s.name ILIKE $1",
            CustomerSearchKind::PostalCode => "p.postal_code ILIKE $1",
        };

        let rows = sqlx::query_as::<_, ServiceProfessionalMatch>(&format!(
            r#"
            SELECT DISTINCT s.id AS service_id, s.name AS service_name, s.base_price,
                   p.id AS professional_id, p.full_name AS professional_name,
                   COALESCE(p.experience_years, 0) AS experience_years,
                   p.address, p.postal_code
            FROM service_requests sr
            JOIN services s ON s.id = sr.service_id
            JOIN users p ON p.id = sr.professional_id
            WHERE p.approval_status = 'approved' AND {}
            ORDER BY service_name ASC, professional_name ASC
            "#,
            filter
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn professional_search(
        &self,
        professional_id: i64,
        kind: ProfessionalSearchKind,
        term: &str,
    ) -> Result<Vec<RequestView>> {
        let Some(term) = non_blank(term) else {
            return Ok(Vec::new());
        };
        let (filter, pattern) = match kind {
            ProfessionalSearchKind::Date => (
                r#"(sr.professional_id = $1 OR EXISTS (
                       SELECT 1 FROM rejected_requests rr
                       WHERE rr.request_id = sr.id AND rr.professional_id = $1))
                   AND to_char(sr.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') LIKE $2"#,
                like_prefix(term),
            ),
            ProfessionalSearchKind::Address => (
                "sr.professional_id = $1 AND cu.address ILIKE $2",
                like_pattern(term),
            ),
            ProfessionalSearchKind::PostalCode => (
                "sr.professional_id = $1 AND cu.postal_code ILIKE $2",
                like_pattern(term),
            ),
        };

        let rows = sqlx::query_as::<_, RequestView>(&format!(
            "{} WHERE {} ORDER BY sr.created_at DESC, sr.id DESC",
            REQUEST_VIEW_SELECT, filter
        ))
        .bind(professional_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
