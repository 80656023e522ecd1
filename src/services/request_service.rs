//! Booking lifecycle. Every state change is one conditional statement so that
//! the check and the write cannot be separated by a concurrent request; when
//! the statement touches no row the request is re-read to explain why.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::dto::request_dto::Feedback;
use crate::error::{Error, Result};
use crate::models::rejected_request::RejectedRequest;
use crate::models::service_request::{RequestStatus, RequestView, ServiceRequest};
use crate::models::user::{Role, User};

const REQUEST_COLUMNS: &str = "id, customer_id, professional_id, service_id, status, \
     created_at, updated_at, completed_at, rating, review";

pub(crate) const REQUEST_VIEW_SELECT: &str = r#"
    SELECT sr.id, sr.status, sr.created_at, sr.completed_at, sr.rating, sr.review,
           s.id AS service_id, s.name AS service_name, s.base_price, c.name AS category_name,
           cu.id AS customer_id, cu.full_name AS customer_name,
           cu.address AS customer_address, cu.postal_code AS customer_postal_code,
           p.id AS professional_id, p.full_name AS professional_name
    FROM service_requests sr
    JOIN services s ON s.id = sr.service_id
    JOIN service_categories c ON c.id = s.category_id
    JOIN users cu ON cu.id = sr.customer_id
    LEFT JOIN users p ON p.id = sr.professional_id
"#;

/// Everything needed to explain why a conditional update matched nothing.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct RequestScope {
    pub customer_id: i64,
    pub professional_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub category_id: i64,
    pub rejected_by_actor: bool,
}

/// The four lists on a professional's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ProfessionalBoard {
    pub available: Vec<RequestView>,
    pub active: Vec<RequestView>,
    pub finished: Vec<RequestView>,
    pub rejected: Vec<RequestView>,
}

#[derive(Clone)]
pub struct RequestService {
    pool: PgPool,
}

impl RequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, customer: &User, service_id: i64) -> Result<ServiceRequest> {
        customer.authorize(Role::Customer)?;

        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            INSERT INTO service_requests (customer_id, service_id, status)
            SELECT $1, s.id, 'requested' FROM services s WHERE s.id = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(customer.id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service not found".into()))?;

        tracing::info!(request_id = request.id, customer_id = customer.id, service_id, "service requested");
        Ok(request)
    }

    pub async fn get(&self, id: i64) -> Result<ServiceRequest> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {} FROM service_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service request not found".into()))
    }

    pub async fn get_view(&self, id: i64) -> Result<RequestView> {
        sqlx::query_as::<_, RequestView>(&format!("{} WHERE sr.id = $1", REQUEST_VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Service request not found".into()))
    }

    /// Open requests in the professional's category that nobody has claimed
    /// and that this professional has not declined, oldest first.
    pub async fn list_available(&self, professional: &User) -> Result<Vec<RequestView>> {
        professional.authorize(Role::Professional)?;
        let category_id = professional_category(professional)?;

        let rows = sqlx::query_as::<_, RequestView>(&format!(
            r#"{}
            WHERE s.category_id = $1
              AND sr.status = 'requested'
              AND sr.professional_id IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM rejected_requests rr
                  WHERE rr.request_id = sr.id AND rr.professional_id = $2
              )
            ORDER BY sr.created_at ASC, sr.id ASC
            "#,
            REQUEST_VIEW_SELECT
        ))
        .bind(category_id)
        .bind(professional.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn professional_board(&self, professional: &User) -> Result<ProfessionalBoard> {
        let available = self.list_available(professional).await?;
        let active = self
            .list_claimed_by(
                professional.id,
                &[RequestStatus::Accepted, RequestStatus::InProgress],
            )
            .await?;
        let finished = self
            .list_claimed_by(
                professional.id,
                &[RequestStatus::Completed, RequestStatus::Closed],
            )
            .await?;
        let rejected = sqlx::query_as::<_, RequestView>(&format!(
            r#"{}
            JOIN rejected_requests rr ON rr.request_id = sr.id
            WHERE rr.professional_id = $1
            ORDER BY rr.created_at DESC
            "#,
            REQUEST_VIEW_SELECT
        ))
        .bind(professional.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProfessionalBoard {
            available,
            active,
            finished,
            rejected,
        })
    }

    async fn list_claimed_by(
        &self,
        professional_id: i64,
        statuses: &[RequestStatus],
    ) -> Result<Vec<RequestView>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows = sqlx::query_as::<_, RequestView>(&format!(
            r#"{}
            WHERE sr.professional_id = $1 AND sr.status = ANY($2)
            ORDER BY sr.updated_at DESC, sr.id DESC
            "#,
            REQUEST_VIEW_SELECT
        ))
        .bind(professional_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<RequestView>> {
        let rows = sqlx::query_as::<_, RequestView>(&format!(
            "{} WHERE sr.customer_id = $1 ORDER BY sr.created_at DESC, sr.id DESC",
            REQUEST_VIEW_SELECT
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<RequestView>> {
        let rows = sqlx::query_as::<_, RequestView>(&format!(
            "{} ORDER BY sr.created_at DESC, sr.id DESC",
            REQUEST_VIEW_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Claims a request. Status and professional are written by one statement
    /// that only matches while the request is still unassigned, so of several
    /// concurrent claims exactly one wins and the rest see `Conflict`.
    pub async fn accept(&self, professional: &User, request_id: i64) -> Result<ServiceRequest> {
        professional.authorize(Role::Professional)?;
        let category_id = professional_category(professional)?;

        let claimed = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests sr
            SET professional_id = $1, status = 'accepted', updated_at = NOW()
            FROM services s
            WHERE sr.id = $2
              AND s.id = sr.service_id
              AND s.category_id = $3
              AND sr.status = 'requested'
              AND sr.professional_id IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM rejected_requests rr
                  WHERE rr.request_id = sr.id AND rr.professional_id = $1
              )
            RETURNING {}
            "#,
            prefixed_request_columns("sr")
        ))
        .bind(professional.id)
        .bind(request_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        match claimed {
            Some(request) => {
                tracing::info!(request_id, professional_id = professional.id, "request accepted");
                Ok(request)
            }
            None => {
                let scope = self.scope(request_id, professional.id).await?;
                tracing::info!(request_id, professional_id = professional.id, status = %scope.status, "accept refused");
                Err(accept_refusal(&scope, category_id))
            }
        }
    }

    /// Records that this professional declines the request. Repeating a
    /// rejection is a no-op; the request row itself is never modified.
    pub async fn reject(&self, professional: &User, request_id: i64) -> Result<()> {
        professional.authorize(Role::Professional)?;
        let category_id = professional_category(professional)?;

        let recorded = sqlx::query_as::<_, RejectedRequest>(
            r#"
            INSERT INTO rejected_requests (request_id, professional_id)
            SELECT sr.id, $1
            FROM service_requests sr
            JOIN services s ON s.id = sr.service_id
            WHERE sr.id = $2
              AND s.category_id = $3
              AND sr.status = 'requested'
              AND sr.professional_id IS NULL
            ON CONFLICT (request_id, professional_id) DO NOTHING
            RETURNING request_id, professional_id, created_at
            "#,
        )
        .bind(professional.id)
        .bind(request_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(rejection) = recorded {
            tracing::info!(
                request_id = rejection.request_id,
                professional_id = rejection.professional_id,
                "request rejected"
            );
            return Ok(());
        }
        let scope = self.scope(request_id, professional.id).await?;
        reject_outcome(&scope, category_id)
    }

    /// Customer marks an accepted (or in-progress) job as done.
    pub async fn close(&self, customer: &User, request_id: i64) -> Result<ServiceRequest> {
        customer.authorize(Role::Customer)?;

        let closed = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET status = 'completed', completed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND customer_id = $2 AND status IN ('accepted', 'in_progress')
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .bind(customer.id)
        .fetch_optional(&self.pool)
        .await?;

        match closed {
            Some(request) => {
                tracing::info!(request_id, customer_id = customer.id, "request completed");
                Ok(request)
            }
            None => {
                let scope = self.scope(request_id, customer.id).await?;
                Err(close_refusal(&scope, customer.id))
            }
        }
    }

    /// Rating and review are written once, together with the move to `closed`.
    pub async fn submit_feedback(
        &self,
        customer: &User,
        request_id: i64,
        feedback: Feedback,
    ) -> Result<ServiceRequest> {
        customer.authorize(Role::Customer)?;
        let scope = self.scope(request_id, customer.id).await?;
        ensure_owner(&scope, customer.id)?;
        feedback.validate()?;

        let review = feedback.review.trim();
        let review = (!review.is_empty()).then_some(review);

        let finalized = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET rating = $1, review = $2, status = 'closed', updated_at = NOW()
            WHERE id = $3 AND customer_id = $4 AND status = 'completed'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(feedback.rating)
        .bind(review)
        .bind(request_id)
        .bind(customer.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            Error::InvalidTransition(
                "Feedback can only be given once, after the service is completed.".into(),
            )
        })?;

        tracing::info!(request_id, rating = feedback.rating, "feedback recorded, request closed");
        Ok(finalized)
    }

    /// Administrative escape hatch: sets any status regardless of the
    /// lifecycle rules. Moving back to `requested` releases the professional;
    /// moving to `completed`/`closed` stamps `completed_at` if it is unset.
    pub async fn admin_override(
        &self,
        admin: &User,
        request_id: i64,
        new_status: &str,
    ) -> Result<ServiceRequest> {
        admin.authorize(Role::Admin)?;
        let status: RequestStatus = new_status
            .parse()
            .map_err(|_| Error::Validation(format!("Unknown request status \"{}\".", new_status)))?;

        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            UPDATE service_requests
            SET status = $1::text,
                professional_id = CASE WHEN $1::text = 'requested' THEN NULL ELSE professional_id END,
                completed_at = CASE
                    WHEN $1::text IN ('completed', 'closed') THEN COALESCE(completed_at, NOW())
                    ELSE completed_at
                END,
                updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(status.as_str())
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service request not found".into()))?;

        tracing::warn!(request_id, admin_id = admin.id, status = %status, "request status overridden by admin");
        Ok(request)
    }

    async fn scope(&self, request_id: i64, actor_id: i64) -> Result<RequestScope> {
        sqlx::query_as::<_, RequestScope>(
            r#"
            SELECT sr.customer_id, sr.professional_id, sr.status, s.category_id,
                   EXISTS (
                       SELECT 1 FROM rejected_requests rr
                       WHERE rr.request_id = sr.id AND rr.professional_id = $2
                   ) AS rejected_by_actor
            FROM service_requests sr
            JOIN services s ON s.id = sr.service_id
            WHERE sr.id = $1
            "#,
        )
        .bind(request_id)
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service request not found".into()))
    }
}

fn prefixed_request_columns(alias: &str) -> String {
    REQUEST_COLUMNS
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn professional_category(user: &User) -> Result<i64> {
    user.professional()
        .map(|p| p.category_id)
        .ok_or(Error::AccessDenied {
            home: user.role().home(),
        })
}

fn ensure_owner(scope: &RequestScope, customer_id: i64) -> Result<()> {
    if scope.customer_id != customer_id {
        return Err(Error::Forbidden("Unauthorized action.".into()));
    }
    Ok(())
}

pub(crate) fn close_refusal(scope: &RequestScope, customer_id: i64) -> Error {
    if scope.customer_id != customer_id {
        Error::Forbidden("Unauthorized action.".into())
    } else if scope.status.can_close() {
        // closable now, so a concurrent write moved it in between
        Error::Conflict("This request changed while you were closing it. Please try again.".into())
    } else if scope.status.is_terminal() {
        Error::InvalidTransition("This request is already closed.".into())
    } else {
        Error::InvalidTransition(
            "Cannot close a request that is not in progress or accepted.".into(),
        )
    }
}

pub(crate) fn accept_refusal(scope: &RequestScope, category_id: i64) -> Error {
    if scope.category_id != category_id {
        Error::AccessDenied {
            home: Role::Professional.home(),
        }
    } else if scope.rejected_by_actor {
        Error::Conflict("You have already declined this request.".into())
    } else {
        Error::Conflict("This request is no longer available.".into())
    }
}

pub(crate) fn reject_outcome(scope: &RequestScope, category_id: i64) -> Result<()> {
    if scope.category_id != category_id {
        return Err(Error::AccessDenied {
            home: Role::Professional.home(),
        });
    }
    if scope.status.is_claimed() || scope.professional_id.is_some() {
        return Err(Error::Conflict(
            "This request has already been accepted by another professional.".into(),
        ));
    }
    if scope.rejected_by_actor {
        return Ok(());
    }
    Err(Error::Conflict("This request is no longer available.".into()))
}
