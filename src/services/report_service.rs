use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::dto::report_dto::{
    AdminSummary, CountEntry, CustomerSummary, DailyCount, DailyEarning, ProfessionalRating,
    ProfessionalSummary,
};
use crate::error::{Error, Result};
use crate::models::service_request::RequestStatus;
use crate::models::user::User;
use crate::utils::time::fill_daily_series;

/// Length of the daily charts, today included.
const SERIES_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admin_summary(&self) -> Result<AdminSummary> {
        let (total_customers, total_professionals): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE role = 'customer'),
                   COUNT(*) FILTER (WHERE role = 'professional')
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_services: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        let total_requests: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_requests")
            .fetch_one(&self.pool)
            .await?;

        let by_status: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM service_requests GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_category: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT c.name, COUNT(sr.id)
            FROM service_categories c
            LEFT JOIN services s ON s.category_id = c.id
            LEFT JOIN service_requests sr ON sr.service_id = s.id
            GROUP BY c.id, c.name
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminSummary {
            total_customers,
            total_professionals,
            total_services,
            total_requests,
            status_counts: status_distribution(&by_status),
            category_counts: counts(by_category),
        })
    }

    pub async fn customer_summary(&self, customer: &User) -> Result<CustomerSummary> {
        let engaged = engaged_statuses();

        let (total_services, total_expenditure): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(s.base_price), 0)
            FROM service_requests sr
            JOIN services s ON s.id = sr.service_id
            WHERE sr.customer_id = $1 AND sr.status = ANY($2)
            "#,
        )
        .bind(customer.id)
        .bind(engaged)
        .fetch_one(&self.pool)
        .await?;

        let average_rating: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(rating)::float8, 0)
            FROM service_requests
            WHERE customer_id = $1 AND rating IS NOT NULL
            "#,
        )
        .bind(customer.id)
        .fetch_one(&self.pool)
        .await?;

        let by_status: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM service_requests WHERE customer_id = $1 GROUP BY status",
        )
        .bind(customer.id)
        .fetch_all(&self.pool)
        .await?;

        let (start, end) = series_window();
        let per_day: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM service_requests
            WHERE customer_id = $1 AND (created_at AT TIME ZONE 'UTC')::date >= $2
            GROUP BY day
            "#,
        )
        .bind(customer.id)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        let professional_ratings: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT p.full_name, AVG(sr.rating)::float8
            FROM service_requests sr
            JOIN users p ON p.id = sr.professional_id
            WHERE sr.customer_id = $1 AND sr.rating IS NOT NULL
            GROUP BY p.id, p.full_name
            ORDER BY p.full_name ASC
            "#,
        )
        .bind(customer.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CustomerSummary {
            total_services,
            total_expenditure,
            average_rating: round_rating(average_rating),
            status_counts: status_distribution(&by_status),
            daily_requests: fill_daily_series(start, end, &per_day)
                .into_iter()
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
            professional_ratings: professional_ratings
                .into_iter()
                .map(|(name, average)| ProfessionalRating {
                    name,
                    average: round_rating(average),
                })
                .collect(),
        })
    }

    pub async fn professional_summary(&self, professional: &User) -> Result<ProfessionalSummary> {
        let category_id = professional
            .professional()
            .map(|p| p.category_id)
            .ok_or_else(|| Error::Internal(format!("user {} is not a professional", professional.id)))?;

        let completed_jobs: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM service_requests
            WHERE professional_id = $1 AND status IN ('completed', 'closed')
            "#,
        )
        .bind(professional.id)
        .fetch_one(&self.pool)
        .await?;

        // all-time, only days that earned something; an override back to an
        // open status keeps completed_at but no longer counts
        let earnings: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
            r#"
            SELECT (sr.completed_at AT TIME ZONE 'UTC')::date AS day, SUM(s.base_price)
            FROM service_requests sr
            JOIN services s ON s.id = sr.service_id
            WHERE sr.professional_id = $1
              AND sr.status IN ('completed', 'closed')
              AND sr.completed_at IS NOT NULL
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(professional.id)
        .fetch_all(&self.pool)
        .await?;

        let ratings: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT rating, COUNT(*) FROM service_requests
            WHERE professional_id = $1 AND rating IS NOT NULL
            GROUP BY rating
            "#,
        )
        .bind(professional.id)
        .fetch_all(&self.pool)
        .await?;

        let per_service: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT s.name, COUNT(sr.id)
            FROM services s
            LEFT JOIN service_requests sr ON sr.service_id = s.id
            WHERE s.category_id = $1
            GROUP BY s.id, s.name
            ORDER BY s.name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProfessionalSummary {
            completed_jobs,
            daily_earnings: earnings
                .into_iter()
                .map(|(date, amount)| DailyEarning { date, amount })
                .collect(),
            rating_distribution: rating_distribution(&ratings),
            service_counts: counts(per_service),
        })
    }
}

fn engaged_statuses() -> Vec<String> {
    RequestStatus::engaged()
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

fn series_window() -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    (end - Duration::days(SERIES_DAYS - 1), end)
}

fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn counts(rows: Vec<(String, i64)>) -> Vec<CountEntry> {
    rows.into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect()
}

/// One entry per lifecycle state, in lifecycle order, including empty ones.
fn status_distribution(rows: &[(String, i64)]) -> Vec<CountEntry> {
    RequestStatus::ALL
        .iter()
        .map(|status| CountEntry {
            label: status.as_str().to_string(),
            count: rows
                .iter()
                .find(|(s, _)| s == status.as_str())
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}

fn rating_distribution(rows: &[(i32, i64)]) -> Vec<CountEntry> {
    (1..=5)
        .map(|stars| CountEntry {
            label: stars.to_string(),
            count: rows
                .iter()
                .find(|(r, _)| *r == stars)
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}
