use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::category::ServiceCategory;
use crate::models::service::{Service, ServiceListing};
use crate::services::is_unique_violation;
use crate::utils::validation::check_price;

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

/// Validated input for creating or editing a service.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub category_id: i64,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> Result<Vec<ServiceCategory>> {
        let categories = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name FROM service_categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get_category(&self, id: i64) -> Result<ServiceCategory> {
        sqlx::query_as::<_, ServiceCategory>("SELECT id, name FROM service_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Service category not found".into()))
    }

    pub async fn create_category(&self, name: &str) -> Result<ServiceCategory> {
        let category = sqlx::query_as::<_, ServiceCategory>(
            "INSERT INTO service_categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Validation(format!("A category named \"{}\" already exists.", name.trim()))
            } else {
                e.into()
            }
        })?;
        tracing::info!(category_id = category.id, "service category created");
        Ok(category)
    }

    pub async fn get_service(&self, id: i64) -> Result<Service> {
        sqlx::query_as::<_, Service>(
            "SELECT id, name, description, base_price, category_id FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service not found".into()))
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceListing>> {
        let services = sqlx::query_as::<_, ServiceListing>(
            r#"
            SELECT s.id, s.name, s.description, s.base_price, s.category_id,
                   c.name AS category_name,
                   (SELECT COUNT(*) FROM service_requests sr WHERE sr.service_id = s.id) AS request_count
            FROM services s
            JOIN service_categories c ON c.id = s.category_id
            ORDER BY c.name ASC, s.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    pub async fn services_in_category(&self, category_id: i64) -> Result<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, base_price, category_id
            FROM services WHERE category_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    pub async fn create_service(&self, input: ServiceInput) -> Result<Service> {
        check_price(input.base_price)?;
        match self.get_category(input.category_id).await {
            Err(Error::NotFound(_)) => {
                return Err(Error::Validation(
                    "Please choose a valid service category.".into(),
                ))
            }
            Err(e) => return Err(e),
            Ok(_) => {}
        }

        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, description, base_price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, base_price, category_id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(input.base_price)
        .bind(input.category_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(service_id = service.id, category_id = service.category_id, "service created");
        Ok(service)
    }

    /// Updates name, description and price. A service never moves between
    /// categories because open requests are scoped by category.
    pub async fn update_service(&self, id: i64, input: ServiceInput) -> Result<Service> {
        check_price(input.base_price)?;
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $1, description = $2, base_price = $3
            WHERE id = $4
            RETURNING id, name, description, base_price, category_id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(input.base_price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Service not found".into()))?;

        tracing::info!(service_id = service.id, "service updated");
        Ok(service)
    }

    /// Deletes a service together with every request booked against it (and
    /// their rejection records). Returns the deleted service and how many
    /// requests went with it.
    pub async fn delete_service(&self, id: i64) -> Result<(Service, i64)> {
        let mut tx = self.pool.begin().await?;

        // the row lock holds off new bookings until the service is gone
        sqlx::query_scalar::<_, i64>("SELECT id FROM services WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Service not found".into()))?;

        let removed_requests = sqlx::query("DELETE FROM service_requests WHERE service_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected() as i64;

        let service = sqlx::query_as::<_, Service>(
            "DELETE FROM services WHERE id = $1 RETURNING id, name, description, base_price, category_id",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::warn!(service_id = id, removed_requests, "service deleted with its requests");
        Ok((service, removed_requests))
    }
}
