use sqlx::PgPool;

use crate::dto::auth_dto::{RegisterCustomerForm, RegisterProfessionalForm};
use crate::error::{Error, Result};
use crate::models::user::{ApprovalStatus, Role, User, UserRow};
use crate::services::is_unique_violation;
use crate::utils::crypto::{hash_password, verify_password};

const USER_COLUMNS: &str = "id, email, password_hash, role, full_name, address, postal_code, \
     category_id, experience_years, document_path, approval_status, created_at";

const DUPLICATE_EMAIL: &str = "An account with this email already exists.";
const BAD_CREDENTIALS: &str = "Login unsuccessful. Please check email and password.";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    pub async fn register_customer(&self, form: &RegisterCustomerForm) -> Result<User> {
        let email = normalize_email(&form.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::Validation(DUPLICATE_EMAIL.into()));
        }
        let password_hash = hash_password(&form.password)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, role, full_name, address, postal_code)
            VALUES ($1, $2, 'customer', $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(password_hash)
        .bind(form.fullname.trim())
        .bind(form.address.trim())
        .bind(form.pin_code.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(map_duplicate_email)?;

        tracing::info!(user_id = row.id, "customer registered");
        User::try_from(row)
    }

    /// New professionals start out `pending` until an admin reviews them.
    pub async fn register_professional(
        &self,
        form: &RegisterProfessionalForm,
        document_path: Option<String>,
    ) -> Result<User> {
        let email = normalize_email(&form.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::Validation(DUPLICATE_EMAIL.into()));
        }
        let category_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM service_categories WHERE id = $1)")
                .bind(form.service_category)
                .fetch_one(&self.pool)
                .await?;
        if !category_exists {
            return Err(Error::Validation("Please choose a valid service category.".into()));
        }
        let password_hash = hash_password(&form.password)?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                email, password_hash, role, full_name, address, postal_code,
                category_id, experience_years, document_path, approval_status
            )
            VALUES ($1, $2, 'professional', $3, $4, $5, $6, $7, $8, 'pending')
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(password_hash)
        .bind(form.fullname.trim())
        .bind(form.address.trim())
        .bind(form.pin_code.trim())
        .bind(form.service_category)
        .bind(form.experience)
        .bind(document_path)
        .fetch_one(&self.pool)
        .await
        .map_err(map_duplicate_email)?;

        tracing::info!(user_id = row.id, category_id = form.service_category, "professional registered, awaiting approval");
        User::try_from(row)
    }

    /// Checks credentials and the approval gate. Every failure is an
    /// `Unauthorized` carrying the message shown on the login page.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.find_by_email(email).await? else {
            return Err(Error::Unauthorized(BAD_CREDENTIALS.into()));
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized(BAD_CREDENTIALS.into()));
        }
        if let Some(profile) = user.professional() {
            if let Some(reason) = profile.approval.login_denial() {
                tracing::info!(user_id = user.id, status = profile.approval.as_str(), "login refused for unapproved professional");
                return Err(Error::Unauthorized(reason.into()));
            }
        }
        Ok(user)
    }

    pub async fn set_approval(&self, user_id: i64, status: ApprovalStatus) -> Result<User> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))?;
        if user.role() != Role::Professional {
            return Err(Error::Validation(format!(
                "{} is not a service professional.",
                user.full_name
            )));
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET approval_status = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(status.as_str())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id, status = status.as_str(), "professional approval changed");
        User::try_from(row)
    }

    pub async fn list_professionals(&self, only: Option<ApprovalStatus>) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {} FROM users
            WHERE role = 'professional' AND ($1::text IS NULL OR approval_status = $1)
            ORDER BY created_at ASC, id ASC
            "#,
            USER_COLUMNS
        ))
        .bind(only.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    /// Creates the configured administrator if no account uses that email yet.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool> {
        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        let password_hash = hash_password(password)?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, full_name)
            VALUES ($1, $2, 'admin', 'Admin User')
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(inserted.rows_affected() == 1)
    }
}

fn map_duplicate_email(err: sqlx::Error) -> Error {
    if is_unique_violation(&err) {
        Error::Validation(DUPLICATE_EMAIL.into())
    } else {
        err.into()
    }
}
