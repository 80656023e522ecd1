use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Professional,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Professional => "professional",
            Role::Admin => "admin",
        }
    }

    /// Landing page for a signed-in user of this role.
    pub fn home(&self) -> &'static str {
        match self {
            Role::Customer => "/customer/dashboard",
            Role::Professional => "/professional/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "professional" => Ok(Role::Professional),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Why a professional in this state may not sign in, if anything.
    pub fn login_denial(&self) -> Option<&'static str> {
        match self {
            ApprovalStatus::Approved => None,
            ApprovalStatus::Pending => Some("Your account is waiting for admin approval."),
            ApprovalStatus::Rejected => Some("Your profile was rejected by the admin."),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "approval status",
                value: other.to_string(),
            }),
        }
    }
}

/// Raw `users` row. Professional columns are NULL for every other role.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub address: String,
    pub postal_code: String,
    pub category_id: Option<i64>,
    pub experience_years: Option<i32>,
    pub document_path: Option<String>,
    pub approval_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionalProfile {
    pub category_id: i64,
    pub experience_years: i32,
    pub document_path: Option<String>,
    pub approval: ApprovalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserKind {
    Customer,
    Professional(ProfessionalProfile),
    Admin,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub address: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub kind: UserKind,
}

impl User {
    pub fn role(&self) -> Role {
        match self.kind {
            UserKind::Customer => Role::Customer,
            UserKind::Professional(_) => Role::Professional,
            UserKind::Admin => Role::Admin,
        }
    }

    pub fn professional(&self) -> Option<&ProfessionalProfile> {
        match &self.kind {
            UserKind::Professional(profile) => Some(profile),
            _ => None,
        }
    }

    /// The single authorization rule: the role must match exactly, and a
    /// professional must additionally be approved.
    pub fn authorize(&self, required: Role) -> Result<(), Error> {
        if self.role() != required {
            return Err(Error::AccessDenied {
                home: self.role().home(),
            });
        }
        if let Some(reason) = self.professional().and_then(|p| p.approval.login_denial()) {
            return Err(Error::Unauthorized(reason.to_string()));
        }
        Ok(())
    }
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |what: String| Error::Internal(format!("user {}: {}", row.id, what));
        let role: Role = row.role.parse().map_err(|e: UnknownVariant| invalid(e.to_string()))?;

        let kind = match role {
            Role::Professional => {
                let (Some(category_id), Some(experience_years), Some(status)) = (
                    row.category_id,
                    row.experience_years,
                    row.approval_status.as_deref(),
                ) else {
                    return Err(invalid("professional without category, experience or status".into()));
                };
                UserKind::Professional(ProfessionalProfile {
                    category_id,
                    experience_years,
                    document_path: row.document_path.clone(),
                    approval: status.parse().map_err(|e: UnknownVariant| invalid(e.to_string()))?,
                })
            }
            other => {
                if row.category_id.is_some() || row.approval_status.is_some() {
                    return Err(invalid("non-professional with professional fields".into()));
                }
                if other == Role::Admin {
                    UserKind::Admin
                } else {
                    UserKind::Customer
                }
            }
        };

        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            address: row.address,
            postal_code: row.postal_code,
            created_at: row.created_at,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: 7,
            email: "someone@example.com".into(),
            password_hash: "hash".into(),
            role: role.into(),
            full_name: "Some One".into(),
            address: "1 Main St".into(),
            postal_code: "560001".into(),
            category_id: None,
            experience_years: None,
            document_path: None,
            approval_status: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn customer_row_becomes_customer() {
        let user = User::try_from(row("customer")).unwrap();
        assert_eq!(user.role(), Role::Customer);
        assert!(user.professional().is_none());
    }

    #[test]
    fn professional_row_carries_profile() {
        let mut r = row("professional");
        r.category_id = Some(3);
        r.experience_years = Some(5);
        r.approval_status = Some("pending".into());
        let user = User::try_from(r).unwrap();
        let profile = user.professional().unwrap();
        assert_eq!(profile.category_id, 3);
        assert_eq!(profile.approval, ApprovalStatus::Pending);
    }

    #[test]
    fn professional_without_category_is_rejected() {
        let mut r = row("professional");
        r.approval_status = Some("approved".into());
        assert!(User::try_from(r).is_err());
    }

    #[test]
    fn customer_with_professional_fields_is_rejected() {
        let mut r = row("customer");
        r.category_id = Some(1);
        assert!(User::try_from(r).is_err());
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(User::try_from(row("superuser")).is_err());
    }

    #[test]
    fn login_denial_messages_differ_per_state() {
        assert_eq!(ApprovalStatus::Approved.login_denial(), None);
        assert_ne!(
            ApprovalStatus::Pending.login_denial(),
            ApprovalStatus::Rejected.login_denial()
        );
    }

    #[test]
    fn authorize_requires_exact_role() {
        let customer = User::try_from(row("customer")).unwrap();
        assert!(customer.authorize(Role::Customer).is_ok());
        assert!(matches!(
            customer.authorize(Role::Admin),
            Err(Error::AccessDenied { home: "/customer/dashboard" })
        ));
    }

    #[test]
    fn authorize_rejects_unapproved_professionals() {
        let mut r = row("professional");
        r.category_id = Some(2);
        r.experience_years = Some(1);
        r.approval_status = Some("pending".into());
        let pending = User::try_from(r.clone()).unwrap();
        assert!(matches!(
            pending.authorize(Role::Professional),
            Err(Error::Unauthorized(_))
        ));

        r.approval_status = Some("approved".into());
        let approved = User::try_from(r).unwrap();
        assert!(approved.authorize(Role::Professional).is_ok());
    }

    #[test]
    fn every_role_has_its_own_home() {
        assert_eq!(Role::Admin.home(), "/admin/dashboard");
        assert_eq!("professional".parse::<Role>().unwrap().home(), "/professional/dashboard");
    }
}
