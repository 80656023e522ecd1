use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use std::collections::HashMap;

use crate::dto::catalog_dto::{CategoryForm, ServiceForm};
use crate::dto::request_dto::StatusOverrideForm;
use crate::dto::search_dto::AdminSearchQuery;
use crate::error::{Error, Result};
use crate::middleware::session::AdminUser;
use crate::models::service_request::RequestStatus;
use crate::models::user::ApprovalStatus;
use crate::services::catalog_service::ServiceInput;
use crate::services::search_service::AdminSearchKind;
use crate::utils::flash::{redirect_with_flash, FlashLevel};
use crate::utils::validation::{parse_id, parse_price, validate};
use crate::AppState;

const DASHBOARD: &str = "/admin/dashboard";

pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
) -> Result<Response> {
    let services = state.catalog_service.list_services().await?;
    let professionals = state.user_service.list_professionals(None).await?;
    let requests = state.request_service.list_all().await?;
    let category_names: HashMap<String, String> = state
        .catalog_service
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.id.to_string(), c.name))
        .collect();
    let statuses: Vec<&str> = RequestStatus::ALL.iter().map(|s| s.as_str()).collect();

    state.templates.page(
        jar,
        "admin/dashboard.html",
        Some(&admin),
        context! { services, professionals, requests, category_names, statuses },
    )
}

/// POST on the dashboard: force a request into any status.
pub async fn override_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<StatusOverrideForm>,
) -> Result<Response> {
    let outcome = match parse_id(&form.service_request_id, "service request") {
        Ok(id) => {
            state
                .request_service
                .admin_override(&admin, id, form.status.trim())
                .await
        }
        Err(e) => Err(e),
    };
    match outcome {
        Ok(request) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            &format!("Request #{} is now {}.", request.id, request.status),
        )),
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

pub async fn approve_professional(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Response> {
    set_approval(&state, user_id, ApprovalStatus::Approved).await
}

pub async fn reject_professional(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Response> {
    set_approval(&state, user_id, ApprovalStatus::Rejected).await
}

async fn set_approval(state: &AppState, user_id: i64, status: ApprovalStatus) -> Result<Response> {
    match state.user_service.set_approval(user_id, status).await {
        Ok(user) => {
            let verb = match status {
                ApprovalStatus::Approved => "approved",
                ApprovalStatus::Rejected => "rejected",
                ApprovalStatus::Pending => "reset to pending",
            };
            Ok(redirect_with_flash(
                DASHBOARD,
                FlashLevel::Success,
                &format!("{} has been {}.", user.full_name, verb),
            ))
        }
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

pub async fn create_service_page(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
) -> Result<Response> {
    let categories = state.catalog_service.list_categories().await?;
    state.templates.page(
        jar,
        "admin/service_form.html",
        Some(&admin),
        context! { categories },
    )
}

pub async fn create_service(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let outcome = match service_input(&form) {
        Ok(input) => state.catalog_service.create_service(input).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(service) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            &format!("Service \"{}\" created.", service.name),
        )),
        Err(e) => e.flash_or_fail("/admin/create-service"),
    }
}

pub async fn edit_service_page(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(service_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response> {
    let service = state.catalog_service.get_service(service_id).await?;
    let categories = state.catalog_service.list_categories().await?;
    state.templates.page(
        jar,
        "admin/service_form.html",
        Some(&admin),
        context! { service, categories },
    )
}

pub async fn edit_service(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(service_id): Path<i64>,
    Form(form): Form<ServiceForm>,
) -> Result<Response> {
    let outcome = match service_input(&form) {
        Ok(input) => state.catalog_service.update_service(service_id, input).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(service) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            &format!("Service \"{}\" updated.", service.name),
        )),
        Err(e) => e.flash_or_fail(&format!("/admin/edit-service/{}", service_id)),
    }
}

pub async fn delete_service(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(service_id): Path<i64>,
) -> Result<Response> {
    let (service, removed) = state.catalog_service.delete_service(service_id).await?;
    Ok(redirect_with_flash(
        DASHBOARD,
        FlashLevel::Success,
        &format!(
            "Service \"{}\" deleted along with {} request(s).",
            service.name, removed
        ),
    ))
}

pub async fn create_category_page(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
) -> Result<Response> {
    let categories = state.catalog_service.list_categories().await?;
    state.templates.page(
        jar,
        "admin/category_form.html",
        Some(&admin),
        context! { categories },
    )
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let outcome = match validate(&form) {
        Ok(()) => state.catalog_service.create_category(&form.name).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(category) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            &format!("Category \"{}\" created.", category.name),
        )),
        Err(e) => e.flash_or_fail("/admin/create-category"),
    }
}

/// Streams a professional's verification document back to the admin.
pub async fn document(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Response> {
    let user = state
        .user_service
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    let path = user
        .professional()
        .and_then(|p| p.document_path.clone())
        .ok_or_else(|| Error::NotFound("This user has no verification document.".into()))?;

    let stored = state.document_service.load(&path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, stored.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", stored.file_name),
            ),
        ],
        stored.data,
    )
        .into_response())
}

pub async fn search(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(params): Query<AdminSearchQuery>,
    jar: CookieJar,
) -> Result<Response> {
    let results = if params.query.trim().is_empty() {
        None
    } else {
        let kind = match AdminSearchKind::parse(&params.search_type) {
            Ok(kind) => kind,
            Err(e) => return e.flash_or_fail("/admin/search"),
        };
        state.search_service.admin_search(kind, &params.query).await?
    };
    state.templates.page(
        jar,
        "admin/search.html",
        Some(&admin),
        context! {
            query => params.query,
            search_type => params.search_type,
            results,
        },
    )
}

pub async fn summary(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
) -> Result<Response> {
    let summary = state.report_service.admin_summary().await?;
    state
        .templates
        .page(jar, "admin/summary.html", Some(&admin), context! { summary })
}

fn service_input(form: &ServiceForm) -> Result<ServiceInput> {
    validate(form)?;
    Ok(ServiceInput {
        name: form.service_name.clone(),
        description: form.description.clone(),
        base_price: parse_price(&form.base_price)?,
        category_id: parse_id(&form.category_id, "service category")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn form(price: &str, category: &str) -> ServiceForm {
        ServiceForm {
            service_name: "Deep cleaning".into(),
            description: "Whole flat".into(),
            base_price: price.into(),
            category_id: category.into(),
        }
    }

    #[test]
    fn service_form_is_parsed() {
        let input = service_input(&form("120.5", "3")).unwrap();
        assert_eq!(input.base_price, Decimal::new(12050, 2));
        assert_eq!(input.category_id, 3);
    }

    #[test]
    fn bad_service_form_is_a_validation_error() {
        assert!(matches!(service_input(&form("-3", "3")), Err(Error::Validation(_))));
        assert!(matches!(service_input(&form("10", "")), Err(Error::Validation(_))));
        let mut blank = form("10", "1");
        blank.service_name.clear();
        assert!(matches!(service_input(&blank), Err(Error::Validation(_))));
    }
}
