use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

use crate::dto::request_dto::{Feedback, FeedbackForm};
use crate::dto::search_dto::CustomerSearchQuery;
use crate::error::{Error, Result};
use crate::middleware::session::CustomerUser;
use crate::services::search_service::CustomerSearchKind;
use crate::utils::flash::{redirect_with_flash, FlashLevel};
use crate::AppState;

const DASHBOARD: &str = "/customer/dashboard";

pub async fn dashboard(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    jar: CookieJar,
) -> Result<Response> {
    let categories = state.catalog_service.list_categories().await?;
    let requests = state.request_service.list_for_customer(customer.id).await?;
    state.templates.page(
        jar,
        "customer/dashboard.html",
        Some(&customer),
        context! { categories, requests },
    )
}

pub async fn category(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Path(category_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response> {
    let category = state.catalog_service.get_category(category_id).await?;
    let services = state.catalog_service.services_in_category(category_id).await?;
    state.templates.page(
        jar,
        "customer/category.html",
        Some(&customer),
        context! { category, services },
    )
}

pub async fn book(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Path(service_id): Path<i64>,
) -> Result<Response> {
    state.request_service.create(&customer, service_id).await?;
    Ok(redirect_with_flash(
        DASHBOARD,
        FlashLevel::Success,
        "Service requested successfully.",
    ))
}

pub async fn close_request(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Path(request_id): Path<i64>,
) -> Result<Response> {
    match state.request_service.close(&customer, request_id).await {
        Ok(request) => Ok(redirect_with_flash(
            &format!("/customer/feedback/{}", request.id),
            FlashLevel::Success,
            "Service marked as completed. Please rate it.",
        )),
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

pub async fn feedback_page(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Path(request_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response> {
    let request = state.request_service.get_view(request_id).await?;
    if request.customer_id != customer.id {
        return Error::Forbidden("Unauthorized action.".into()).flash_or_fail(DASHBOARD);
    }
    if !request.status.accepts_feedback() {
        return Error::InvalidTransition(
            "Feedback can only be given once, after the service is completed.".into(),
        )
        .flash_or_fail(DASHBOARD);
    }
    state.templates.page(
        jar,
        "customer/feedback.html",
        Some(&customer),
        context! { request },
    )
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Path(request_id): Path<i64>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response> {
    let outcome = match parse_feedback(form) {
        Ok(feedback) => {
            state
                .request_service
                .submit_feedback(&customer, request_id, feedback)
                .await
        }
        Err(e) => Err(e),
    };
    match outcome {
        Ok(_) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            "Thank you for your feedback!",
        )),
        Err(e @ Error::Validation(_)) => {
            e.flash_or_fail(&format!("/customer/feedback/{}", request_id))
        }
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

fn parse_feedback(form: FeedbackForm) -> Result<Feedback> {
    let rating = form
        .rating
        .trim()
        .parse()
        .map_err(|_| Error::Validation("Rating must be between 1 and 5.".into()))?;
    Ok(Feedback {
        rating,
        review: form.review,
    })
}

pub async fn search(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    Query(params): Query<CustomerSearchQuery>,
    jar: CookieJar,
) -> Result<Response> {
    let searched = !params.search_query.trim().is_empty();
    let results = if searched {
        let kind = match CustomerSearchKind::parse(&params.search_type) {
            Ok(kind) => kind,
            Err(e) => return e.flash_or_fail("/customer/search"),
        };
        state
            .search_service
            .customer_search(kind, &params.search_query)
            .await?
    } else {
        Vec::new()
    };
    state.templates.page(
        jar,
        "customer/search.html",
        Some(&customer),
        context! {
            search_type => params.search_type,
            search_query => params.search_query,
            searched,
            results,
        },
    )
}

pub async fn summary(
    State(state): State<AppState>,
    CustomerUser(customer): CustomerUser,
    jar: CookieJar,
) -> Result<Response> {
    let summary = state.report_service.customer_summary(&customer).await?;
    state.templates.page(
        jar,
        "customer/summary.html",
        Some(&customer),
        context! { summary },
    )
}
