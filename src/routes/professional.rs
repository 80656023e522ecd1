use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

use crate::dto::search_dto::ProfessionalSearchForm;
use crate::error::Result;
use crate::middleware::session::ProfessionalUser;
use crate::services::search_service::ProfessionalSearchKind;
use crate::utils::flash::{redirect_with_flash, FlashLevel};
use crate::AppState;

const DASHBOARD: &str = "/professional/dashboard";

pub async fn dashboard(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    jar: CookieJar,
) -> Result<Response> {
    let board = state.request_service.professional_board(&professional).await?;
    state.templates.page(
        jar,
        "professional/dashboard.html",
        Some(&professional),
        context! { board },
    )
}

pub async fn accept_request(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    Path(request_id): Path<i64>,
) -> Result<Response> {
    match state.request_service.accept(&professional, request_id).await {
        Ok(_) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Success,
            "Service request accepted.",
        )),
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

pub async fn reject_request(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    Path(request_id): Path<i64>,
) -> Result<Response> {
    match state.request_service.reject(&professional, request_id).await {
        Ok(()) => Ok(redirect_with_flash(
            DASHBOARD,
            FlashLevel::Info,
            "Service request rejected.",
        )),
        Err(e) => e.flash_or_fail(DASHBOARD),
    }
}

pub async fn search_page(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    jar: CookieJar,
) -> Result<Response> {
    state.templates.page(
        jar,
        "professional/search.html",
        Some(&professional),
        context! { search_criteria => "date", search_term => "", searched => false },
    )
}

pub async fn search(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    jar: CookieJar,
    Form(form): Form<ProfessionalSearchForm>,
) -> Result<Response> {
    let searched = !form.search_term.trim().is_empty();
    let results = if searched {
        let kind = match ProfessionalSearchKind::parse(&form.search_criteria) {
            Ok(kind) => kind,
            Err(e) => return e.flash_or_fail("/professional/search"),
        };
        state
            .search_service
            .professional_search(professional.id, kind, &form.search_term)
            .await?
    } else {
        Vec::new()
    };
    state.templates.page(
        jar,
        "professional/search.html",
        Some(&professional),
        context! {
            search_criteria => form.search_criteria,
            search_term => form.search_term,
            searched,
            results,
        },
    )
}

pub async fn summary(
    State(state): State<AppState>,
    ProfessionalUser(professional): ProfessionalUser,
    jar: CookieJar,
) -> Result<Response> {
    let summary = state.report_service.professional_summary(&professional).await?;
    state.templates.page(
        jar,
        "professional/summary.html",
        Some(&professional),
        context! { summary },
    )
}
