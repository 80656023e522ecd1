pub mod admin;
pub mod auth;
pub mod customer;
pub mod health;
pub mod professional;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/", get(auth::login_page))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/register/customer",
            get(auth::register_customer_page).post(auth::register_customer),
        )
        .route(
            "/register/professional",
            get(auth::register_professional_page).post(auth::register_professional),
        );

    let admin = Router::new()
        .route(
            "/admin/dashboard",
            get(admin::dashboard).post(admin::override_status),
        )
        .route("/admin/search", get(admin::search))
        .route("/admin/summary", get(admin::summary))
        .route("/admin/approve/:id", post(admin::approve_professional))
        .route("/admin/reject/:id", post(admin::reject_professional))
        .route(
            "/admin/create-service",
            get(admin::create_service_page).post(admin::create_service),
        )
        .route(
            "/admin/edit-service/:id",
            get(admin::edit_service_page).post(admin::edit_service),
        )
        .route("/admin/delete-service/:id", post(admin::delete_service))
        .route(
            "/admin/create-category",
            get(admin::create_category_page).post(admin::create_category),
        )
        .route("/admin/document/:id", get(admin::document));

    let customer = Router::new()
        .route("/customer/dashboard", get(customer::dashboard))
        .route("/customer/category/:id", get(customer::category))
        .route("/customer/search", get(customer::search))
        .route("/customer/summary", get(customer::summary))
        .route("/customer/book/:service_id", post(customer::book))
        .route("/customer/close_request/:id", post(customer::close_request))
        .route(
            "/customer/feedback/:id",
            get(customer::feedback_page).post(customer::submit_feedback),
        );

    let professional = Router::new()
        .route("/professional/dashboard", get(professional::dashboard))
        .route("/professional/summary", get(professional::summary))
        .route(
            "/professional/search",
            get(professional::search_page).post(professional::search),
        )
        .route(
            "/professional/accept_request/:id",
            post(professional::accept_request),
        )
        .route(
            "/professional/reject_request/:id",
            post(professional::reject_request),
        );

    public
        .merge(admin)
        .merge(customer)
        .merge(professional)
        .with_state(state)
}
