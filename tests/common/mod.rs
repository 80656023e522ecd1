#![allow(dead_code)]

use std::env;

use marketplace_backend::config::Config;
use marketplace_backend::dto::auth_dto::{RegisterCustomerForm, RegisterProfessionalForm};
use marketplace_backend::models::category::ServiceCategory;
use marketplace_backend::models::service::Service;
use marketplace_backend::models::user::{ApprovalStatus, User};
use marketplace_backend::services::catalog_service::ServiceInput;
use marketplace_backend::AppState;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub const PASSWORD: &str = "secret-pass";

/// Connects to `DATABASE_URL` and migrates. Returns `None` (and the test
/// should return early) when no database is configured.
pub async fn setup() -> Option<AppState> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let config = Config {
        server_address: "127.0.0.1:0".into(),
        database_url,
        database_max_connections: 5,
        session_secret: "integration-test-secret".into(),
        session_ttl_minutes: 30,
        upload_dir: env::temp_dir()
            .join(format!("marketplace-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        max_upload_bytes: 1024 * 1024,
        admin_email: None,
        admin_password: None,
    };
    Some(AppState::with_config(pool, &config).expect("app state"))
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub async fn customer(state: &AppState) -> User {
    let form = RegisterCustomerForm {
        email: format!("{}@example.com", unique("customer")),
        password: PASSWORD.into(),
        fullname: "Casey Customer".into(),
        address: "12 Elm Road".into(),
        pin_code: "560034".into(),
    };
    state
        .user_service
        .register_customer(&form)
        .await
        .expect("register customer")
}

pub async fn professional(state: &AppState, category_id: i64, approval: ApprovalStatus) -> User {
    let form = RegisterProfessionalForm {
        email: format!("{}@example.com", unique("pro")),
        password: PASSWORD.into(),
        fullname: unique("Pat Pro"),
        address: "4 Workshop Lane".into(),
        pin_code: "560001".into(),
        service_category: category_id,
        experience: 6,
    };
    let user = state
        .user_service
        .register_professional(&form, None)
        .await
        .expect("register professional");
    if approval == ApprovalStatus::Pending {
        return user;
    }
    state
        .user_service
        .set_approval(user.id, approval)
        .await
        .expect("set approval")
}

/// A fresh category with one service, so open-request lists are not shared
/// between tests.
pub async fn category_with_service(state: &AppState, price: i64) -> (ServiceCategory, Service) {
    let category = state
        .catalog_service
        .create_category(&unique("Category"))
        .await
        .expect("create category");
    let service = state
        .catalog_service
        .create_service(ServiceInput {
            name: unique("Service"),
            description: "Test service".into(),
            base_price: Decimal::new(price, 0),
            category_id: category.id,
        })
        .await
        .expect("create service");
    (category, service)
}

pub async fn admin(state: &AppState) -> User {
    let email = format!("{}@example.com", unique("admin"));
    state
        .user_service
        .ensure_admin(&email, PASSWORD)
        .await
        .expect("create admin");
    state
        .user_service
        .find_by_email(&email)
        .await
        .expect("load admin")
        .expect("admin exists")
}
