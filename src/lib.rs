pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;
pub mod views;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::session::SessionSettings;
use crate::services::{
    catalog_service::CatalogService, document_service::DocumentService,
    report_service::ReportService, request_service::RequestService,
    search_service::SearchService, user_service::UserService,
};
use crate::views::Templates;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub templates: Templates,
    pub session: SessionSettings,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub request_service: RequestService,
    pub report_service: ReportService,
    pub search_service: SearchService,
    pub document_service: DocumentService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        Self::with_config(pool, crate::config::get_config())
    }

    pub fn with_config(pool: PgPool, config: &Config) -> Result<Self> {
        let templates = Templates::new()?;
        let session = SessionSettings {
            secret: config.session_secret.clone(),
            ttl_minutes: config.session_ttl_minutes,
        };

        let user_service = UserService::new(pool.clone());
        let catalog_service = CatalogService::new(pool.clone());
        let request_service = RequestService::new(pool.clone());
        let report_service = ReportService::new(pool.clone());
        let search_service = SearchService::new(pool.clone());
        let document_service =
            DocumentService::new(config.upload_dir.clone(), config.max_upload_bytes);

        Ok(Self {
            pool,
            templates,
            session,
            user_service,
            catalog_service,
            request_service,
            report_service,
            search_service,
            document_service,
        })
    }
}
