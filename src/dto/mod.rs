pub mod auth_dto;
pub mod catalog_dto;
pub mod report_dto;
pub mod request_dto;
pub mod search_dto;
