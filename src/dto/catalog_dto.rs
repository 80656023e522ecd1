use serde::Deserialize;
use validator::Validate;

/// Create/edit service form. Numbers arrive as text and are parsed by the
/// handler so a bad value becomes a flash message rather than a rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ServiceForm {
    #[validate(length(min = 1, max = 100, message = "Service name is required."))]
    pub service_name: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    pub base_price: String,
    pub category_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 100, message = "Category name is required."))]
    pub name: String,
}
