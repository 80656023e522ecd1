use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterCustomerForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub fullname: String,
    #[validate(length(min = 1, message = "Address is required."))]
    pub address: String,
    #[validate(length(min = 3, max = 10, message = "Postal code must be 3 to 10 characters."))]
    pub pin_code: String,
}

/// Text part of the professional sign-up form. The document arrives as a
/// separate multipart field.
#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterProfessionalForm {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub fullname: String,
    #[validate(length(min = 1, message = "Address is required."))]
    pub address: String,
    #[validate(length(min = 3, max = 10, message = "Postal code must be 3 to 10 characters."))]
    pub pin_code: String,
    pub service_category: i64,
    #[validate(range(min = 0, max = 80, message = "Experience must be between 0 and 80 years."))]
    pub experience: i32,
}
