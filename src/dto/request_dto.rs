use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub rating: String,
    pub review: String,
}

#[derive(Debug, Clone, Validate)]
pub struct Feedback {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    #[validate(length(max = 1000, message = "Review must be at most 1000 characters."))]
    pub review: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusOverrideForm {
    pub service_request_id: String,
    pub status: String,
}
