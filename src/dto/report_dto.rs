use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEarning {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessionalRating {
    pub name: String,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub total_customers: i64,
    pub total_professionals: i64,
    pub total_services: i64,
    pub total_requests: i64,
    pub status_counts: Vec<CountEntry>,
    pub category_counts: Vec<CountEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub total_services: i64,
    pub total_expenditure: Decimal,
    pub average_rating: f64,
    pub status_counts: Vec<CountEntry>,
    pub daily_requests: Vec<DailyCount>,
    pub professional_ratings: Vec<ProfessionalRating>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfessionalSummary {
    pub completed_jobs: i64,
    pub daily_earnings: Vec<DailyEarning>,
    pub rating_distribution: Vec<CountEntry>,
    pub service_counts: Vec<CountEntry>,
}
