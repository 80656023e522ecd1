mod common;

use marketplace_backend::dto::request_dto::Feedback;
use marketplace_backend::error::Error;
use marketplace_backend::models::user::ApprovalStatus;
use marketplace_backend::services::catalog_service::ServiceInput;
use rust_decimal::Decimal;

#[tokio::test]
async fn deleting_a_service_takes_its_requests_along() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 25).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;

    let first = state
        .request_service
        .create(&customer, service.id)
        .await
        .unwrap();
    let second = state
        .request_service
        .create(&customer, service.id)
        .await
        .unwrap();
    state.request_service.reject(&p, first.id).await.unwrap();

    let (deleted, removed) = state
        .catalog_service
        .delete_service(service.id)
        .await
        .unwrap();
    assert_eq!(deleted.id, service.id);
    assert_eq!(removed, 2);

    for id in [first.id, second.id] {
        assert!(matches!(
            state.request_service.get(id).await,
            Err(Error::NotFound(_))
        ));
    }
    let rejections: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM rejected_requests WHERE request_id = $1")
            .bind(first.id)
            .fetch_one(&state.pool)
            .await
            .unwrap();
    assert_eq!(rejections, 0);

    assert!(matches!(
        state.catalog_service.delete_service(service.id).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn catalog_writes_are_validated() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 15).await;

    let orphan = state
        .catalog_service
        .create_service(ServiceInput {
            name: "Window washing".into(),
            description: String::new(),
            base_price: Decimal::new(40, 0),
            category_id: i64::MAX,
        })
        .await;
    assert!(matches!(orphan, Err(Error::Validation(_))));

    let too_expensive = state
        .catalog_service
        .create_service(ServiceInput {
            name: "Gold plating".into(),
            description: "Everything".into(),
            base_price: Decimal::new(100_000_000_000, 0),
            category_id: category.id,
        })
        .await;
    assert!(matches!(too_expensive, Err(Error::Validation(_))));

    let duplicate = state.catalog_service.create_category(&category.name).await;
    assert!(matches!(duplicate, Err(Error::Validation(_))));

    let updated = state
        .catalog_service
        .update_service(
            service.id,
            ServiceInput {
                name: "Renamed".into(),
                description: "New words".into(),
                base_price: Decimal::new(1999, 2),
                category_id: service.category_id,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.base_price, Decimal::new(1999, 2));
    assert_eq!(updated.category_id, category.id);

    let overflow = state
        .catalog_service
        .update_service(
            service.id,
            ServiceInput {
                name: "Renamed".into(),
                description: "New words".into(),
                base_price: Decimal::new(10_000_000_000, 2),
                category_id: service.category_id,
            },
        )
        .await;
    assert!(matches!(overflow, Err(Error::Validation(_))));

    let listed = state
        .catalog_service
        .services_in_category(category.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn customer_summary_counts_engaged_requests() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 100).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let requests = &state.request_service;

    let done = requests.create(&customer, service.id).await.unwrap();
    requests.accept(&p, done.id).await.unwrap();
    requests.close(&customer, done.id).await.unwrap();
    requests
        .submit_feedback(
            &customer,
            done.id,
            Feedback {
                rating: 4,
                review: String::new(),
            },
        )
        .await
        .unwrap();
    let active = requests.create(&customer, service.id).await.unwrap();
    requests.accept(&p, active.id).await.unwrap();
    // still open, so not part of the spend
    requests.create(&customer, service.id).await.unwrap();

    let summary = state
        .report_service
        .customer_summary(&customer)
        .await
        .unwrap();
    assert_eq!(summary.total_services, 2);
    assert_eq!(summary.total_expenditure, Decimal::new(200, 0));
    assert_eq!(summary.average_rating, 4.0);
    assert_eq!(summary.daily_requests.len(), 30);
    assert_eq!(summary.daily_requests.last().map(|d| d.count), Some(3));

    let count_of = |label: &str| {
        summary
            .status_counts
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    };
    assert_eq!(count_of("requested"), Some(1));
    assert_eq!(count_of("accepted"), Some(1));
    assert_eq!(count_of("closed"), Some(1));
    assert_eq!(count_of("completed"), Some(0));

    assert_eq!(summary.professional_ratings.len(), 1);
    assert_eq!(summary.professional_ratings[0].name, p.full_name);

    let pro_summary = state
        .report_service
        .professional_summary(&p)
        .await
        .unwrap();
    assert_eq!(pro_summary.completed_jobs, 1);
}
