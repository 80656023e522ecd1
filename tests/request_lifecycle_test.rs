mod common;

use marketplace_backend::dto::request_dto::Feedback;
use marketplace_backend::error::Error;
use marketplace_backend::models::service_request::RequestStatus;
use marketplace_backend::models::user::ApprovalStatus;

fn feedback(rating: i32, review: &str) -> Feedback {
    Feedback {
        rating,
        review: review.into(),
    }
}

#[tokio::test]
async fn booking_runs_from_request_to_closed() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 50).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let q = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let requests = &state.request_service;

    let created = requests.create(&customer, service.id).await.unwrap();
    assert_eq!(created.status, RequestStatus::Requested);
    assert_eq!(created.professional_id, None);

    let accepted = requests.accept(&p, created.id).await.unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert_eq!(accepted.professional_id, Some(p.id));

    let second = requests.accept(&q, created.id).await;
    assert!(matches!(second, Err(Error::Conflict(_))));
    let unchanged = requests.get(created.id).await.unwrap();
    assert_eq!(unchanged.status, RequestStatus::Accepted);
    assert_eq!(unchanged.professional_id, Some(p.id));

    let completed = requests.close(&customer, created.id).await.unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
    assert!(completed.completed_at.is_some());

    let closed = requests
        .submit_feedback(&customer, created.id, feedback(5, "Spotless"))
        .await
        .unwrap();
    assert_eq!(closed.status, RequestStatus::Closed);
    assert_eq!(closed.rating, Some(5));
    assert_eq!(closed.review.as_deref(), Some("Spotless"));

    let again = requests
        .submit_feedback(&customer, created.id, feedback(1, "Changed my mind"))
        .await;
    assert!(matches!(again, Err(Error::InvalidTransition(_))));
    assert_eq!(requests.get(created.id).await.unwrap().rating, Some(5));
}

#[tokio::test]
async fn concurrent_accepts_have_one_winner() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 80).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let q = common::professional(&state, category.id, ApprovalStatus::Approved).await;

    for _ in 0..5 {
        let request = state
            .request_service
            .create(&customer, service.id)
            .await
            .unwrap();
        let (a, b) = tokio::join!(
            state.request_service.accept(&p, request.id),
            state.request_service.accept(&q, request.id)
        );

        let winner = match (&a, &b) {
            (Ok(_), Err(Error::Conflict(_))) => p.id,
            (Err(Error::Conflict(_)), Ok(_)) => q.id,
            other => panic!("expected exactly one winner, got {:?}", other),
        };
        let stored = state.request_service.get(request.id).await.unwrap();
        assert_eq!(stored.professional_id, Some(winner));
        assert_eq!(stored.status, RequestStatus::Accepted);
    }
}

#[tokio::test]
async fn rejection_hides_request_from_that_professional_only() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 30).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let p2 = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let requests = &state.request_service;

    let request = requests.create(&customer, service.id).await.unwrap();
    requests.reject(&p, request.id).await.unwrap();
    // a repeated rejection is a no-op
    requests.reject(&p, request.id).await.unwrap();

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM rejected_requests WHERE request_id = $1 AND professional_id = $2",
    )
    .bind(request.id)
    .bind(p.id)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);

    let for_p = requests.list_available(&p).await.unwrap();
    assert!(for_p.iter().all(|r| r.id != request.id));
    let for_p2 = requests.list_available(&p2).await.unwrap();
    assert!(for_p2.iter().any(|r| r.id == request.id));

    assert!(matches!(
        requests.accept(&p, request.id).await,
        Err(Error::Conflict(_))
    ));
    let stored = requests.get(request.id).await.unwrap();
    assert_eq!(stored.status, RequestStatus::Requested);

    requests.accept(&p2, request.id).await.unwrap();
    assert!(matches!(
        requests.reject(&p, request.id).await,
        Err(Error::Conflict(_))
    ));

    let board = requests.professional_board(&p).await.unwrap();
    assert!(board.rejected.iter().any(|r| r.id == request.id));
}

#[tokio::test]
async fn available_requests_are_scoped_to_category_and_oldest_first() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 40).await;
    let (other_category, _) = common::category_with_service(&state, 40).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let outsider = common::professional(&state, other_category.id, ApprovalStatus::Approved).await;
    let requests = &state.request_service;

    let first = requests.create(&customer, service.id).await.unwrap();
    let second = requests.create(&customer, service.id).await.unwrap();

    let ids: Vec<i64> = requests
        .list_available(&p)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    assert!(requests.list_available(&outsider).await.unwrap().is_empty());
    assert!(matches!(
        requests.accept(&outsider, first.id).await,
        Err(Error::AccessDenied { .. })
    ));
    assert!(matches!(
        requests.reject(&outsider, first.id).await,
        Err(Error::AccessDenied { .. })
    ));
    assert!(matches!(
        requests.accept(&p, i64::MAX).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn unapproved_professionals_cannot_act() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 20).await;
    let customer = common::customer(&state).await;
    let pending = common::professional(&state, category.id, ApprovalStatus::Pending).await;
    let rejected = common::professional(&state, category.id, ApprovalStatus::Rejected).await;

    let request = state
        .request_service
        .create(&customer, service.id)
        .await
        .unwrap();
    for pro in [&pending, &rejected] {
        assert!(matches!(
            state.request_service.accept(pro, request.id).await,
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            state.request_service.list_available(pro).await,
            Err(Error::Unauthorized(_))
        ));
    }
}

#[tokio::test]
async fn close_and_feedback_guard_owner_and_state() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 60).await;
    let owner = common::customer(&state).await;
    let stranger = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let requests = &state.request_service;

    let request = requests.create(&owner, service.id).await.unwrap();
    assert!(matches!(
        requests.close(&owner, request.id).await,
        Err(Error::InvalidTransition(_))
    ));
    assert!(matches!(
        requests
            .submit_feedback(&owner, request.id, feedback(4, ""))
            .await,
        Err(Error::InvalidTransition(_))
    ));

    requests.accept(&p, request.id).await.unwrap();
    assert!(matches!(
        requests.close(&stranger, request.id).await,
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        requests.close(&p, request.id).await,
        Err(Error::AccessDenied { .. })
    ));

    requests.close(&owner, request.id).await.unwrap();
    assert!(matches!(
        requests
            .submit_feedback(&stranger, request.id, feedback(4, ""))
            .await,
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        requests
            .submit_feedback(&owner, request.id, feedback(9, ""))
            .await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        requests
            .submit_feedback(&owner, request.id, feedback(3, &"x".repeat(1001)))
            .await,
        Err(Error::Validation(_))
    ));

    let closed = requests
        .submit_feedback(&owner, request.id, feedback(3, "   "))
        .await
        .unwrap();
    assert_eq!(closed.rating, Some(3));
    assert_eq!(closed.review, None);
}

#[tokio::test]
async fn admin_override_bypasses_the_lifecycle() {
    let Some(state) = common::setup().await else {
        return;
    };
    let (category, service) = common::category_with_service(&state, 70).await;
    let customer = common::customer(&state).await;
    let p = common::professional(&state, category.id, ApprovalStatus::Approved).await;
    let admin_email = format!("{}@example.com", common::unique("admin"));
    assert!(state
        .user_service
        .ensure_admin(&admin_email, common::PASSWORD)
        .await
        .unwrap());
    let admin = state
        .user_service
        .find_by_email(&admin_email)
        .await
        .unwrap()
        .unwrap();
    let requests = &state.request_service;

    let request = requests.create(&customer, service.id).await.unwrap();
    requests.accept(&p, request.id).await.unwrap();

    let released = requests
        .admin_override(&admin, request.id, "requested")
        .await
        .unwrap();
    assert_eq!(released.status, RequestStatus::Requested);
    assert_eq!(released.professional_id, None);
    assert!(requests
        .list_available(&p)
        .await
        .unwrap()
        .iter()
        .any(|r| r.id == request.id));

    let completed = requests
        .admin_override(&admin, request.id, "completed")
        .await
        .unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
    assert!(completed.completed_at.is_some());

    assert!(matches!(
        requests.admin_override(&admin, request.id, "cancelled").await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        requests.admin_override(&customer, request.id, "closed").await,
        Err(Error::AccessDenied { .. })
    ));
    assert!(matches!(
        requests.admin_override(&admin, i64::MAX, "closed").await,
        Err(Error::NotFound(_))
    ));
}
