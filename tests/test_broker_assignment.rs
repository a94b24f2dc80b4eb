mod helpers;

use brokerdesk::application::services::AssignmentService;
use brokerdesk::domain::entities::{AssignmentMethod, AssignmentOutcome, PersonalityType};
use brokerdesk::infrastructure::http::middleware::ApiError;
use brokerdesk::infrastructure::persistence::Database;
use futures::future::join_all;
use helpers::*;
use std::sync::Arc;

fn assignment_service(db: &Database) -> AssignmentService {
    AssignmentService::new(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
    )
}

#[tokio::test]
async fn test_high_score_lead_gets_aggressive_broker() {
    let db = setup_test_db().await;
    create_test_broker(&db, "steady", PersonalityType::Balanced, 3).await;
    create_test_broker(&db, "closer", PersonalityType::Aggressive, 3).await;
    create_test_conversation(&db, 101, 82).await;

    let service = assignment_service(&db);
    let outcome = service.assign_broker(101).await.unwrap();

    match outcome {
        AssignmentOutcome::Assigned { broker, assignment } => {
            assert_eq!(broker.id, "closer");
            assert_eq!(assignment.method, AssignmentMethod::Automatic);
            assert!(assignment.reason.is_some());
        }
        other => panic!("Expected assignment, got {:?}", other),
    }

    let conversation = reload_conversation(&db, 101).await;
    assert_eq!(conversation.broker_id.as_deref(), Some("closer"));
    assert_eq!(reload_broker(&db, "closer").await.current_workload, 1);
    assert_eq!(reload_broker(&db, "steady").await.current_workload, 0);
}

#[tokio::test]
async fn test_least_loaded_broker_wins_over_persona_match() {
    let db = setup_test_db().await;
    create_test_broker(&db, "closer", PersonalityType::Aggressive, 3).await;
    create_test_broker(&db, "steady", PersonalityType::Balanced, 3).await;
    create_test_conversation(&db, 1, 90).await;
    create_test_conversation(&db, 2, 90).await;

    let service = assignment_service(&db);
    service.assign_broker(1).await.unwrap();
    let outcome = service.assign_broker(2).await.unwrap();

    match outcome {
        AssignmentOutcome::Assigned { broker, .. } => assert_eq!(broker.id, "steady"),
        other => panic!("Expected assignment, got {:?}", other),
    }
}

#[tokio::test]
async fn test_capacity_is_never_exceeded() {
    let db = setup_test_db().await;
    create_test_broker(&db, "solo", PersonalityType::Balanced, 2).await;
    for id in 1..=3 {
        create_test_conversation(&db, id, 50).await;
    }

    let service = assignment_service(&db);
    assert!(service.assign_broker(1).await.unwrap().is_assigned());
    assert!(service.assign_broker(2).await.unwrap().is_assigned());
    assert!(matches!(
        service.assign_broker(3).await.unwrap(),
        AssignmentOutcome::NoBrokerAvailable
    ));

    let broker = reload_broker(&db, "solo").await;
    assert_eq!(broker.current_workload, 2);
    assert!(!broker.is_available);
    assert!(reload_conversation(&db, 3).await.broker_id.is_none());
}

#[tokio::test]
async fn test_repeat_assignment_keeps_existing_broker() {
    let db = setup_test_db().await;
    create_test_broker(&db, "solo", PersonalityType::Balanced, 3).await;
    create_test_conversation(&db, 7, 50).await;

    let service = assignment_service(&db);
    service.assign_broker(7).await.unwrap();
    let again = service.assign_broker(7).await.unwrap();

    match again {
        AssignmentOutcome::AlreadyAssigned { broker_id } => assert_eq!(broker_id, "solo"),
        other => panic!("Expected existing assignment, got {:?}", other),
    }
    assert_eq!(reload_broker(&db, "solo").await.current_workload, 1);
}

#[tokio::test]
async fn test_concurrent_assignments_respect_capacity() {
    let db = setup_test_db().await;
    create_test_broker(&db, "busy", PersonalityType::Balanced, 3).await;
    for id in 1..=10 {
        create_test_conversation(&db, id, 50).await;
    }

    let service = assignment_service(&db);
    let results = join_all((1..=10).map(|id| {
        let service = service.clone();
        async move { service.assign_broker(id).await }
    }))
    .await;

    let assigned = results
        .into_iter()
        .map(|r| r.expect("assignment should not error"))
        .filter(|outcome| outcome.is_assigned())
        .count();

    assert_eq!(assigned, 3);
    assert_eq!(reload_broker(&db, "busy").await.current_workload, 3);
}

#[tokio::test]
async fn test_completion_releases_capacity_once() {
    let db = setup_test_db().await;
    create_test_broker(&db, "solo", PersonalityType::Balanced, 1).await;
    create_test_conversation(&db, 5, 50).await;

    let service = assignment_service(&db);
    service.assign_broker(5).await.unwrap();
    assert!(!reload_broker(&db, "solo").await.is_available);

    let first = service.complete_conversation(5).await.unwrap();
    assert!(first.completed);
    assert_eq!(first.released_broker_id.as_deref(), Some("solo"));

    let second = service.complete_conversation(5).await.unwrap();
    assert!(!second.completed);
    assert!(second.released_broker_id.is_none());

    let broker = reload_broker(&db, "solo").await;
    assert_eq!(broker.current_workload, 0);
    assert!(broker.is_available);
}

#[tokio::test]
async fn test_completing_unknown_conversation_is_not_found() {
    let db = setup_test_db().await;
    let service = assignment_service(&db);

    let result = service.complete_conversation(404).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_manual_reassignment_moves_workload() {
    let db = setup_test_db().await;
    create_test_broker(&db, "first", PersonalityType::Balanced, 3).await;
    create_test_broker(&db, "second", PersonalityType::Conservative, 3).await;
    create_test_conversation(&db, 9, 50).await;

    let service = assignment_service(&db);
    service.assign_broker(9).await.unwrap();
    assert_eq!(reload_broker(&db, "first").await.current_workload, 1);

    let response = service
        .assign_manually(9, "second", Some("Lead asked for David".to_string()))
        .await
        .unwrap();

    assert_eq!(response.broker.id, "second");
    assert_eq!(response.assignment_method, AssignmentMethod::Manual);
    assert_eq!(reload_broker(&db, "first").await.current_workload, 0);
    assert_eq!(reload_broker(&db, "second").await.current_workload, 1);

    let current = service.broker_for_conversation(9).await.unwrap();
    assert_eq!(current.broker.id, "second");
}

#[tokio::test]
async fn test_manual_assignment_to_full_broker_conflicts() {
    let db = setup_test_db().await;
    create_test_broker(&db, "full", PersonalityType::Balanced, 1).await;
    create_test_conversation(&db, 1, 50).await;
    create_test_conversation(&db, 2, 50).await;

    let service = assignment_service(&db);
    service.assign_manually(1, "full", None).await.unwrap();

    let result = service.assign_manually(2, "full", None).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
    assert_eq!(reload_broker(&db, "full").await.current_workload, 1);
}

#[tokio::test]
async fn test_unassigned_conversation_has_no_broker() {
    let db = setup_test_db().await;
    create_test_conversation(&db, 3, 50).await;

    let service = assignment_service(&db);
    let result = service.broker_for_conversation(3).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_stale_conversations_are_completed() {
    let db = setup_test_db().await;
    create_test_broker(&db, "solo", PersonalityType::Balanced, 3).await;
    create_test_conversation(&db, 1, 50).await;
    create_test_conversation(&db, 2, 50).await;

    let service = assignment_service(&db);
    service.assign_broker(1).await.unwrap();

    sqlx::query("UPDATE conversations SET last_activity_at = ? WHERE id = ?")
        .bind("2020-01-01T00:00:00.000Z")
        .bind(1i64)
        .execute(db.pool())
        .await
        .unwrap();

    let completed = service
        .complete_stale_conversations(chrono::Duration::hours(24))
        .await
        .unwrap();

    assert_eq!(completed, 1);
    assert!(!reload_conversation(&db, 1).await.is_active());
    assert!(reload_conversation(&db, 2).await.is_active());
    assert_eq!(reload_broker(&db, "solo").await.current_workload, 0);
}
