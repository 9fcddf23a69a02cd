use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::common::*;
use crate::workflows::rescue::reports::domain::{ReportId, ReportPatchRequest, ReportStatus, Urgency};
use crate::workflows::rescue::reports::notify::NotificationType;
use crate::workflows::rescue::reports::repository::{
    ReportQuery, ReportRepository, RepositoryError,
};
use crate::workflows::rescue::reports::validate::ValidationError;
use crate::workflows::rescue::reports::{ReportServiceError, ReportTriageService, TriageConfig};

#[test]
fn create_persists_and_queues_acknowledgement() {
    let (service, repository, _, notifications) = build_service();

    let report = service.create(submission()).expect("create succeeds");
    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.urgency, Urgency::Medium);
    assert_eq!(report.created_at, report.updated_at);

    assert_eq!(repository.all().len(), 1);

    let queued = notifications.records();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].notification_type, NotificationType::ReportCreated);
    assert_eq!(queued[0].recipient_email, "a@b.com");
}

#[test]
fn create_rejects_unknown_user_without_persisting() {
    let (service, repository, _, notifications) = build_service();

    let mut payload = submission();
    payload.user_id = Some("user-unknown".to_string());

    match service.create(payload) {
        Err(ReportServiceError::Validation(ValidationError::UserNotFound { .. })) => {}
        other => panic!("expected USER_NOT_FOUND, got {other:?}"),
    }
    assert!(repository.all().is_empty());
    assert!(notifications.records().is_empty());
}

#[test]
fn create_rejects_unknown_organization() {
    let (service, repository, _, _) = build_service();

    let mut payload = submission();
    payload.assigned_ngo_id = Some("ngo-unknown".to_string());

    match service.create(payload) {
        Err(ReportServiceError::Validation(ValidationError::OrganizationNotFound { .. })) => {}
        other => panic!("expected NGO_NOT_FOUND, got {other:?}"),
    }
    assert!(repository.all().is_empty());
}

#[test]
fn create_accepts_known_references() {
    let (service, _, _, _) = build_service();

    let mut payload = submission();
    payload.user_id = Some(KNOWN_USER.to_string());
    payload.assigned_ngo_id = Some(KNOWN_NGO.to_string());

    let report = service.create(payload).expect("create succeeds");
    assert_eq!(report.user_id.as_ref().map(|id| id.0.as_str()), Some(KNOWN_USER));
    assert_eq!(
        report.assigned_ngo_id.as_ref().map(|id| id.0.as_str()),
        Some(KNOWN_NGO)
    );
}

#[test]
fn status_change_to_in_progress_queues_exactly_one_update() {
    let (service, _, _, notifications) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    let updated = service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("in_progress".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(updated.status, ReportStatus::InProgress);
    let queued = notifications.records();
    assert_eq!(queued.len(), 2, "creation ack plus one status update");
    assert_eq!(queued[1].notification_type, NotificationType::StatusUpdate);
    assert!(queued[1].subject.contains("In Progress"));
}

#[test]
fn unchanged_status_queues_nothing() {
    let (service, _, _, notifications) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("pending".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(notifications.records().len(), 1, "only the creation ack");
}

#[test]
fn non_status_update_queues_nothing() {
    let (service, _, _, notifications) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    service
        .update(
            &report.id,
            ReportPatchRequest {
                description: Some("now limping badly".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(notifications.records().len(), 1, "only the creation ack");
}

#[test]
fn reverting_to_pending_queues_nothing() {
    let (service, _, _, notifications) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("resolved".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("resolve succeeds");
    service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("pending".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("reopen succeeds");

    let queued = notifications.records();
    assert_eq!(queued.len(), 2, "reopening to pending is silent");
}

#[test]
fn partial_update_preserves_untouched_fields() {
    let (service, _, _, _) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    thread::sleep(Duration::from_millis(2));
    let updated = service
        .update(
            &report.id,
            ReportPatchRequest {
                description: Some("now limping badly".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(updated.description, "now limping badly");
    assert_eq!(updated.animal_type, report.animal_type);
    assert_eq!(updated.phone, report.phone);
    assert_eq!(updated.urgency, report.urgency);
    assert_eq!(updated.status, report.status);
    assert_eq!(updated.created_at, report.created_at);
    assert!(updated.updated_at > report.updated_at);
}

#[test]
fn update_can_clear_ngo_assignment() {
    let (service, _, _, _) = build_service();
    let mut payload = submission();
    payload.assigned_ngo_id = Some(KNOWN_NGO.to_string());
    let report = service.create(payload).expect("create succeeds");

    let cleared: ReportPatchRequest =
        serde_json::from_str(r#"{"assignedNgoId": null}"#).expect("null parses");
    let updated = service.update(&report.id, cleared).expect("update succeeds");
    assert_eq!(updated.assigned_ngo_id, None);
}

#[test]
fn update_rejects_unknown_organization_before_writing() {
    let (service, repository, _, _) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    let result = service.update(
        &report.id,
        ReportPatchRequest {
            status: Some("in_progress".to_string()),
            assigned_ngo_id: Some(Some("ngo-unknown".to_string())),
            ..ReportPatchRequest::default()
        },
    );

    assert!(matches!(
        result,
        Err(ReportServiceError::Validation(
            ValidationError::OrganizationNotFound { .. }
        ))
    ));
    let stored = repository
        .fetch(&report.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, ReportStatus::Pending, "no partial write");
}

#[test]
fn update_of_missing_report_is_not_found() {
    let (service, repository, _, notifications) = build_service();
    service.create(submission()).expect("create succeeds");

    let result = service.update(
        &ReportId("missing".to_string()),
        ReportPatchRequest {
            status: Some("resolved".to_string()),
            ..ReportPatchRequest::default()
        },
    );

    assert!(matches!(
        result,
        Err(ReportServiceError::Repository(RepositoryError::NotFound))
    ));
    assert_eq!(repository.all().len(), 1, "store unmodified");
    assert_eq!(notifications.records().len(), 1);
}

#[test]
fn delete_returns_record_and_queues_nothing() {
    let (service, repository, _, notifications) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    let removed = service.delete(&report.id).expect("delete succeeds");
    assert_eq!(removed.id, report.id);
    assert!(repository.all().is_empty());
    assert_eq!(notifications.records().len(), 1, "only the creation ack");
}

#[test]
fn delete_of_missing_report_is_not_found() {
    let (service, _, _, _) = build_service();

    let result = service.delete(&ReportId("missing".to_string()));
    assert!(matches!(
        result,
        Err(ReportServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn listing_orders_by_urgency_then_recency() {
    let (service, _, _, _) = build_service();

    for urgency in ["low", "critical", "medium", "high"] {
        service
            .create(submission_with_urgency(urgency))
            .expect("create succeeds");
        thread::sleep(Duration::from_millis(2));
    }

    let listed = service.list(ReportQuery::default()).expect("list succeeds");
    let order: Vec<Urgency> = listed.iter().map(|report| report.urgency).collect();
    assert_eq!(
        order,
        vec![Urgency::Critical, Urgency::High, Urgency::Medium, Urgency::Low]
    );
}

#[test]
fn newer_report_lists_first_within_an_urgency_band() {
    let (service, _, _, _) = build_service();

    let first = service
        .create(submission_with_urgency("critical"))
        .expect("create succeeds");
    thread::sleep(Duration::from_millis(2));
    let second = service
        .create(submission_with_urgency("critical"))
        .expect("create succeeds");

    let listed = service.list(ReportQuery::default()).expect("list succeeds");
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn listing_filters_by_status_and_search() {
    let (service, _, _, _) = build_service();

    let report = service.create(submission()).expect("create succeeds");
    let mut other = submission();
    other.animal_type = Some("cat".to_string());
    other.description = Some("stuck on a ledge".to_string());
    service.create(other).expect("create succeeds");

    service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("resolved".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update succeeds");

    let resolved = service
        .list(ReportQuery {
            status: Some(ReportStatus::Resolved),
            ..ReportQuery::default()
        })
        .expect("list succeeds");
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, report.id);

    let ledges = service
        .list(ReportQuery {
            search: Some("LEDGE".to_string()),
            ..ReportQuery::default()
        })
        .expect("list succeeds");
    assert_eq!(ledges.len(), 1);
    assert_eq!(ledges[0].animal_type, "cat");
}

#[test]
fn listing_clamps_limit_to_the_configured_maximum() {
    let repository = Arc::new(MemoryReportStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = ReportTriageService::new(
        repository,
        directory,
        notifications,
        TriageConfig {
            default_page_size: 2,
            max_page_size: 3,
        },
    );

    for _ in 0..5 {
        service.create(submission()).expect("create succeeds");
    }

    let default_page = service.list(ReportQuery::default()).expect("list succeeds");
    assert_eq!(default_page.len(), 2);

    let oversized = service
        .list(ReportQuery {
            limit: Some(50),
            ..ReportQuery::default()
        })
        .expect("list succeeds");
    assert_eq!(oversized.len(), 3);

    let offset = service
        .list(ReportQuery {
            limit: Some(3),
            offset: Some(4),
            ..ReportQuery::default()
        })
        .expect("list succeeds");
    assert_eq!(offset.len(), 1);
}

#[test]
fn notification_failure_never_fails_the_mutation() {
    let repository = Arc::new(MemoryReportStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    let service = ReportTriageService::new(
        repository.clone(),
        directory,
        Arc::new(FailingNotifications),
        TriageConfig::default(),
    );

    let report = service.create(submission()).expect("create still succeeds");
    assert_eq!(repository.all().len(), 1);

    let updated = service
        .update(
            &report.id,
            ReportPatchRequest {
                status: Some("resolved".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("update still succeeds");
    assert_eq!(updated.status, ReportStatus::Resolved);
}

#[test]
fn concurrent_style_updates_are_last_write_wins() {
    let (service, repository, _, _) = build_service();
    let report = service.create(submission()).expect("create succeeds");

    service
        .update(
            &report.id,
            ReportPatchRequest {
                urgency: Some("high".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("first update succeeds");
    service
        .update(
            &report.id,
            ReportPatchRequest {
                urgency: Some("low".to_string()),
                ..ReportPatchRequest::default()
            },
        )
        .expect("second update succeeds");

    let stored = repository
        .fetch(&report.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.urgency, Urgency::Low);
}
