use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::workflows::rescue::reports::domain::{
    NewReport, OrgId, ReportId, ReportPatch, RescueReport, ReportSubmission, UserId,
};
use crate::workflows::rescue::reports::notify::{
    DeliveryStatus, NotificationIntent, NotificationQueue, NotificationRecord, NotifyError,
};
use crate::workflows::rescue::reports::repository::{
    apply_patch, DirectoryLookup, ReportQuery, ReportRepository, RepositoryError,
};
use crate::workflows::rescue::reports::{report_router, ReportTriageService, TriageConfig};

pub(super) const KNOWN_USER: &str = "user-7";
pub(super) const KNOWN_NGO: &str = "ngo-3";

pub(super) fn submission() -> ReportSubmission {
    ReportSubmission {
        animal_type: Some("dog".to_string()),
        location: Some("Park St".to_string()),
        description: Some("injured leg".to_string()),
        phone: Some("9876543210".to_string()),
        email: Some("a@b.com".to_string()),
        ..ReportSubmission::default()
    }
}

pub(super) fn submission_with_urgency(urgency: &str) -> ReportSubmission {
    ReportSubmission {
        urgency: Some(urgency.to_string()),
        ..submission()
    }
}

pub(super) fn build_service() -> (
    ReportTriageService<MemoryReportStore, MemoryDirectory, MemoryNotifications>,
    Arc<MemoryReportStore>,
    Arc<MemoryDirectory>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryReportStore::default());
    let directory = Arc::new(MemoryDirectory::default());
    directory.add_user(KNOWN_USER);
    directory.add_organization(KNOWN_NGO);
    let notifications = Arc::new(MemoryNotifications::default());
    let service = ReportTriageService::new(
        repository.clone(),
        directory.clone(),
        notifications.clone(),
        TriageConfig::default(),
    );
    (service, repository, directory, notifications)
}

pub(super) fn report_router_with_service(
    service: ReportTriageService<MemoryReportStore, MemoryDirectory, MemoryNotifications>,
) -> axum::Router {
    report_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryReportStore {
    records: Arc<Mutex<HashMap<ReportId, RescueReport>>>,
}

impl MemoryReportStore {
    pub(super) fn all(&self) -> Vec<RescueReport> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl ReportRepository for MemoryReportStore {
    fn insert(&self, record: NewReport) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let id = ReportId(Uuid::new_v4().to_string());
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        let now = Utc::now();
        let report = RescueReport {
            id: id.clone(),
            animal_type: record.animal_type,
            location: record.location,
            description: record.description,
            phone: record.phone,
            email: record.email,
            urgency: record.urgency,
            status: record.status,
            latitude: record.latitude,
            longitude: record.longitude,
            image_url: record.image_url,
            user_id: record.user_id,
            assigned_ngo_id: record.assigned_ngo_id,
            created_at: now,
            updated_at: now,
        };
        guard.insert(id, report.clone());
        Ok(report)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<RescueReport>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn search(&self, query: &ReportQuery) -> Result<Vec<RescueReport>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(query.apply(guard.values().cloned().collect()))
    }

    fn update(&self, id: &ReportId, patch: &ReportPatch) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let report = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        apply_patch(report, patch);
        Ok(report.clone())
    }

    fn remove(&self, id: &ReportId) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    users: Arc<Mutex<HashSet<UserId>>>,
    organizations: Arc<Mutex<HashSet<OrgId>>>,
}

impl MemoryDirectory {
    pub(super) fn add_user(&self, id: &str) {
        self.users
            .lock()
            .expect("directory mutex poisoned")
            .insert(UserId(id.to_string()));
    }

    pub(super) fn add_organization(&self, id: &str) {
        self.organizations
            .lock()
            .expect("directory mutex poisoned")
            .insert(OrgId(id.to_string()));
    }
}

impl DirectoryLookup for MemoryDirectory {
    fn user_exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .users
            .lock()
            .expect("directory mutex poisoned")
            .contains(id))
    }

    fn organization_exists(&self, id: &OrgId) -> Result<bool, RepositoryError> {
        Ok(self
            .organizations
            .lock()
            .expect("directory mutex poisoned")
            .contains(id))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl MemoryNotifications {
    pub(super) fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().expect("queue mutex poisoned").clone()
    }
}

impl NotificationQueue for MemoryNotifications {
    fn enqueue(&self, intent: NotificationIntent) -> Result<NotificationRecord, NotifyError> {
        let record = NotificationRecord {
            id: Uuid::new_v4().to_string(),
            recipient_email: intent.recipient_email,
            subject: intent.subject,
            message: intent.message,
            notification_type: intent.notification_type,
            status: DeliveryStatus::Pending,
            user_id: intent.user_id,
            sent_at: None,
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .expect("queue mutex poisoned")
            .push(record.clone());
        Ok(record)
    }
}

pub(super) struct FailingNotifications;

impl NotificationQueue for FailingNotifications {
    fn enqueue(&self, _intent: NotificationIntent) -> Result<NotificationRecord, NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl ReportRepository for UnavailableStore {
    fn insert(&self, _record: NewReport) -> Result<RescueReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<RescueReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn search(&self, _query: &ReportQuery) -> Result<Vec<RescueReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _id: &ReportId,
        _patch: &ReportPatch,
    ) -> Result<RescueReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: &ReportId) -> Result<RescueReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
