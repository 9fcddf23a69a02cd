use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use pawhaven::workflows::rescue::reports::{
    apply_patch, DeliveryStatus, DirectoryLookup, NewReport, NotificationIntent,
    NotificationQueue, NotificationRecord, NotifyError, OrgId, ReportId, ReportPatch,
    ReportQuery, ReportRepository, RepositoryError, RescueReport, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, RescueReport>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, record: NewReport) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn search(&self, query: &ReportQuery) -> Result<Vec<RescueReport>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(query.apply(guard.values().cloned().collect()))
    }

    fn update(&self, id: &ReportId, patch: &ReportPatch) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let report = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        apply_patch(report, patch);
        Ok(report.clone())
    }

    fn remove(&self, id: &ReportId) -> Result<RescueReport, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    users: Arc<Mutex<HashSet<UserId>>>,
    organizations: Arc<Mutex<HashSet<OrgId>>>,
}

impl InMemoryDirectory {
    pub(crate) fn register_user(&self, id: &str) {
        self.users
            .lock()
            .expect("directory mutex poisoned")
            .insert(UserId(id.to_string()));
    }

    pub(crate) fn register_organization(&self, id: &str) {
        self.organizations
            .lock()
            .expect("directory mutex poisoned")
            .insert(OrgId(id.to_string()));
    }
}

impl DirectoryLookup for InMemoryDirectory {
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
pub(crate) struct InMemoryNotificationQueue {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl InMemoryNotificationQueue {
    pub(crate) fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().expect("queue mutex poisoned").clone()
    }
}

impl NotificationQueue for InMemoryNotificationQueue {
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
