use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    ReportId, ReportPatchRequest, ReportStatus, RescueReport, ReportSubmission,
};
use super::notify::{self, NotificationIntent, NotificationQueue};
use super::repository::{
    DirectoryLookup, ReportQuery, ReportRepository, RepositoryError, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
use super::validate::{validate_patch, validate_submission, ValidationError};

/// Paging knobs for report listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Service composing validation, the report store, the user/organization
/// directory, and the notification queue.
///
/// Every operation re-reads current store state before acting on it; the
/// service holds no report state of its own. Concurrent updates to the same
/// report race with last-write-wins, matching the store's guarantees.
pub struct ReportTriageService<R, D, N> {
    repository: Arc<R>,
    directory: Arc<D>,
    notifications: Arc<N>,
    config: TriageConfig,
}

impl<R, D, N> ReportTriageService<R, D, N>
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: NotificationQueue + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        notifications: Arc<N>,
        config: TriageConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            notifications,
            config,
        }
    }

    /// Accept a new report: validate, check references, persist, then queue
    /// the reporter acknowledgement. Nothing is written until every check
    /// has passed.
    pub fn create(
        &self,
        submission: ReportSubmission,
    ) -> Result<RescueReport, ReportServiceError> {
        let record = validate_submission(submission)?;

        if let Some(user_id) = &record.user_id {
            if !self.directory.user_exists(user_id)? {
                return Err(ValidationError::UserNotFound {
                    id: user_id.clone(),
                }
                .into());
            }
        }
        if let Some(ngo_id) = &record.assigned_ngo_id {
            if !self.directory.organization_exists(ngo_id)? {
                return Err(ValidationError::OrganizationNotFound {
                    id: ngo_id.clone(),
                }
                .into());
            }
        }

        let stored = self.repository.insert(record)?;
        self.enqueue_best_effort(notify::report_received(&stored));
        Ok(stored)
    }

    /// Fetch a single report.
    pub fn get(&self, id: &ReportId) -> Result<RescueReport, ReportServiceError> {
        let report = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(report)
    }

    /// Filtered, triage-ordered listing with paging clamped to the
    /// configured bounds.
    pub fn list(&self, mut query: ReportQuery) -> Result<Vec<RescueReport>, ReportServiceError> {
        let limit = query
            .limit
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        query.limit = Some(limit);
        query.offset = Some(query.offset.unwrap_or(0));

        let reports = self.repository.search(&query)?;
        Ok(reports)
    }

    /// Apply a partial update. Any of the three statuses is accepted
    /// regardless of the current one; a status notification is queued only
    /// when the status actually changed and the new state is in_progress or
    /// resolved.
    pub fn update(
        &self,
        id: &ReportId,
        request: ReportPatchRequest,
    ) -> Result<RescueReport, ReportServiceError> {
        let patch = validate_patch(request)?;

        if let Some(Some(ngo_id)) = &patch.assigned_ngo_id {
            if !self.directory.organization_exists(ngo_id)? {
                return Err(ValidationError::OrganizationNotFound {
                    id: ngo_id.clone(),
                }
                .into());
            }
        }

        let current = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let updated = self.repository.update(id, &patch)?;

        if let Some(new_status) = patch.status {
            let changed = new_status != current.status;
            let actionable = matches!(
                new_status,
                ReportStatus::InProgress | ReportStatus::Resolved
            );
            if changed && actionable {
                self.enqueue_best_effort(notify::status_changed(&updated));
            }
        }

        Ok(updated)
    }

    /// Administrative removal. Returns the removed record; queues nothing.
    pub fn delete(&self, id: &ReportId) -> Result<RescueReport, ReportServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let removed = self.repository.remove(id)?;
        Ok(removed)
    }

    // Notification is a side effect, not a transactional participant: a
    // failed enqueue is logged and never surfaces to the caller.
    fn enqueue_best_effort(&self, intent: NotificationIntent) {
        let kind = intent.notification_type.label();
        if let Err(err) = self.notifications.enqueue(intent) {
            tracing::warn!(error = %err, notification_type = kind, "failed to enqueue notification");
        }
    }
}

/// Error raised by the triage service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
