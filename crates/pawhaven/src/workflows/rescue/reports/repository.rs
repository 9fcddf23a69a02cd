use std::cmp::Reverse;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{
    NewReport, OrgId, ReportId, ReportPatch, ReportStatus, RescueReport, Urgency, UserId,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Storage abstraction over the report store so the triage service can be
/// exercised against any backend.
pub trait ReportRepository: Send + Sync {
    /// Assigns id and timestamps, persists, and returns the stored row.
    fn insert(&self, record: NewReport) -> Result<RescueReport, RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<RescueReport>, RepositoryError>;
    /// Filtered, triage-ordered, paginated listing. Implementations must
    /// honor [`ReportQuery::apply`] semantics.
    fn search(&self, query: &ReportQuery) -> Result<Vec<RescueReport>, RepositoryError>;
    /// Applies only provided fields and refreshes `updated_at`. `NotFound`
    /// if the id is absent.
    fn update(&self, id: &ReportId, patch: &ReportPatch) -> Result<RescueReport, RepositoryError>;
    /// Administrative removal; returns the removed row.
    fn remove(&self, id: &ReportId) -> Result<RescueReport, RepositoryError>;
}

/// Lookup into the user/organization collaborator stores, used for
/// referential checks before a report references either.
pub trait DirectoryLookup: Send + Sync {
    fn user_exists(&self, id: &UserId) -> Result<bool, RepositoryError>;
    fn organization_exists(&self, id: &OrgId) -> Result<bool, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Filters and pagination for report listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub status: Option<ReportStatus>,
    pub urgency: Option<Urgency>,
    pub user_id: Option<UserId>,
    pub assigned_ngo_id: Option<OrgId>,
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ReportQuery {
    /// Whether a report satisfies every supplied filter. The free-text term
    /// matches case-insensitively against description, location, and animal
    /// type.
    pub fn matches(&self, report: &RescueReport) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(urgency) = self.urgency {
            if report.urgency != urgency {
                return false;
            }
        }
        if let Some(user_id) = &self.user_id {
            if report.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }
        if let Some(ngo_id) = &self.assigned_ngo_id {
            if report.assigned_ngo_id.as_ref() != Some(ngo_id) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let haystacks = [
                &report.description,
                &report.location,
                &report.animal_type,
            ];
            if !haystacks
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }

    /// Filter, order, and paginate an unordered set of reports. Shared by
    /// every store adapter so listing semantics cannot drift between them.
    pub fn apply(&self, mut reports: Vec<RescueReport>) -> Vec<RescueReport> {
        reports.retain(|report| self.matches(report));
        triage_order(&mut reports);

        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        reports.into_iter().skip(offset).take(limit).collect()
    }
}

/// Triage listing order: urgency rank first (critical sorts before low),
/// newest report first within the same urgency band.
pub fn triage_order(reports: &mut [RescueReport]) {
    reports.sort_by_key(|report| (report.urgency.rank(), Reverse(report.created_at)));
}

/// Apply a validated patch in place, refreshing `updated_at`. Shared by
/// store adapters so partial-update semantics stay uniform.
pub fn apply_patch(report: &mut RescueReport, patch: &ReportPatch) {
    if let Some(animal_type) = &patch.animal_type {
        report.animal_type = animal_type.clone();
    }
    if let Some(location) = &patch.location {
        report.location = location.clone();
    }
    if let Some(description) = &patch.description {
        report.description = description.clone();
    }
    if let Some(phone) = &patch.phone {
        report.phone = phone.clone();
    }
    if let Some(email) = &patch.email {
        report.email = email.clone();
    }
    if let Some(urgency) = patch.urgency {
        report.urgency = urgency;
    }
    if let Some(status) = patch.status {
        report.status = status;
    }
    if let Some(latitude) = patch.latitude {
        report.latitude = Some(latitude);
    }
    if let Some(longitude) = patch.longitude {
        report.longitude = Some(longitude);
    }
    if let Some(image_url) = &patch.image_url {
        report.image_url = Some(image_url.clone());
    }
    if let Some(assignment) = &patch.assigned_ngo_id {
        report.assigned_ngo_id = assignment.clone();
    }
    report.updated_at = Utc::now();
}
