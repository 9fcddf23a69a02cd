//! Rescue-report intake and triage.
//!
//! The flow for every mutation is validation, then referential checks
//! against the user/organization directory, then persistence, then a
//! best-effort reporter notification. Listing follows the triage ordering
//! contract: urgency rank first, newest first within a band.

pub mod domain;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests;

pub use domain::{
    CoordinateValue, NewReport, OrgId, ReportId, ReportPatch, ReportPatchRequest, ReportStatus,
    ReportSubmission, RescueReport, Urgency, UserId,
};
pub use notify::{
    DeliveryStatus, NotificationIntent, NotificationQueue, NotificationRecord, NotificationType,
    NotifyError,
};
pub use repository::{
    apply_patch, triage_order, DirectoryLookup, ReportQuery, ReportRepository, RepositoryError,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use router::report_router;
pub use service::{ReportServiceError, ReportTriageService, TriageConfig};
pub use validate::{validate_patch, validate_submission, ValidationError};
