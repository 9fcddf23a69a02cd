use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{RescueReport, UserId};

/// Kinds of outbound reporter notifications produced by the triage flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "rescue_report_created")]
    ReportCreated,
    #[serde(rename = "rescue_report_status_update")]
    StatusUpdate,
}

impl NotificationType {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationType::ReportCreated => "rescue_report_created",
            NotificationType::StatusUpdate => "rescue_report_status_update",
        }
    }
}

/// Delivery state of a queued notification. Records are created `pending`;
/// the external delivery collaborator owns the transition to sent/failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// An outbound notification to record. The queue assigns id, delivery
/// status, and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIntent {
    pub recipient_email: String,
    pub subject: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub user_id: Option<UserId>,
}

/// Append-only row in the notification store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub recipient_email: String,
    pub subject: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub status: DeliveryStatus,
    pub user_id: Option<UserId>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Trait describing the outbound notification store. Delivery itself is an
/// external collaborator's responsibility; enqueueing only records intent.
pub trait NotificationQueue: Send + Sync {
    fn enqueue(&self, intent: NotificationIntent) -> Result<NotificationRecord, NotifyError>;
}

/// Notification enqueue error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Acknowledgement sent to the reporter when a report is accepted.
pub fn report_received(report: &RescueReport) -> NotificationIntent {
    let message = format!(
        "Thank you for reporting a {} in need at {}. Details: {}. Urgency: {}. \
         Responders will reach you at {} if they need more information.",
        report.animal_type,
        report.location,
        report.description,
        report.urgency.label(),
        report.phone,
    );

    NotificationIntent {
        recipient_email: report.email.clone(),
        subject: format!("Rescue report received: {}", report.animal_type),
        message,
        notification_type: NotificationType::ReportCreated,
        user_id: report.user_id.clone(),
    }
}

/// Update sent to the original reporter when triage moves their report. The
/// body differs for terminal and non-terminal states.
pub fn status_changed(report: &RescueReport) -> NotificationIntent {
    let message = if report.status.is_terminal() {
        format!(
            "Your rescue report for the {} at {} has been resolved. \
             Thank you for looking out for animals in your area.",
            report.animal_type, report.location,
        )
    } else {
        format!(
            "Your rescue report for the {} at {} is now {}. \
             A responder is looking into it.",
            report.animal_type,
            report.location,
            report.status.display_name(),
        )
    };

    NotificationIntent {
        recipient_email: report.email.clone(),
        subject: format!("Rescue report update: {}", report.status.display_name()),
        message,
        notification_type: NotificationType::StatusUpdate,
        user_id: report.user_id.clone(),
    }
}
