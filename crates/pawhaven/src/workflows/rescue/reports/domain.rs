use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for persisted rescue reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for reporting users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for responding organizations (NGOs and shelters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(pub String);

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity ranking of a report. Drives listing order and response priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    /// Sort key for triage listings. Lower ranks list first.
    pub const fn rank(self) -> u8 {
        match self {
            Urgency::Critical => 0,
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            "critical" => Some(Urgency::Critical),
            _ => None,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

/// Lifecycle state of a report. `pending` at intake, `resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Human-readable form used in reporter-facing notifications.
    pub const fn display_name(self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ReportStatus::Pending),
            "in_progress" => Some(ReportStatus::InProgress),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Pending
    }
}

/// A persisted rescue report as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueReport {
    pub id: ReportId,
    pub animal_type: String,
    pub location: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub urgency: Urgency,
    pub status: ReportStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub user_id: Option<UserId>,
    pub assigned_ngo_id: Option<OrgId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated creation record. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub animal_type: String,
    pub location: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub urgency: Urgency,
    pub status: ReportStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub user_id: Option<UserId>,
    pub assigned_ngo_id: Option<OrgId>,
}

/// A validated partial update. `None` fields are left untouched.
///
/// `assigned_ngo_id` is doubly optional: the outer level distinguishes
/// "absent from the request" from an explicit `null` that clears the
/// assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPatch {
    pub animal_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub urgency: Option<Urgency>,
    pub status: Option<ReportStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub assigned_ngo_id: Option<Option<OrgId>>,
}

/// Raw create payload as it arrives on the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    pub animal_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub urgency: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<CoordinateValue>,
    pub longitude: Option<CoordinateValue>,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
    pub assigned_ngo_id: Option<String>,
}

/// Raw update payload. Every field is optional; `assigned_ngo_id` keeps an
/// explicit `null` distinct from absence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatchRequest {
    pub animal_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub urgency: Option<String>,
    pub status: Option<String>,
    pub latitude: Option<CoordinateValue>,
    pub longitude: Option<CoordinateValue>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_ngo_id: Option<Option<String>>,
}

/// Coordinates arrive either as JSON numbers or as numeric strings from form
/// frontends; both are accepted at the boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
