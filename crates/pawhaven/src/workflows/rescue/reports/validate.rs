use std::sync::OnceLock;

use regex::Regex;

use super::domain::{
    CoordinateValue, NewReport, OrgId, ReportPatch, ReportPatchRequest, ReportStatus,
    ReportSubmission, Urgency, UserId,
};

/// Validation failures raised at the intake boundary. Every variant carries a
/// stable machine-readable code so clients can branch without string-matching.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("animal type is required")]
    MissingAnimalType,
    #[error("location is required")]
    MissingLocation,
    #[error("description is required")]
    MissingDescription,
    #[error("phone number is required")]
    MissingPhone,
    #[error("email address is required")]
    MissingEmail,
    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },
    #[error("'{value}' is not a valid mobile number")]
    InvalidPhone { value: String },
    #[error("'{value}' is not a valid urgency (expected low, medium, high, or critical)")]
    InvalidUrgency { value: String },
    #[error("'{value}' is not a valid status (expected pending, in_progress, or resolved)")]
    InvalidStatus { value: String },
    #[error("'{value}' is not a valid latitude")]
    InvalidLatitude { value: String },
    #[error("'{value}' is not a valid longitude")]
    InvalidLongitude { value: String },
    #[error("user '{id}' does not exist")]
    UserNotFound { id: UserId },
    #[error("organization '{id}' does not exist")]
    OrganizationNotFound { id: OrgId },
}

impl ValidationError {
    pub const fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingAnimalType => "MISSING_ANIMAL_TYPE",
            ValidationError::MissingLocation => "MISSING_LOCATION",
            ValidationError::MissingDescription => "MISSING_DESCRIPTION",
            ValidationError::MissingPhone => "MISSING_PHONE",
            ValidationError::MissingEmail => "MISSING_EMAIL",
            ValidationError::InvalidEmail { .. } => "INVALID_EMAIL",
            ValidationError::InvalidPhone { .. } => "INVALID_PHONE",
            ValidationError::InvalidUrgency { .. } => "INVALID_URGENCY",
            ValidationError::InvalidStatus { .. } => "INVALID_STATUS",
            ValidationError::InvalidLatitude { .. } => "INVALID_LATITUDE",
            ValidationError::InvalidLongitude { .. } => "INVALID_LONGITUDE",
            ValidationError::UserNotFound { .. } => "USER_NOT_FOUND",
            ValidationError::OrganizationNotFound { .. } => "NGO_NOT_FOUND",
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

// Regional mobile numbering: ten digits with a restricted leading digit,
// optionally prefixed with the country code.
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\+?91)?[6-9][0-9]{9}$").expect("valid phone pattern"))
}

fn required_text(
    value: Option<String>,
    missing: ValidationError,
) -> Result<String, ValidationError> {
    match value {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(missing)
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Err(missing),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn checked_email(value: String) -> Result<String, ValidationError> {
    if email_pattern().is_match(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidEmail { value })
    }
}

fn checked_phone(value: String) -> Result<String, ValidationError> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != '-')
        .collect();
    if phone_pattern().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::InvalidPhone { value })
    }
}

fn parse_urgency(value: Option<String>) -> Result<Option<Urgency>, ValidationError> {
    match optional_text(value) {
        Some(raw) => Urgency::parse(&raw)
            .map(Some)
            .ok_or(ValidationError::InvalidUrgency { value: raw }),
        None => Ok(None),
    }
}

fn parse_status(value: Option<String>) -> Result<Option<ReportStatus>, ValidationError> {
    match optional_text(value) {
        Some(raw) => ReportStatus::parse(&raw)
            .map(Some)
            .ok_or(ValidationError::InvalidStatus { value: raw }),
        None => Ok(None),
    }
}

fn parse_coordinate(
    value: Option<CoordinateValue>,
    invalid: fn(String) -> ValidationError,
) -> Result<Option<f64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(CoordinateValue::Number(n)) if n.is_finite() => Ok(Some(n)),
        Some(CoordinateValue::Number(n)) => Err(invalid(n.to_string())),
        Some(CoordinateValue::Text(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(invalid(raw)),
            }
        }
    }
}

/// Normalize a raw submission into a creation record, or fail with the first
/// violated rule. Referential checks against the user/organization directory
/// are the caller's responsibility; this function is pure.
pub fn validate_submission(submission: ReportSubmission) -> Result<NewReport, ValidationError> {
    let animal_type = required_text(
        submission.animal_type,
        ValidationError::MissingAnimalType,
    )?;
    let location = required_text(submission.location, ValidationError::MissingLocation)?;
    let description = required_text(submission.description, ValidationError::MissingDescription)?;
    let phone = checked_phone(required_text(
        submission.phone,
        ValidationError::MissingPhone,
    )?)?;
    let email = checked_email(required_text(
        submission.email,
        ValidationError::MissingEmail,
    )?)?;

    let urgency = parse_urgency(submission.urgency)?.unwrap_or_default();
    let status = parse_status(submission.status)?.unwrap_or_default();
    let latitude = parse_coordinate(submission.latitude, |value| {
        ValidationError::InvalidLatitude { value }
    })?;
    let longitude = parse_coordinate(submission.longitude, |value| {
        ValidationError::InvalidLongitude { value }
    })?;

    Ok(NewReport {
        animal_type,
        location,
        description,
        phone,
        email,
        urgency,
        status,
        latitude,
        longitude,
        image_url: optional_text(submission.image_url),
        user_id: optional_text(submission.user_id).map(UserId),
        assigned_ngo_id: optional_text(submission.assigned_ngo_id).map(OrgId),
    })
}

/// Validate a raw partial update. Only supplied fields are checked; supplied
/// core fields must still be non-empty and well-formed.
pub fn validate_patch(request: ReportPatchRequest) -> Result<ReportPatch, ValidationError> {
    let animal_type = request
        .animal_type
        .map(|raw| required_text(Some(raw), ValidationError::MissingAnimalType))
        .transpose()?;
    let location = request
        .location
        .map(|raw| required_text(Some(raw), ValidationError::MissingLocation))
        .transpose()?;
    let description = request
        .description
        .map(|raw| required_text(Some(raw), ValidationError::MissingDescription))
        .transpose()?;
    let phone = request
        .phone
        .map(|raw| required_text(Some(raw), ValidationError::MissingPhone).and_then(checked_phone))
        .transpose()?;
    let email = request
        .email
        .map(|raw| required_text(Some(raw), ValidationError::MissingEmail).and_then(checked_email))
        .transpose()?;

    let urgency = parse_urgency(request.urgency)?;
    let status = parse_status(request.status)?;
    let latitude = parse_coordinate(request.latitude, |value| ValidationError::InvalidLatitude {
        value,
    })?;
    let longitude = parse_coordinate(request.longitude, |value| {
        ValidationError::InvalidLongitude { value }
    })?;

    let assigned_ngo_id = request
        .assigned_ngo_id
        .map(|inner| optional_text(inner).map(OrgId));

    Ok(ReportPatch {
        animal_type,
        location,
        description,
        phone,
        email,
        urgency,
        status,
        latitude,
        longitude,
        image_url: optional_text(request.image_url),
        assigned_ngo_id,
    })
}
