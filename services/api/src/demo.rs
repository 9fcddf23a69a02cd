use crate::infra::{InMemoryDirectory, InMemoryNotificationQueue, InMemoryReportRepository};
use clap::Args;
use std::sync::Arc;

use pawhaven::error::AppError;
use pawhaven::workflows::rescue::reports::{
    ReportPatchRequest, ReportQuery, ReportSubmission, ReportTriageService, TriageConfig,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the status-transition portion of the walkthrough
    #[arg(long)]
    pub(crate) skip_triage: bool,
}

const DEMO_USER: &str = "demo-reporter";
const DEMO_NGO: &str = "demo-rescue-ngo";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryReportRepository::default());
    let directory = Arc::new(InMemoryDirectory::default());
    directory.register_user(DEMO_USER);
    directory.register_organization(DEMO_NGO);
    let notifications = Arc::new(InMemoryNotificationQueue::default());
    let service = ReportTriageService::new(
        repository,
        directory,
        notifications.clone(),
        TriageConfig::default(),
    );

    println!("Rescue report intake demo");

    let attributed = ReportSubmission {
        animal_type: Some("dog".to_string()),
        location: Some("Park St".to_string()),
        description: Some("injured leg, not moving much".to_string()),
        phone: Some("9876543210".to_string()),
        email: Some("reporter@example.com".to_string()),
        user_id: Some(DEMO_USER.to_string()),
        ..ReportSubmission::default()
    };
    let report = match service.create(attributed) {
        Ok(report) => report,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "  Accepted report {} ({} at {}, urgency {})",
        report.id,
        report.animal_type,
        report.location,
        report.urgency.label()
    );

    let anonymous = ReportSubmission {
        animal_type: Some("cat".to_string()),
        location: Some("Riverside Market".to_string()),
        description: Some("kitten stuck on a ledge".to_string()),
        phone: Some("+91-9123456780".to_string()),
        email: Some("passerby@example.com".to_string()),
        urgency: Some("critical".to_string()),
        ..ReportSubmission::default()
    };
    match service.create(anonymous) {
        Ok(report) => println!(
            "  Accepted anonymous report {} (urgency {})",
            report.id,
            report.urgency.label()
        ),
        Err(err) => println!("  Submission rejected: {err}"),
    }

    if !args.skip_triage {
        println!("\nTriage walkthrough");
        let assignment = ReportPatchRequest {
            status: Some("in_progress".to_string()),
            assigned_ngo_id: Some(Some(DEMO_NGO.to_string())),
            ..ReportPatchRequest::default()
        };
        match service.update(&report.id, assignment) {
            Ok(updated) => println!(
                "  Report {} moved to {} (assigned to {})",
                updated.id,
                updated.status.label(),
                updated
                    .assigned_ngo_id
                    .as_ref()
                    .map(|id| id.0.as_str())
                    .unwrap_or("nobody")
            ),
            Err(err) => println!("  Update rejected: {err}"),
        }

        let resolution = ReportPatchRequest {
            status: Some("resolved".to_string()),
            ..ReportPatchRequest::default()
        };
        match service.update(&report.id, resolution) {
            Ok(updated) => println!("  Report {} {}", updated.id, updated.status.label()),
            Err(err) => println!("  Update rejected: {err}"),
        }
    }

    println!("\nTriage listing (urgency first, newest first)");
    match service.list(ReportQuery::default()) {
        Ok(reports) => {
            for report in reports {
                println!(
                    "  [{}] {} at {} ({})",
                    report.urgency.label(),
                    report.animal_type,
                    report.location,
                    report.status.label()
                );
            }
        }
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    let queued = notifications.records();
    if queued.is_empty() {
        println!("\nQueued notifications: none");
    } else {
        println!("\nQueued notifications:");
        for record in queued {
            println!(
                "  -> {} [{}] {}",
                record.recipient_email,
                record.notification_type.label(),
                record.subject
            );
        }
    }

    Ok(())
}
