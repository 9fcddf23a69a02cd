//! Core library for the pawhaven rescue platform: configuration, telemetry,
//! and the rescue-report intake and triage workflow.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
