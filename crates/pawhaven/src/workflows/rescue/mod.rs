//! Rescue operations: report intake, triage, and responder coordination.

pub mod reports;
