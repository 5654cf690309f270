//! Application layer
//!
//! Orchestrates use cases and coordinates domain objects.

pub mod commands;
pub mod dto;

pub use commands::{EnrollmentService, MembershipService, RedemptionService};
pub use dto::*;
