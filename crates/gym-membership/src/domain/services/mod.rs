//! Domain services module
//!
//! Stateless and synchronous. Every function takes `now` explicitly.

pub mod lifecycle;
pub mod quota_enforcer;
pub mod validation;

pub use lifecycle::LifecycleEngine;
pub use quota_enforcer::{BenefitBalance, BenefitDecision, QuotaEnforcer};
pub use validation::{ensure_valid, validate_plan, PlanViolation};
