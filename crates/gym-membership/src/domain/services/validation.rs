//! Plan validation
//!
//! Collects every problem with a plan instead of stopping at the first one,
//! so an editor can show them all.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::domain::aggregates::{BenefitCatalog, MembershipPlan, ResourceKind};
use crate::domain::value_objects::{EntityId, Quota};
use crate::error::{ErrorKind, MembershipError};

/// A single reason a plan is unacceptable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanViolation {
    #[error("plan name is blank")]
    BlankName,

    #[error("price {0} is negative")]
    NegativePrice(Decimal),

    #[error("{field} has a cap of 0; use a positive cap or unlimited")]
    ZeroCap { field: String },

    #[error("no limit declared for {0}")]
    MissingOrgLimit(ResourceKind),

    #[error("benefit {0} does not exist")]
    UnknownBenefit(EntityId),

    #[error("benefit {0} is inactive")]
    InactiveBenefit(EntityId),

    #[error("benefit {0} is granted more than once")]
    DuplicateBenefit(EntityId),
}

impl PlanViolation {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownBenefit(_) => ErrorKind::NotFound,
            _ => ErrorKind::InvalidArgument,
        }
    }

    pub fn into_error(self) -> MembershipError {
        match self.kind() {
            ErrorKind::NotFound => MembershipError::NotFound(self.to_string()),
            _ => MembershipError::InvalidArgument(self.to_string()),
        }
    }
}

/// Validate a plan against the organization's benefit catalog
pub fn validate_plan(plan: &MembershipPlan, catalog: &BenefitCatalog) -> Vec<PlanViolation> {
    let mut violations = Vec::new();

    if plan.name.trim().is_empty() {
        violations.push(PlanViolation::BlankName);
    }

    if plan.price < Decimal::ZERO {
        violations.push(PlanViolation::NegativePrice(plan.price));
    }

    for kind in ResourceKind::ALL {
        match plan.org_limits.get(&kind) {
            None => violations.push(PlanViolation::MissingOrgLimit(kind)),
            Some(quota) => check_cap(quota, || format!("org limit {}", kind), &mut violations),
        }
    }

    for (kind, quota) in &plan.ops_limits {
        check_cap(quota, || format!("ops limit {}", kind), &mut violations);
    }

    let mut seen = HashSet::new();
    for grant in &plan.benefit_grants {
        if !seen.insert(&grant.benefit_id) {
            violations.push(PlanViolation::DuplicateBenefit(grant.benefit_id.clone()));
            continue;
        }

        match catalog.get(&grant.benefit_id) {
            None => violations.push(PlanViolation::UnknownBenefit(grant.benefit_id.clone())),
            Some(benefit) if !benefit.active => {
                violations.push(PlanViolation::InactiveBenefit(grant.benefit_id.clone()))
            }
            Some(_) => {}
        }

        check_cap(
            &grant.quota,
            || format!("benefit {} quota", grant.benefit_id),
            &mut violations,
        );
    }

    violations
}

/// `Ok` for a valid plan, otherwise the first violation as an error
pub fn ensure_valid(plan: &MembershipPlan, catalog: &BenefitCatalog) -> Result<(), MembershipError> {
    match validate_plan(plan, catalog).into_iter().next() {
        Some(violation) => Err(violation.into_error()),
        None => Ok(()),
    }
}

fn check_cap(quota: &Quota, field: impl FnOnce() -> String, violations: &mut Vec<PlanViolation>) {
    if quota.validate().is_err() {
        violations.push(PlanViolation::ZeroCap { field: field() });
    }
}
