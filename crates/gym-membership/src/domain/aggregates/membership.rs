//! Membership Record Aggregate
//!
//! One member's subscription instance. Records are never deleted; they stay
//! for audit after they lapse.
//!
//! # Invariants
//! - `current_expiry >= join_date`
//! - stored status `Frozen` iff exactly one freeze event is still open
//! - "expired" is never stored, see [`MembershipRecord::effective_status`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::plan::MembershipPlan;
use crate::domain::value_objects::{add_months, EntityId};
use crate::error::MembershipError;

/// Persisted status. Expiry is derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredStatus {
    Active,
    Frozen,
}

/// Read-time status projection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Active,
    Frozen,
    Expired,
}

impl std::fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Frozen => write!(f, "Frozen"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeEvent {
    pub start: DateTime<Utc>,
    pub planned_duration_months: u32,
    pub reason: String,
    pub chargeable: bool,
    pub actual_end: Option<DateTime<Utc>>,
    /// Days added to the expiry when the freeze was closed
    pub credited_days: Option<i64>,
}

impl FreezeEvent {
    pub fn is_open(&self) -> bool {
        self.actual_end.is_none()
    }

    /// When the freeze was scheduled to end
    pub fn planned_end(&self) -> Result<DateTime<Utc>, MembershipError> {
        add_months(self.start, self.planned_duration_months)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftEvent {
    pub days: u32,
    pub note: String,
    pub granted_at: DateTime<Utc>,
}

/// Consumption counter of one benefit in its current renewal period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitUsage {
    pub count_in_period: u32,
    pub period_start: DateTime<Utc>,
}

impl BenefitUsage {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count_in_period: 0,
            period_start: now,
        }
    }
}

/// Membership record aggregate root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub(crate) id: EntityId,
    pub(crate) organization_id: EntityId,
    pub(crate) member_id: EntityId,
    pub(crate) plan_id: EntityId,
    pub(crate) stored_status: StoredStatus,
    pub(crate) join_date: DateTime<Utc>,
    pub(crate) current_expiry: DateTime<Utc>,
    #[serde(default)]
    pub(crate) freeze_history: Vec<FreezeEvent>,
    #[serde(default)]
    pub(crate) gift_history: Vec<GiftEvent>,
    #[serde(default)]
    pub(crate) benefit_usage: BTreeMap<EntityId, BenefitUsage>,
    #[serde(default)]
    pub(crate) version: u64,
}

impl MembershipRecord {
    /// Create the record for a new enrollment
    pub fn enroll(
        organization_id: EntityId,
        member_id: EntityId,
        plan: &MembershipPlan,
        join_date: DateTime<Utc>,
        lifetime_horizon_years: u32,
    ) -> Result<Self, MembershipError> {
        let current_expiry = plan.expiry_from(join_date, lifetime_horizon_years)?;
        Ok(Self {
            id: EntityId::new(),
            organization_id,
            member_id,
            plan_id: plan.id.clone(),
            stored_status: StoredStatus::Active,
            join_date,
            current_expiry,
            freeze_history: Vec::new(),
            gift_history: Vec::new(),
            benefit_usage: BTreeMap::new(),
            version: 0,
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn organization_id(&self) -> &EntityId { &self.organization_id }
    pub fn member_id(&self) -> &EntityId { &self.member_id }
    pub fn plan_id(&self) -> &EntityId { &self.plan_id }
    pub fn stored_status(&self) -> StoredStatus { self.stored_status }
    pub fn join_date(&self) -> DateTime<Utc> { self.join_date }
    pub fn current_expiry(&self) -> DateTime<Utc> { self.current_expiry }
    pub fn freeze_history(&self) -> &[FreezeEvent] { &self.freeze_history }
    pub fn gift_history(&self) -> &[GiftEvent] { &self.gift_history }
    pub fn version(&self) -> u64 { self.version }

    pub fn usage_of(&self, benefit_id: &EntityId) -> Option<&BenefitUsage> {
        self.benefit_usage.get(benefit_id)
    }

    pub fn benefit_usage(&self) -> &BTreeMap<EntityId, BenefitUsage> {
        &self.benefit_usage
    }

    /// The freeze event still awaiting unfreeze, if any
    pub fn open_freeze(&self) -> Option<&FreezeEvent> {
        self.freeze_history.iter().rev().find(|f| f.is_open())
    }

    /// The sole authority on whether a membership is active right now.
    pub fn effective_status(&self, now: DateTime<Utc>) -> EffectiveStatus {
        match self.stored_status {
            StoredStatus::Frozen => EffectiveStatus::Frozen,
            StoredStatus::Active if now > self.current_expiry => EffectiveStatus::Expired,
            StoredStatus::Active => EffectiveStatus::Active,
        }
    }

    /// Check the structural invariants
    pub fn check_invariants(&self) -> Result<(), MembershipError> {
        if self.current_expiry < self.join_date {
            return Err(MembershipError::InvalidArgument(format!(
                "record {}: expiry precedes join date",
                self.id
            )));
        }
        let open = self.freeze_history.iter().filter(|f| f.is_open()).count();
        let expected = match self.stored_status {
            StoredStatus::Frozen => 1,
            StoredStatus::Active => 0,
        };
        if open != expected {
            return Err(MembershipError::InvalidArgument(format!(
                "record {}: {:?} with {} open freeze events",
                self.id, self.stored_status, open
            )));
        }
        Ok(())
    }

    /// Advance the optimistic version; called by repositories on a successful save
    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::BillingInterval;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn create_test_record() -> MembershipRecord {
        let plan = MembershipPlan::new("monthly", "Monthly", dec!(40), BillingInterval::Monthly);
        let join = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        MembershipRecord::enroll(EntityId::new(), EntityId::new(), &plan, join, 100).unwrap()
    }

    #[test]
    fn test_enrollment() {
        let record = create_test_record();
        assert_eq!(record.stored_status(), StoredStatus::Active);
        assert_eq!(record.current_expiry(), Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap());
        assert_eq!(record.version(), 0);
        assert!(record.check_invariants().is_ok());
    }

    #[test]
    fn test_effective_status_at_expiry_instant() {
        let record = create_test_record();
        let expiry = record.current_expiry();

        assert_eq!(record.effective_status(expiry), EffectiveStatus::Active);
        assert_eq!(
            record.effective_status(expiry + Duration::nanoseconds(1)),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_frozen_without_open_event_breaks_invariant() {
        let mut record = create_test_record();
        record.stored_status = StoredStatus::Frozen;
        assert!(record.check_invariants().is_err());
        assert_eq!(record.effective_status(record.join_date()), EffectiveStatus::Frozen);
    }
}
