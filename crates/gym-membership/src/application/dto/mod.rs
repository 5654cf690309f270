//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{EffectiveStatus, MembershipRecord};
use crate::domain::value_objects::{EntityId, Gender, Remaining};

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollCommand {
    pub organization_id: EntityId,
    pub member_id: EntityId,
    pub plan_id: EntityId,
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeCommand {
    pub record_id: EntityId,
    pub duration_months: u32,
    pub reason: String,
    pub chargeable: bool,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftDaysCommand {
    pub record_id: EntityId,
    pub days: i64,
    pub note: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemCommand {
    pub record_id: EntityId,
    pub benefit_id: EntityId,
    /// When known, checked against the benefit's gender scope
    pub gender: Option<Gender>,
    pub now: DateTime<Utc>,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub record_id: EntityId,
    pub member_id: EntityId,
    pub plan_id: EntityId,
    pub status: EffectiveStatus,
    pub current_expiry: DateTime<Utc>,
    pub days_remaining: i64,
    pub frozen_days_credited: i64,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    pub record_id: EntityId,
    pub benefit_id: EntityId,
    pub count_in_period: u32,
    pub remaining: Remaining,
    pub redeemed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitCheck {
    pub benefit_id: EntityId,
    pub allowed: bool,
    pub remaining: Remaining,
}

/// Short listing row for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSummary {
    pub record_id: EntityId,
    pub member_id: EntityId,
    pub plan_id: EntityId,
    pub status: EffectiveStatus,
    pub current_expiry: DateTime<Utc>,
}

impl MembershipSummary {
    pub fn of(record: &MembershipRecord, now: DateTime<Utc>) -> Self {
        Self {
            record_id: record.id().clone(),
            member_id: record.member_id().clone(),
            plan_id: record.plan_id().clone(),
            status: record.effective_status(now),
            current_expiry: record.current_expiry(),
        }
    }
}
