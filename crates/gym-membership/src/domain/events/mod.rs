//! Domain Events
//!
//! Raised by the application services after a record mutation commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::EntityId;

/// All domain events in the membership bounded context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MembershipEvent {
    Enrolled {
        record_id: EntityId,
        member_id: EntityId,
        plan_id: EntityId,
        expires_at: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },

    Frozen {
        record_id: EntityId,
        planned_months: u32,
        chargeable: bool,
        occurred_at: DateTime<Utc>,
    },

    Unfrozen {
        record_id: EntityId,
        credited_days: i64,
        expires_at: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },

    DaysGifted {
        record_id: EntityId,
        days: u32,
        expires_at: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },

    BenefitRedeemed {
        record_id: EntityId,
        benefit_id: EntityId,
        count_in_period: u32,
        occurred_at: DateTime<Utc>,
    },
}

impl MembershipEvent {
    /// Get the record this event belongs to
    pub fn record_id(&self) -> &EntityId {
        match self {
            Self::Enrolled { record_id, .. }
            | Self::Frozen { record_id, .. }
            | Self::Unfrozen { record_id, .. }
            | Self::DaysGifted { record_id, .. }
            | Self::BenefitRedeemed { record_id, .. } => record_id,
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Enrolled { .. } => "membership.enrolled",
            Self::Frozen { .. } => "membership.frozen",
            Self::Unfrozen { .. } => "membership.unfrozen",
            Self::DaysGifted { .. } => "membership.days_gifted",
            Self::BenefitRedeemed { .. } => "membership.benefit_redeemed",
        }
    }
}
