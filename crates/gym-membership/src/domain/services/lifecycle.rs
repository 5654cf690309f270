//! Membership Lifecycle
//!
//! State transitions and date arithmetic for freeze, unfreeze and gift days.
//!
//! ```text
//!            freeze                 time passes
//!   Active ─────────► Frozen    Active ─────────► Expired (derived)
//!          ◄─────────
//!           unfreeze
//! ```
//!
//! Every operation takes the prior record and returns a new one; the input is
//! left untouched so a failed call needs no rollback.

use chrono::{DateTime, Utc};

use crate::config::{EngineConfig, FreezeCreditPolicy, GIFT_DAYS_CEILING};
use crate::domain::aggregates::{
    EffectiveStatus, FreezeEvent, GiftEvent, MembershipRecord, StoredStatus,
};
use crate::domain::value_objects::{add_days, add_months, whole_days_between};
use crate::error::MembershipError;

/// Lifecycle engine
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine {
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Suspend an active membership. The expiry moves only at unfreeze.
    pub fn freeze(
        &self,
        record: &MembershipRecord,
        duration_months: u32,
        reason: impl Into<String>,
        chargeable: bool,
        now: DateTime<Utc>,
    ) -> Result<MembershipRecord, MembershipError> {
        match record.effective_status(now) {
            EffectiveStatus::Active => {}
            EffectiveStatus::Frozen => {
                return Err(MembershipError::InvalidTransition(format!(
                    "record {} is already frozen",
                    record.id()
                )))
            }
            EffectiveStatus::Expired => {
                return Err(MembershipError::InvalidTransition(format!(
                    "record {} expired at {}",
                    record.id(),
                    record.current_expiry()
                )))
            }
        }

        if duration_months == 0 {
            return Err(MembershipError::InvalidArgument(
                "freeze duration must be at least one month".into(),
            ));
        }

        let mut next = record.clone();
        next.freeze_history.push(FreezeEvent {
            start: now,
            planned_duration_months: duration_months,
            reason: reason.into(),
            chargeable,
            actual_end: None,
            credited_days: None,
        });
        next.stored_status = StoredStatus::Frozen;
        Ok(next)
    }

    /// Resume a frozen membership and credit the frozen time onto the expiry
    pub fn unfreeze(
        &self,
        record: &MembershipRecord,
        now: DateTime<Utc>,
    ) -> Result<MembershipRecord, MembershipError> {
        if record.stored_status() != StoredStatus::Frozen {
            return Err(MembershipError::InvalidTransition(format!(
                "record {} is not frozen",
                record.id()
            )));
        }

        let mut next = record.clone();
        let event = next
            .freeze_history
            .iter_mut()
            .rev()
            .find(|f| f.is_open())
            .ok_or_else(|| {
                MembershipError::InvalidTransition(format!(
                    "record {} is frozen without an open freeze event",
                    record.id()
                ))
            })?;

        if now < event.start {
            return Err(MembershipError::InvalidArgument(format!(
                "unfreeze at {} precedes freeze start {}",
                now, event.start
            )));
        }

        let (new_expiry, credited_days) = match self.config.freeze_credit_policy {
            FreezeCreditPolicy::ElapsedTime => {
                let days = whole_days_between(event.start, now);
                (add_days(next.current_expiry, days)?, days)
            }
            FreezeCreditPolicy::PlannedDuration => {
                let expiry = add_months(next.current_expiry, event.planned_duration_months)?;
                (expiry, whole_days_between(next.current_expiry, expiry))
            }
        };

        event.actual_end = Some(now);
        event.credited_days = Some(credited_days);
        next.current_expiry = new_expiry;
        next.stored_status = StoredStatus::Active;
        Ok(next)
    }

    /// Extend the expiry unconditionally. Stored status is not touched, so
    /// gifting never revives a frozen or expired record.
    pub fn gift_days(
        &self,
        record: &MembershipRecord,
        days: i64,
        note: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<MembershipRecord, MembershipError> {
        if days <= 0 {
            return Err(MembershipError::InvalidArgument(format!(
                "gift days must be positive, got {}",
                days
            )));
        }
        let ceiling = self.config.max_gift_days.min(GIFT_DAYS_CEILING);
        if days > i64::from(ceiling) {
            return Err(MembershipError::LimitExceeded(format!(
                "gift of {} days exceeds the {} day ceiling",
                days, ceiling
            )));
        }

        let mut next = record.clone();
        next.current_expiry = add_days(record.current_expiry(), days)?;
        next.gift_history.push(GiftEvent {
            days: days as u32,
            note: note.into(),
            granted_at: now,
        });
        Ok(next)
    }

    pub fn effective_status(&self, record: &MembershipRecord, now: DateTime<Utc>) -> EffectiveStatus {
        record.effective_status(now)
    }

    /// Whole days left in the membership window.
    ///
    /// Frozen records report the window as it stood when the freeze began.
    pub fn days_remaining(&self, record: &MembershipRecord, now: DateTime<Utc>) -> i64 {
        let reference = match record.open_freeze() {
            Some(freeze) => freeze.start,
            None => now,
        };
        whole_days_between(reference, record.current_expiry()).max(0)
    }

    /// Days credited by all completed freezes
    pub fn total_frozen_days(&self, record: &MembershipRecord) -> i64 {
        record
            .freeze_history()
            .iter()
            .filter_map(|f| f.credited_days)
            .sum()
    }
}
