//! Billing intervals, renewal periods and calendar arithmetic

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MembershipError;

/// How often a plan bills, which also fixes the initial membership window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Quarterly,
    Yearly,
    Lifetime,
}

impl BillingInterval {
    /// Calendar months covered by one billing cycle; `None` for lifetime plans.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
            Self::Lifetime => None,
        }
    }

    /// End of a membership window that starts at `start`
    pub fn window_end(
        &self,
        start: DateTime<Utc>,
        lifetime_horizon_years: u32,
    ) -> Result<DateTime<Utc>, MembershipError> {
        let months = self
            .months()
            .unwrap_or_else(|| lifetime_horizon_years.saturating_mul(12));
        add_months(start, months)
    }
}

/// When a benefit's usage counter starts over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalPeriod {
    Monthly,
    Yearly,
    Lifetime,
}

impl RenewalPeriod {
    /// First instant at which a period opened at `period_start` has rolled over.
    ///
    /// `None` means the period never rolls over.
    pub fn boundary_after(&self, period_start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Monthly => period_start.checked_add_months(Months::new(1)),
            Self::Yearly => period_start.checked_add_months(Months::new(12)),
            Self::Lifetime => None,
        }
    }

    /// True once `now` has crossed the boundary following `period_start`
    pub fn has_rolled_over(&self, period_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.boundary_after(period_start)
            .map(|boundary| now >= boundary)
            .unwrap_or(false)
    }
}

/// Calendar-month addition, clamping to the end of shorter months
pub fn add_months(at: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>, MembershipError> {
    at.checked_add_months(Months::new(months))
        .ok_or_else(|| MembershipError::InvalidArgument(format!("date overflow adding {} months", months)))
}

/// Whole-day addition
pub fn add_days(at: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, MembershipError> {
    Duration::try_days(days)
        .and_then(|d| at.checked_add_signed(d))
        .ok_or_else(|| MembershipError::InvalidArgument(format!("date overflow adding {} days", days)))
}

/// Whole days from `from` to `to`, truncating partial days
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}
