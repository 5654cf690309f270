//! Quota Enforcement
//!
//! Pure decision functions: provisioning against plan ceilings and benefit
//! consumption against per-period grants. Callers own the transaction that
//! makes check-then-act atomic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::aggregates::{BenefitGrant, BenefitUsage, MembershipPlan, MembershipRecord};
use crate::domain::value_objects::{EntityId, Quota, RenewalPeriod, Remaining};
use crate::error::MembershipError;

/// Outcome of a benefit consumption check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitDecision {
    pub allowed: bool,
    /// Units left after this consumption (0 when denied)
    pub remaining: Remaining,
    /// Usage after period normalization, before any increment
    pub usage: BenefitUsage,
}

/// Remaining balance of one granted benefit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitBalance {
    pub benefit_id: EntityId,
    pub quota: Quota,
    pub renewal_period: RenewalPeriod,
    pub used_in_period: u32,
    pub remaining: Remaining,
    pub period_start: DateTime<Utc>,
}

/// Quota enforcer
pub struct QuotaEnforcer;

impl QuotaEnforcer {
    /// True iff one more `kind` may be provisioned on top of `current_count`.
    ///
    /// The cap is an exclusive ceiling; a kind with no declared limit is not
    /// provisionable.
    pub fn can_provision<K: Ord>(limits: &BTreeMap<K, Quota>, current_count: u32, kind: &K) -> bool {
        limits
            .get(kind)
            .map(|quota| quota.admits(current_count))
            .unwrap_or(false)
    }

    /// Usage with the renewal period applied: a counter whose period has
    /// rolled over by `now` starts again from zero at `now`.
    pub fn normalize_usage(
        grant: &BenefitGrant,
        usage: Option<&BenefitUsage>,
        now: DateTime<Utc>,
    ) -> BenefitUsage {
        match usage {
            Some(usage) if !grant.renewal_period.has_rolled_over(usage.period_start, now) => *usage,
            _ => BenefitUsage::fresh(now),
        }
    }

    /// Decide whether one more unit of a benefit may be consumed
    pub fn check_benefit(
        grant: &BenefitGrant,
        usage: Option<&BenefitUsage>,
        now: DateTime<Utc>,
    ) -> BenefitDecision {
        let usage = Self::normalize_usage(grant, usage, now);

        match grant.quota {
            Quota::Unlimited => BenefitDecision {
                allowed: true,
                remaining: Remaining::Unlimited,
                usage,
            },
            Quota::Capped(cap) => {
                let allowed = usage.count_in_period < cap;
                let remaining = if allowed {
                    cap - usage.count_in_period - 1
                } else {
                    0
                };
                BenefitDecision {
                    allowed,
                    remaining: Remaining::Count(remaining),
                    usage,
                }
            }
        }
    }

    /// Check and increment in one step. The counter only moves when allowed.
    pub fn consume_benefit(
        grant: &BenefitGrant,
        usage: Option<&BenefitUsage>,
        now: DateTime<Utc>,
    ) -> Result<(BenefitUsage, Remaining), MembershipError> {
        let decision = Self::check_benefit(grant, usage, now);
        if !decision.allowed {
            return Err(MembershipError::LimitExceeded(format!(
                "benefit {} exhausted for the current {:?} period",
                grant.benefit_id, grant.renewal_period
            )));
        }

        // allowed capped grants sit strictly below the cap; unlimited ones pin at MAX
        let mut usage = decision.usage;
        usage.count_in_period = usage.count_in_period.saturating_add(1);
        Ok((usage, decision.remaining))
    }

    /// Apply [`Self::consume_benefit`] to a record, returning the updated copy
    pub fn redeem(
        record: &MembershipRecord,
        grant: &BenefitGrant,
        now: DateTime<Utc>,
    ) -> Result<(MembershipRecord, Remaining), MembershipError> {
        let (usage, remaining) = Self::consume_benefit(grant, record.usage_of(&grant.benefit_id), now)?;
        let mut next = record.clone();
        next.benefit_usage.insert(grant.benefit_id.clone(), usage);
        Ok((next, remaining))
    }

    /// Normalized balance of every benefit the plan grants
    pub fn benefit_balances(
        plan: &MembershipPlan,
        record: &MembershipRecord,
        now: DateTime<Utc>,
    ) -> Vec<BenefitBalance> {
        plan.benefit_grants
            .iter()
            .map(|grant| {
                let usage = Self::normalize_usage(grant, record.usage_of(&grant.benefit_id), now);
                let remaining = match grant.quota {
                    Quota::Unlimited => Remaining::Unlimited,
                    Quota::Capped(cap) => Remaining::Count(cap.saturating_sub(usage.count_in_period)),
                };
                BenefitBalance {
                    benefit_id: grant.benefit_id.clone(),
                    quota: grant.quota,
                    renewal_period: grant.renewal_period,
                    used_in_period: usage.count_in_period,
                    remaining,
                    period_start: usage.period_start,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ResourceKind;
    use crate::domain::value_objects::BillingInterval;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn sauna(quota: Quota, period: RenewalPeriod) -> BenefitGrant {
        BenefitGrant::new("sauna", quota, period)
    }

    #[test]
    fn test_cap_is_exclusive_ceiling() {
        let limits: BTreeMap<_, _> = [(ResourceKind::Trainers, Quota::Capped(5))].into();

        assert!(QuotaEnforcer::can_provision(&limits, 4, &ResourceKind::Trainers));
        assert!(!QuotaEnforcer::can_provision(&limits, 5, &ResourceKind::Trainers));
        assert!(!QuotaEnforcer::can_provision(&limits, 0, &ResourceKind::Branches));
    }

    #[test]
    fn test_monthly_cap_of_four() {
        let grant = sauna(Quota::Capped(4), RenewalPeriod::Monthly);
        let start = at(2024, 1, 10);
        let mut usage = None;

        for expected_remaining in [3, 2, 1, 0] {
            let (next, remaining) = QuotaEnforcer::consume_benefit(&grant, usage.as_ref(), start).unwrap();
            assert_eq!(remaining, Remaining::Count(expected_remaining));
            usage = Some(next);
        }
        assert_eq!(usage.unwrap().count_in_period, 4);

        let decision = QuotaEnforcer::check_benefit(&grant, usage.as_ref(), start + Duration::days(3));
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, Remaining::Count(0));

        let err = QuotaEnforcer::consume_benefit(&grant, usage.as_ref(), start + Duration::days(3)).unwrap_err();
        assert!(matches!(err, MembershipError::LimitExceeded(_)));

        let after_boundary = at(2024, 2, 10);
        let (next, _) = QuotaEnforcer::consume_benefit(&grant, usage.as_ref(), after_boundary).unwrap();
        assert_eq!(next.count_in_period, 1);
        assert_eq!(next.period_start, after_boundary);
    }

    #[test]
    fn test_yearly_and_lifetime_rollover() {
        let used_up = BenefitUsage { count_in_period: 2, period_start: at(2024, 6, 1) };

        let yearly = sauna(Quota::Capped(2), RenewalPeriod::Yearly);
        assert!(!QuotaEnforcer::check_benefit(&yearly, Some(&used_up), at(2025, 5, 31)).allowed);
        assert!(QuotaEnforcer::check_benefit(&yearly, Some(&used_up), at(2025, 6, 1)).allowed);

        let lifetime = sauna(Quota::Capped(2), RenewalPeriod::Lifetime);
        assert!(!QuotaEnforcer::check_benefit(&lifetime, Some(&used_up), at(2060, 1, 1)).allowed);
    }

    #[test]
    fn test_denied_check_does_not_move_counter() {
        let grant = sauna(Quota::Capped(1), RenewalPeriod::Lifetime);
        let usage = BenefitUsage { count_in_period: 1, period_start: at(2024, 1, 1) };
        let decision = QuotaEnforcer::check_benefit(&grant, Some(&usage), at(2024, 3, 1));
        assert_eq!(decision.usage, usage);
    }

    #[test]
    fn test_balances() {
        let plan = MembershipPlan::new("p", "P", dec!(10), BillingInterval::Monthly)
            .with_grant(sauna(Quota::Capped(4), RenewalPeriod::Monthly))
            .with_grant(BenefitGrant::new("pool", Quota::Unlimited, RenewalPeriod::Monthly));
        let record = MembershipRecord::enroll(EntityId::new(), EntityId::new(), &plan, at(2024, 1, 1), 100).unwrap();

        let grant = plan.grant_for(&"sauna".into()).unwrap();
        let (record, _) = QuotaEnforcer::redeem(&record, grant, at(2024, 1, 2)).unwrap();

        let balances = QuotaEnforcer::benefit_balances(&plan, &record, at(2024, 1, 3));
        assert_eq!(balances[0].used_in_period, 1);
        assert_eq!(balances[0].remaining, Remaining::Count(3));
        assert_eq!(balances[1].remaining, Remaining::Unlimited);

        let next_month = QuotaEnforcer::benefit_balances(&plan, &record, at(2024, 2, 2));
        assert_eq!(next_month[0].remaining, Remaining::Count(4));
    }

    #[test]
    fn test_unlimited_grant_at_counter_max() {
        let grant = sauna(Quota::Unlimited, RenewalPeriod::Lifetime);
        let start = at(2024, 1, 1);
        let usage = BenefitUsage { count_in_period: u32::MAX, period_start: start };

        let (next, remaining) = QuotaEnforcer::consume_benefit(&grant, Some(&usage), start).unwrap();
        assert_eq!(remaining, Remaining::Unlimited);
        assert_eq!(next.count_in_period, u32::MAX);
    }

    proptest! {
        #[test]
        fn prop_can_provision_iff_below_cap(cap in 1u32..10_000, count in 0u32..20_000) {
            let limits: BTreeMap<_, _> = [(ResourceKind::Members, Quota::Capped(cap))].into();
            prop_assert_eq!(
                QuotaEnforcer::can_provision(&limits, count, &ResourceKind::Members),
                count < cap
            );
        }

        #[test]
        fn prop_unlimited_always_provisionable(count in any::<u32>()) {
            let limits: BTreeMap<_, _> = [(ResourceKind::Staff, Quota::Unlimited)].into();
            prop_assert!(QuotaEnforcer::can_provision(&limits, count, &ResourceKind::Staff));
        }

        #[test]
        fn prop_unlimited_grant_never_exhausts(used in any::<u32>(), days in 0i64..3_000) {
            let grant = sauna(Quota::Unlimited, RenewalPeriod::Lifetime);
            let start = at(2024, 1, 1);
            let usage = BenefitUsage { count_in_period: used, period_start: start };
            let result = QuotaEnforcer::consume_benefit(&grant, Some(&usage), start + Duration::days(days));
            prop_assert!(result.is_ok());
        }
    }
}
