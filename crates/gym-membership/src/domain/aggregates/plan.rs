//! Membership Plan
//!
//! Price, billing interval, organizational/operational ceilings and the
//! ordered list of benefit grants of one membership tier.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::value_objects::{BillingInterval, EntityId, Quota, RenewalPeriod};
use crate::error::MembershipError;

/// Organizational resources a plan caps
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Branches,
    Managers,
    Staff,
    Trainers,
    Members,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        Self::Branches,
        Self::Managers,
        Self::Staff,
        Self::Trainers,
        Self::Members,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Branches => "branches",
            Self::Managers => "managers",
            Self::Staff => "staff",
            Self::Trainers => "trainers",
            Self::Members => "members",
        };
        f.write_str(name)
    }
}

/// Operational records a plan caps
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Workouts,
    Diets,
    Classes,
    Leads,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Workouts => "workouts",
            Self::Diets => "diets",
            Self::Classes => "classes",
            Self::Leads => "leads",
        };
        f.write_str(name)
    }
}

/// A benefit allocation inside a plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitGrant {
    pub benefit_id: EntityId,
    pub quota: Quota,
    pub renewal_period: RenewalPeriod,
}

impl BenefitGrant {
    pub fn new(benefit_id: impl Into<EntityId>, quota: Quota, renewal_period: RenewalPeriod) -> Self {
        Self {
            benefit_id: benefit_id.into(),
            quota,
            renewal_period,
        }
    }
}

/// Membership plan (one per tier)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: EntityId,
    pub name: String,
    pub price: Decimal,
    pub billing_interval: BillingInterval,
    /// Kinds a plan file leaves out are unlimited
    #[serde(default = "unlimited_org_limits", deserialize_with = "org_limits_with_defaults")]
    pub org_limits: BTreeMap<ResourceKind, Quota>,
    #[serde(default)]
    pub ops_limits: BTreeMap<OpKind, Quota>,
    #[serde(default)]
    pub benefit_grants: Vec<BenefitGrant>,
}

fn unlimited_org_limits() -> BTreeMap<ResourceKind, Quota> {
    ResourceKind::ALL.iter().map(|k| (*k, Quota::Unlimited)).collect()
}

fn org_limits_with_defaults<'de, D>(deserializer: D) -> Result<BTreeMap<ResourceKind, Quota>, D::Error>
where
    D: Deserializer<'de>,
{
    let declared = BTreeMap::<ResourceKind, Quota>::deserialize(deserializer)?;
    let mut limits = unlimited_org_limits();
    limits.extend(declared);
    Ok(limits)
}

impl MembershipPlan {
    /// Create a plan with every organizational resource unlimited
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        price: Decimal,
        billing_interval: BillingInterval,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            billing_interval,
            org_limits: unlimited_org_limits(),
            ops_limits: BTreeMap::new(),
            benefit_grants: Vec::new(),
        }
    }

    pub fn with_org_limit(mut self, kind: ResourceKind, quota: Quota) -> Self {
        self.org_limits.insert(kind, quota);
        self
    }

    pub fn with_ops_limit(mut self, kind: OpKind, quota: Quota) -> Self {
        self.ops_limits.insert(kind, quota);
        self
    }

    pub fn with_grant(mut self, grant: BenefitGrant) -> Self {
        self.benefit_grants.push(grant);
        self
    }

    /// Grant for a benefit, if the plan includes it
    pub fn grant_for(&self, benefit_id: &EntityId) -> Option<&BenefitGrant> {
        self.benefit_grants.iter().find(|g| &g.benefit_id == benefit_id)
    }

    /// Initial expiry for a membership joining at `join_date`
    pub fn expiry_from(
        &self,
        join_date: DateTime<Utc>,
        lifetime_horizon_years: u32,
    ) -> Result<DateTime<Utc>, MembershipError> {
        self.billing_interval.window_end(join_date, lifetime_horizon_years)
    }
}
