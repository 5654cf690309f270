//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::dto::*;
use crate::domain::aggregates::{MembershipPlan, MembershipRecord, ResourceKind};
use crate::domain::services::{BenefitBalance, PlanViolation};
use crate::domain::value_objects::EntityId;
use crate::error::MembershipError;

/// Enrollment and provisioning use cases
#[async_trait]
pub trait EnrollmentUseCases: Send + Sync {
    /// Check a plan against the benefit catalog
    async fn validate_plan(&self, plan: &MembershipPlan) -> Result<Vec<PlanViolation>, MembershipError>;

    /// Enroll a member, consuming one member slot of the organization
    async fn enroll(&self, command: EnrollCommand) -> Result<MembershipRecord, MembershipError>;

    /// Provision a non-member resource (branch, trainer, ...) against the plan
    async fn provision(
        &self,
        organization_id: &EntityId,
        plan_id: &EntityId,
        kind: ResourceKind,
    ) -> Result<u32, MembershipError>;

    /// Return a member slot, e.g. when a membership is cancelled upstream
    async fn release_member_slot(&self, organization_id: &EntityId);

    /// Return a previously provisioned resource slot
    async fn release(&self, organization_id: &EntityId, kind: ResourceKind);
}

/// Staff freeze / gift / status use cases
#[async_trait]
pub trait MembershipUseCases: Send + Sync {
    async fn freeze(&self, command: FreezeCommand) -> Result<MembershipRecord, MembershipError>;

    async fn unfreeze(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<MembershipRecord, MembershipError>;

    async fn gift_days(&self, command: GiftDaysCommand) -> Result<MembershipRecord, MembershipError>;

    async fn status(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<StatusView, MembershipError>;

    async fn get_membership(&self, record_id: &EntityId) -> Result<MembershipRecord, MembershipError>;

    async fn list_for_member(
        &self,
        member_id: &EntityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MembershipSummary>, MembershipError>;
}

/// Front-desk benefit redemption use cases
#[async_trait]
pub trait RedemptionUseCases: Send + Sync {
    /// Decide without consuming
    async fn check_benefit(&self, command: RedeemCommand) -> Result<BenefitCheck, MembershipError>;

    /// Consume one unit atomically
    async fn redeem_benefit(&self, command: RedeemCommand) -> Result<RedemptionReceipt, MembershipError>;

    async fn balances(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<Vec<BenefitBalance>, MembershipError>;
}
