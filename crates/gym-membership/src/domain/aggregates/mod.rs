//! Aggregates module

pub mod benefit;
pub mod membership;
pub mod plan;

pub use benefit::{BenefitCatalog, BenefitDefinition};
pub use membership::{
    BenefitUsage, EffectiveStatus, FreezeEvent, GiftEvent, MembershipRecord, StoredStatus,
};
pub use plan::{BenefitGrant, MembershipPlan, OpKind, ResourceKind};
