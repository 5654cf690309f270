//! Gym Membership Engine
//!
//! Membership lifecycle and quota/benefit enforcement for multi-tenant gym
//! operations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Application Services                     │
//! │   EnrollmentService   MembershipService   RedemptionService  │
//! └───────────────┬───────────────────────────────┬──────────────┘
//!                 │ load → pure fn → CAS save     │ publish
//! ┌───────────────▼──────────────┐   ┌────────────▼─────────────┐
//! │        Domain Services       │   │      Outbound Ports      │
//! │ LifecycleEngine QuotaEnforcer│   │ repositories, counters,  │
//! │ validate_plan                │   │ event publisher          │
//! └──────────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! - **Domain Layer**: plans, benefits, membership records, events
//! - **Application Layer**: use case orchestration, DTOs
//! - **Ports Layer**: hexagonal interfaces
//! - **Infrastructure Layer**: in-memory implementations
//!
//! Status is never stored as "expired": it is derived from the stored status
//! and the caller's clock, see [`MembershipRecord::effective_status`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{EnrollmentService, MembershipService, RedemptionService};
pub use config::{ConfigError, EngineConfig, FreezeCreditPolicy, GIFT_DAYS_CEILING};
pub use domain::aggregates::{
    BenefitCatalog, BenefitDefinition, BenefitGrant, EffectiveStatus, MembershipPlan,
    MembershipRecord, OpKind, ResourceKind,
};
pub use domain::events::MembershipEvent;
pub use domain::services::{LifecycleEngine, QuotaEnforcer};
pub use domain::value_objects::{
    BillingInterval, EntityId, Gender, GenderScope, Quota, Remaining, RenewalPeriod,
};
pub use error::{ErrorKind, MembershipError, MembershipResult};
pub use ports::inbound::{EnrollmentUseCases, MembershipUseCases, RedemptionUseCases};
pub use ports::outbound::{RepositoryError, ResourceCounter};
