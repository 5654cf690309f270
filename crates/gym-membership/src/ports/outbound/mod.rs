//! Outbound ports (Repository traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::aggregates::{
    BenefitCatalog, BenefitDefinition, MembershipPlan, MembershipRecord, ResourceKind,
};
use crate::domain::value_objects::{EntityId, Quota};
use crate::domain::MembershipEvent;
use crate::error::MembershipError;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict on {id}: expected version {expected}, found {found}")]
    Conflict { id: String, expected: u64, found: u64 },

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for MembershipError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => MembershipError::NotFound(err.to_string()),
            RepositoryError::Conflict { .. } => MembershipError::Conflict(err.to_string()),
            RepositoryError::Duplicate(_) | RepositoryError::Invalid(_) => {
                MembershipError::InvalidArgument(err.to_string())
            }
            RepositoryError::Storage(_) => MembershipError::Storage(err.to_string()),
        }
    }
}

/// Membership plan repository port
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<MembershipPlan>>;

    async fn save(&self, plan: &MembershipPlan) -> RepoResult<()>;

    async fn list(&self) -> RepoResult<Vec<MembershipPlan>>;
}

/// Benefit catalog repository port
#[async_trait]
pub trait BenefitRepository: Send + Sync {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<BenefitDefinition>>;

    async fn save(&self, benefit: &BenefitDefinition) -> RepoResult<()>;

    /// Snapshot of the whole catalog
    async fn catalog(&self) -> RepoResult<BenefitCatalog>;
}

/// Membership record repository port.
///
/// There is deliberately no delete: records are kept for audit.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<MembershipRecord>>;

    async fn find_by_member(&self, member_id: &EntityId) -> RepoResult<Vec<MembershipRecord>>;

    /// Insert a new record; fails if the id is taken
    async fn insert(&self, record: &MembershipRecord) -> RepoResult<MembershipRecord>;

    /// Compare-and-swap save.
    ///
    /// Succeeds only if the stored version equals `record.version()`; the
    /// stored copy then carries the next version and is returned.
    async fn save(&self, record: &MembershipRecord) -> RepoResult<MembershipRecord>;
}

/// Organization-scoped resource counters.
///
/// `try_acquire` checks the cap and increments in one critical section so
/// two concurrent acquisitions cannot both see `count < cap`.
#[async_trait]
pub trait ResourceCounter: Send + Sync {
    /// Acquire one unit; returns the new count
    async fn try_acquire(
        &self,
        organization_id: &EntityId,
        kind: ResourceKind,
        limits: &BTreeMap<ResourceKind, Quota>,
    ) -> Result<u32, MembershipError>;

    /// Give one unit back
    async fn release(&self, organization_id: &EntityId, kind: ResourceKind);

    async fn count(&self, organization_id: &EntityId, kind: ResourceKind) -> u32;
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, events: Vec<MembershipEvent>) -> RepoResult<()>;
}
