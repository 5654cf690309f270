//! In-memory repository implementations
//!
//! Used by tests and by the CLI, which loads them from and dumps them to a
//! state file.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::domain::aggregates::{
    BenefitCatalog, BenefitDefinition, MembershipPlan, MembershipRecord, ResourceKind,
};
use crate::domain::services::QuotaEnforcer;
use crate::domain::value_objects::{EntityId, Quota};
use crate::domain::MembershipEvent;
use crate::error::MembershipError;
use crate::ports::outbound::{
    BenefitRepository, EventPublisher, MembershipRepository, PlanRepository, RepoResult,
    RepositoryError, ResourceCounter,
};

/// Per-organization resource counts, as persisted
pub type CounterSnapshot = BTreeMap<EntityId, BTreeMap<ResourceKind, u32>>;

// =============================================================================
// Plans
// =============================================================================

/// In-memory plan repository
#[derive(Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<HashMap<EntityId, MembershipPlan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = MembershipPlan>) -> Self {
        Self {
            plans: RwLock::new(plans.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<MembershipPlan>> {
        Ok(self.plans.read().get(id).cloned())
    }

    async fn save(&self, plan: &MembershipPlan) -> RepoResult<()> {
        self.plans.write().insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<MembershipPlan>> {
        let mut plans: Vec<_> = self.plans.read().values().cloned().collect();
        plans.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(plans)
    }
}

// =============================================================================
// Benefits
// =============================================================================

/// In-memory benefit catalog
#[derive(Default)]
pub struct InMemoryBenefitRepository {
    catalog: RwLock<BenefitCatalog>,
}

impl InMemoryBenefitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: BenefitCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }
}

#[async_trait]
impl BenefitRepository for InMemoryBenefitRepository {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<BenefitDefinition>> {
        Ok(self.catalog.read().get(id).cloned())
    }

    async fn save(&self, benefit: &BenefitDefinition) -> RepoResult<()> {
        self.catalog.write().upsert(benefit.clone());
        Ok(())
    }

    async fn catalog(&self) -> RepoResult<BenefitCatalog> {
        Ok(self.catalog.read().clone())
    }
}

// =============================================================================
// Membership records
// =============================================================================

/// In-memory membership repository with optimistic versioning
#[derive(Default)]
pub struct InMemoryMembershipRepository {
    records: RwLock<HashMap<EntityId, MembershipRecord>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = MembershipRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id().clone(), r)).collect()),
        }
    }

    /// All records ordered by id
    pub fn snapshot(&self) -> Vec<MembershipRecord> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records
    }
}

fn check_record(record: &MembershipRecord) -> RepoResult<()> {
    record
        .check_invariants()
        .map_err(|e| RepositoryError::Invalid(e.to_string()))
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn find_by_id(&self, id: &EntityId) -> RepoResult<Option<MembershipRecord>> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn find_by_member(&self, member_id: &EntityId) -> RepoResult<Vec<MembershipRecord>> {
        let mut records: Vec<_> = self
            .records
            .read()
            .values()
            .filter(|r| r.member_id() == member_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.join_date());
        Ok(records)
    }

    async fn insert(&self, record: &MembershipRecord) -> RepoResult<MembershipRecord> {
        check_record(record)?;
        let mut records = self.records.write();
        if records.contains_key(record.id()) {
            return Err(RepositoryError::Duplicate(record.id().to_string()));
        }
        records.insert(record.id().clone(), record.clone());
        Ok(record.clone())
    }

    async fn save(&self, record: &MembershipRecord) -> RepoResult<MembershipRecord> {
        check_record(record)?;
        let mut records = self.records.write();
        let stored = records
            .get(record.id())
            .ok_or_else(|| RepositoryError::NotFound(record.id().to_string()))?;

        if stored.version() != record.version() {
            return Err(RepositoryError::Conflict {
                id: record.id().to_string(),
                expected: record.version(),
                found: stored.version(),
            });
        }

        let mut next = record.clone();
        next.bump_version();
        records.insert(next.id().clone(), next.clone());
        debug!(record_id = %next.id(), version = next.version(), "record saved");
        Ok(next)
    }
}

// =============================================================================
// Organization counters
// =============================================================================

/// Resource counters keyed by organization.
///
/// Each organization has its own lock; check and increment happen while it
/// is held.
#[derive(Default)]
pub struct OrganizationCounters {
    orgs: DashMap<EntityId, Arc<Mutex<HashMap<ResourceKind, u32>>>>,
}

impl OrganizationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CounterSnapshot) -> Self {
        let orgs = DashMap::new();
        for (org, counts) in snapshot {
            orgs.insert(org, Arc::new(Mutex::new(counts.into_iter().collect())));
        }
        Self { orgs }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.orgs
            .iter()
            .map(|entry| {
                let guard = entry.value().lock();
                let counts: BTreeMap<_, _> = guard
                    .iter()
                    .filter(|(_, n)| **n > 0)
                    .map(|(k, n)| (*k, *n))
                    .collect();
                (entry.key().clone(), counts)
            })
            .filter(|(_, counts)| !counts.is_empty())
            .collect()
    }

    fn org_lock(&self, organization_id: &EntityId) -> Arc<Mutex<HashMap<ResourceKind, u32>>> {
        self.orgs
            .entry(organization_id.clone())
            .or_default()
            .value()
            .clone()
    }
}

#[async_trait]
impl ResourceCounter for OrganizationCounters {
    async fn try_acquire(
        &self,
        organization_id: &EntityId,
        kind: ResourceKind,
        limits: &BTreeMap<ResourceKind, Quota>,
    ) -> Result<u32, MembershipError> {
        let lock = self.org_lock(organization_id);
        let mut counts = lock.lock();
        let current = counts.get(&kind).copied().unwrap_or(0);

        if !QuotaEnforcer::can_provision(limits, current, &kind) {
            let reason = match limits.get(&kind) {
                Some(quota) => format!("{} {} already provisioned (limit {})", current, kind, quota),
                None => format!("plan declares no limit for {}", kind),
            };
            return Err(MembershipError::LimitExceeded(format!(
                "organization {}: {}",
                organization_id, reason
            )));
        }

        let next = current + 1;
        counts.insert(kind, next);
        Ok(next)
    }

    async fn release(&self, organization_id: &EntityId, kind: ResourceKind) {
        let lock = self.org_lock(organization_id);
        let mut counts = lock.lock();
        if let Some(count) = counts.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }

    async fn count(&self, organization_id: &EntityId, kind: ResourceKind) -> u32 {
        let Some(entry) = self.orgs.get(organization_id) else {
            return 0;
        };
        let count = entry.value().lock().get(&kind).copied().unwrap_or(0);
        count
    }
}

// =============================================================================
// Event publishers
// =============================================================================

/// No-op event publisher
#[derive(Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _events: Vec<MembershipEvent>) -> RepoResult<()> {
        Ok(())
    }
}

/// Writes each event to the log as JSON
#[derive(Default)]
pub struct LoggingEventPublisher;

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, events: Vec<MembershipEvent>) -> RepoResult<()> {
        for event in events {
            let payload =
                serde_json::to_string(&event).map_err(|e| RepositoryError::Storage(e.to_string()))?;
            info!(event_type = event.event_type(), record_id = %event.record_id(), %payload, "event");
        }
        Ok(())
    }
}

/// Keeps every published event in memory
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<MembershipEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MembershipEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, events: Vec<MembershipEvent>) -> RepoResult<()> {
        self.events.lock().extend(events);
        Ok(())
    }
}
