//! Command handlers
//!
//! Application services that orchestrate use cases. Each mutation is one
//! read-modify-write: load the record, apply the pure engine function, save
//! with a version check, then publish events.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::dto::*;
use crate::domain::aggregates::{
    BenefitDefinition, BenefitGrant, EffectiveStatus, MembershipPlan, MembershipRecord, ResourceKind,
};
use crate::domain::services::{
    ensure_valid, validate_plan, BenefitBalance, LifecycleEngine, PlanViolation, QuotaEnforcer,
};
use crate::domain::value_objects::EntityId;
use crate::domain::MembershipEvent;
use crate::error::MembershipError;
use crate::ports::inbound::{EnrollmentUseCases, MembershipUseCases, RedemptionUseCases};
use crate::ports::outbound::{
    BenefitRepository, EventPublisher, MembershipRepository, PlanRepository, ResourceCounter,
};

async fn load_record(
    repo: &dyn MembershipRepository,
    id: &EntityId,
) -> Result<MembershipRecord, MembershipError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| MembershipError::NotFound(format!("membership record {}", id)))
}

async fn load_plan(repo: &dyn PlanRepository, id: &EntityId) -> Result<MembershipPlan, MembershipError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| MembershipError::NotFound(format!("membership plan {}", id)))
}

/// Events go out after the record is committed; a publish failure is logged
/// and does not undo the mutation.
async fn publish(publisher: &dyn EventPublisher, events: Vec<MembershipEvent>) {
    let count = events.len();
    if let Err(e) = publisher.publish(events).await {
        warn!(error = %e, count, "failed to publish membership events");
    }
}

fn log_conflict<T>(result: Result<T, MembershipError>, record_id: &EntityId) -> Result<T, MembershipError> {
    if let Err(MembershipError::Conflict(msg)) = &result {
        warn!(record_id = %record_id, %msg, "concurrent modification");
    }
    result
}

// =============================================================================
// Enrollment
// =============================================================================

/// Enrollment application service
pub struct EnrollmentService {
    plan_repo: Arc<dyn PlanRepository>,
    benefit_repo: Arc<dyn BenefitRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    counters: Arc<dyn ResourceCounter>,
    event_publisher: Arc<dyn EventPublisher>,
    engine: LifecycleEngine,
}

impl EnrollmentService {
    pub fn new(
        plan_repo: Arc<dyn PlanRepository>,
        benefit_repo: Arc<dyn BenefitRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        counters: Arc<dyn ResourceCounter>,
        event_publisher: Arc<dyn EventPublisher>,
        engine: LifecycleEngine,
    ) -> Self {
        Self {
            plan_repo,
            benefit_repo,
            membership_repo,
            counters,
            event_publisher,
            engine,
        }
    }
}

#[async_trait]
impl EnrollmentUseCases for EnrollmentService {
    async fn validate_plan(&self, plan: &MembershipPlan) -> Result<Vec<PlanViolation>, MembershipError> {
        let catalog = self.benefit_repo.catalog().await?;
        let violations = validate_plan(plan, &catalog);
        debug!(plan_id = %plan.id, violations = violations.len(), "plan validated");
        Ok(violations)
    }

    async fn enroll(&self, command: EnrollCommand) -> Result<MembershipRecord, MembershipError> {
        let plan = load_plan(self.plan_repo.as_ref(), &command.plan_id).await?;
        let catalog = self.benefit_repo.catalog().await?;
        ensure_valid(&plan, &catalog)?;

        let record = MembershipRecord::enroll(
            command.organization_id.clone(),
            command.member_id.clone(),
            &plan,
            command.join_date,
            self.engine.config().lifetime_horizon_years,
        )?;

        let members = self
            .counters
            .try_acquire(&command.organization_id, ResourceKind::Members, &plan.org_limits)
            .await
            .map_err(|e| {
                warn!(
                    organization_id = %command.organization_id,
                    kind = %ResourceKind::Members,
                    error = %e,
                    "enrollment denied"
                );
                e
            })?;

        let stored = match self.membership_repo.insert(&record).await {
            Ok(stored) => stored,
            Err(e) => {
                self.counters
                    .release(&command.organization_id, ResourceKind::Members)
                    .await;
                warn!(record_id = %record.id(), error = %e, "insert failed; member slot released");
                return Err(e.into());
            }
        };

        info!(
            record_id = %stored.id(),
            member_id = %stored.member_id(),
            plan_id = %stored.plan_id(),
            members,
            "member enrolled"
        );

        publish(
            self.event_publisher.as_ref(),
            vec![MembershipEvent::Enrolled {
                record_id: stored.id().clone(),
                member_id: stored.member_id().clone(),
                plan_id: stored.plan_id().clone(),
                expires_at: stored.current_expiry(),
                occurred_at: command.join_date,
            }],
        )
        .await;

        Ok(stored)
    }

    async fn provision(
        &self,
        organization_id: &EntityId,
        plan_id: &EntityId,
        kind: ResourceKind,
    ) -> Result<u32, MembershipError> {
        let plan = load_plan(self.plan_repo.as_ref(), plan_id).await?;
        let count = self
            .counters
            .try_acquire(organization_id, kind, &plan.org_limits)
            .await?;
        info!(organization_id = %organization_id, kind = %kind, count, "resource provisioned");
        Ok(count)
    }

    async fn release_member_slot(&self, organization_id: &EntityId) {
        self.release(organization_id, ResourceKind::Members).await;
    }

    async fn release(&self, organization_id: &EntityId, kind: ResourceKind) {
        self.counters.release(organization_id, kind).await;
        debug!(organization_id = %organization_id, kind = %kind, "slot released");
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Freeze / unfreeze / gift application service
pub struct MembershipService {
    membership_repo: Arc<dyn MembershipRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    engine: LifecycleEngine,
}

impl MembershipService {
    pub fn new(
        membership_repo: Arc<dyn MembershipRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        engine: LifecycleEngine,
    ) -> Self {
        Self {
            membership_repo,
            event_publisher,
            engine,
        }
    }
}

#[async_trait]
impl MembershipUseCases for MembershipService {
    async fn freeze(&self, command: FreezeCommand) -> Result<MembershipRecord, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), &command.record_id).await?;
        let next = self.engine.freeze(
            &record,
            command.duration_months,
            command.reason,
            command.chargeable,
            command.now,
        )?;

        let stored = log_conflict(
            self.membership_repo.save(&next).await.map_err(Into::into),
            &command.record_id,
        )?;
        info!(
            record_id = %stored.id(),
            months = command.duration_months,
            chargeable = command.chargeable,
            "membership frozen"
        );

        publish(
            self.event_publisher.as_ref(),
            vec![MembershipEvent::Frozen {
                record_id: stored.id().clone(),
                planned_months: command.duration_months,
                chargeable: command.chargeable,
                occurred_at: command.now,
            }],
        )
        .await;

        Ok(stored)
    }

    async fn unfreeze(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<MembershipRecord, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), record_id).await?;
        let next = self.engine.unfreeze(&record, now)?;

        let stored = log_conflict(self.membership_repo.save(&next).await.map_err(Into::into), record_id)?;
        let credited_days = stored
            .freeze_history()
            .iter()
            .rev()
            .find(|f| f.actual_end == Some(now))
            .and_then(|f| f.credited_days)
            .unwrap_or(0);
        info!(
            record_id = %stored.id(),
            credited_days,
            expires_at = %stored.current_expiry(),
            "membership unfrozen"
        );

        publish(
            self.event_publisher.as_ref(),
            vec![MembershipEvent::Unfrozen {
                record_id: stored.id().clone(),
                credited_days,
                expires_at: stored.current_expiry(),
                occurred_at: now,
            }],
        )
        .await;

        Ok(stored)
    }

    async fn gift_days(&self, command: GiftDaysCommand) -> Result<MembershipRecord, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), &command.record_id).await?;
        let next = self
            .engine
            .gift_days(&record, command.days, command.note, command.now)?;

        let stored = log_conflict(
            self.membership_repo.save(&next).await.map_err(Into::into),
            &command.record_id,
        )?;
        info!(
            record_id = %stored.id(),
            days = command.days,
            expires_at = %stored.current_expiry(),
            "days gifted"
        );

        let days = stored.gift_history().last().map(|g| g.days).unwrap_or_default();
        publish(
            self.event_publisher.as_ref(),
            vec![MembershipEvent::DaysGifted {
                record_id: stored.id().clone(),
                days,
                expires_at: stored.current_expiry(),
                occurred_at: command.now,
            }],
        )
        .await;

        Ok(stored)
    }

    async fn status(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<StatusView, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), record_id).await?;
        Ok(StatusView {
            record_id: record.id().clone(),
            member_id: record.member_id().clone(),
            plan_id: record.plan_id().clone(),
            status: self.engine.effective_status(&record, now),
            current_expiry: record.current_expiry(),
            days_remaining: self.engine.days_remaining(&record, now),
            frozen_days_credited: self.engine.total_frozen_days(&record),
            version: record.version(),
        })
    }

    async fn get_membership(&self, record_id: &EntityId) -> Result<MembershipRecord, MembershipError> {
        load_record(self.membership_repo.as_ref(), record_id).await
    }

    async fn list_for_member(
        &self,
        member_id: &EntityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<MembershipSummary>, MembershipError> {
        let records = self.membership_repo.find_by_member(member_id).await?;
        Ok(records
            .iter()
            .map(|record| MembershipSummary::of(record, now))
            .collect())
    }
}

// =============================================================================
// Redemption
// =============================================================================

/// Benefit redemption application service
pub struct RedemptionService {
    plan_repo: Arc<dyn PlanRepository>,
    benefit_repo: Arc<dyn BenefitRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

/// Everything a redemption decision needs, loaded and gated
struct RedemptionContext {
    record: MembershipRecord,
    grant: BenefitGrant,
}

impl RedemptionService {
    pub fn new(
        plan_repo: Arc<dyn PlanRepository>,
        benefit_repo: Arc<dyn BenefitRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            plan_repo,
            benefit_repo,
            membership_repo,
            event_publisher,
        }
    }

    /// Load the record, plan, grant and benefit and apply the non-quota gates
    async fn prepare(&self, command: &RedeemCommand) -> Result<RedemptionContext, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), &command.record_id).await?;

        let status = record.effective_status(command.now);
        if status != EffectiveStatus::Active {
            warn!(record_id = %record.id(), %status, "redemption on inactive membership");
            return Err(MembershipError::InvalidTransition(format!(
                "record {} is {}; only active memberships redeem benefits",
                record.id(),
                status
            )));
        }

        let plan = load_plan(self.plan_repo.as_ref(), record.plan_id()).await?;
        let grant = plan.grant_for(&command.benefit_id).cloned().ok_or_else(|| {
            MembershipError::NotFound(format!(
                "plan {} does not grant benefit {}",
                plan.id, command.benefit_id
            ))
        })?;

        let benefit = self
            .benefit_repo
            .find_by_id(&command.benefit_id)
            .await?
            .ok_or_else(|| MembershipError::NotFound(format!("benefit {}", command.benefit_id)))?;
        check_benefit_gates(&benefit, command)?;

        Ok(RedemptionContext { record, grant })
    }
}

fn check_benefit_gates(benefit: &BenefitDefinition, command: &RedeemCommand) -> Result<(), MembershipError> {
    if !benefit.active {
        return Err(MembershipError::InvalidArgument(format!(
            "benefit {} is inactive",
            benefit.id
        )));
    }
    if let Some(gender) = command.gender {
        if !benefit.gender_scope.admits(gender) {
            return Err(MembershipError::InvalidArgument(format!(
                "benefit {} is restricted to {:?}",
                benefit.id, benefit.gender_scope
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl RedemptionUseCases for RedemptionService {
    async fn check_benefit(&self, command: RedeemCommand) -> Result<BenefitCheck, MembershipError> {
        let ctx = self.prepare(&command).await?;
        let decision = QuotaEnforcer::check_benefit(
            &ctx.grant,
            ctx.record.usage_of(&command.benefit_id),
            command.now,
        );
        debug!(
            record_id = %ctx.record.id(),
            benefit_id = %command.benefit_id,
            allowed = decision.allowed,
            "benefit checked"
        );
        Ok(BenefitCheck {
            benefit_id: command.benefit_id,
            allowed: decision.allowed,
            remaining: decision.remaining,
        })
    }

    async fn redeem_benefit(&self, command: RedeemCommand) -> Result<RedemptionReceipt, MembershipError> {
        let ctx = self.prepare(&command).await?;

        let (next, remaining) = QuotaEnforcer::redeem(&ctx.record, &ctx.grant, command.now).map_err(|e| {
            warn!(
                record_id = %ctx.record.id(),
                benefit_id = %command.benefit_id,
                error = %e,
                "redemption denied"
            );
            e
        })?;

        let stored = log_conflict(
            self.membership_repo.save(&next).await.map_err(Into::into),
            &command.record_id,
        )?;
        let count_in_period = stored
            .usage_of(&command.benefit_id)
            .map(|u| u.count_in_period)
            .unwrap_or_default();
        info!(
            record_id = %stored.id(),
            benefit_id = %command.benefit_id,
            count_in_period,
            %remaining,
            "benefit redeemed"
        );

        publish(
            self.event_publisher.as_ref(),
            vec![MembershipEvent::BenefitRedeemed {
                record_id: stored.id().clone(),
                benefit_id: command.benefit_id.clone(),
                count_in_period,
                occurred_at: command.now,
            }],
        )
        .await;

        Ok(RedemptionReceipt {
            record_id: stored.id().clone(),
            benefit_id: command.benefit_id,
            count_in_period,
            remaining,
            redeemed_at: command.now,
        })
    }

    async fn balances(&self, record_id: &EntityId, now: DateTime<Utc>) -> Result<Vec<BenefitBalance>, MembershipError> {
        let record = load_record(self.membership_repo.as_ref(), record_id).await?;
        let plan = load_plan(self.plan_repo.as_ref(), record.plan_id()).await?;
        Ok(QuotaEnforcer::benefit_balances(&plan, &record, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{BillingInterval, Gender, GenderScope, Quota, Remaining, RenewalPeriod};
    use crate::infrastructure::persistence::{
        InMemoryBenefitRepository, InMemoryMembershipRepository, InMemoryPlanRepository,
        OrganizationCounters, RecordingEventPublisher,
    };
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    struct Harness {
        enrollment: EnrollmentService,
        membership: MembershipService,
        redemption: RedemptionService,
        counters: Arc<OrganizationCounters>,
        events: Arc<RecordingEventPublisher>,
        org: EntityId,
    }

    fn join() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn gold_plan() -> MembershipPlan {
        MembershipPlan::new("gold", "Gold", dec!(59.90), BillingInterval::Monthly)
            .with_org_limit(ResourceKind::Members, Quota::Capped(2))
            .with_org_limit(ResourceKind::Trainers, Quota::Capped(1))
            .with_grant(BenefitGrant::new("sauna", Quota::Capped(2), RenewalPeriod::Monthly))
            .with_grant(BenefitGrant::new("ladies-spa", Quota::Unlimited, RenewalPeriod::Monthly))
    }

    async fn harness() -> Harness {
        let plans = Arc::new(InMemoryPlanRepository::new());
        let benefits = Arc::new(InMemoryBenefitRepository::new());
        let records = Arc::new(InMemoryMembershipRepository::new());
        let counters = Arc::new(OrganizationCounters::new());
        let events = Arc::new(RecordingEventPublisher::new());

        plans.save(&gold_plan()).await.unwrap();
        benefits.save(&BenefitDefinition::new("sauna", "Sauna")).await.unwrap();
        benefits
            .save(&BenefitDefinition::new("ladies-spa", "Ladies spa").with_scope(GenderScope::Female))
            .await
            .unwrap();

        let engine = LifecycleEngine::default();
        Harness {
            enrollment: EnrollmentService::new(
                plans.clone(),
                benefits.clone(),
                records.clone(),
                counters.clone(),
                events.clone(),
                engine.clone(),
            ),
            membership: MembershipService::new(records.clone(), events.clone(), engine),
            redemption: RedemptionService::new(plans, benefits, records, events.clone()),
            counters,
            events,
            org: EntityId::from_string("org-1"),
        }
    }

    async fn enroll(h: &Harness) -> Result<MembershipRecord, MembershipError> {
        h.enrollment
            .enroll(EnrollCommand {
                organization_id: h.org.clone(),
                member_id: EntityId::new(),
                plan_id: "gold".into(),
                join_date: join(),
            })
            .await
    }

    fn redeem_cmd(record: &MembershipRecord, benefit: &str, now: DateTime<Utc>) -> RedeemCommand {
        RedeemCommand {
            record_id: record.id().clone(),
            benefit_id: benefit.into(),
            gender: None,
            now,
        }
    }

    #[tokio::test]
    async fn test_enroll_consumes_member_slots() {
        let h = harness().await;
        let first = enroll(&h).await.unwrap();
        enroll(&h).await.unwrap();

        let err = enroll(&h).await.unwrap_err();
        assert!(matches!(err, MembershipError::LimitExceeded(_)));
        assert_eq!(h.counters.count(&h.org, ResourceKind::Members).await, 2);

        assert_eq!(first.version(), 0);
        assert_eq!(h.events.events().len(), 2);
        assert_eq!(h.events.events()[0].event_type(), "membership.enrolled");

        h.enrollment.release_member_slot(&h.org).await;
        assert!(enroll(&h).await.is_ok());
    }

    #[tokio::test]
    async fn test_enroll_unknown_plan() {
        let h = harness().await;
        let err = h
            .enrollment
            .enroll(EnrollCommand {
                organization_id: h.org.clone(),
                member_id: EntityId::new(),
                plan_id: "platinum".into(),
                join_date: join(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::NotFound(_)));
        assert_eq!(h.counters.count(&h.org, ResourceKind::Members).await, 0);
    }

    #[tokio::test]
    async fn test_validate_plan_reports_all_violations() {
        let h = harness().await;
        let plan = MembershipPlan::new("bad", " ", dec!(-1), BillingInterval::Monthly)
            .with_grant(BenefitGrant::new("hammam", Quota::Capped(1), RenewalPeriod::Monthly));
        let violations = h.enrollment.validate_plan(&plan).await.unwrap();
        assert_eq!(violations.len(), 3);
    }

    #[tokio::test]
    async fn test_provision_other_resources() {
        let h = harness().await;
        let gold: EntityId = "gold".into();
        assert_eq!(h.enrollment.provision(&h.org, &gold, ResourceKind::Trainers).await.unwrap(), 1);
        let err = h.enrollment.provision(&h.org, &gold, ResourceKind::Trainers).await.unwrap_err();
        assert!(matches!(err, MembershipError::LimitExceeded(_)));

        h.enrollment.release(&h.org, ResourceKind::Trainers).await;
        assert!(h.enrollment.provision(&h.org, &gold, ResourceKind::Trainers).await.is_ok());
    }

    #[tokio::test]
    async fn test_freeze_unfreeze_cycle() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();
        let freeze_at = join() + Duration::days(3);

        let frozen = h
            .membership
            .freeze(FreezeCommand {
                record_id: record.id().clone(),
                duration_months: 1,
                reason: "travel".into(),
                chargeable: false,
                now: freeze_at,
            })
            .await
            .unwrap();
        assert_eq!(frozen.version(), 1);

        let status = h.membership.status(record.id(), freeze_at + Duration::days(1)).await.unwrap();
        assert_eq!(status.status, EffectiveStatus::Frozen);

        let thawed = h
            .membership
            .unfreeze(record.id(), freeze_at + Duration::days(12))
            .await
            .unwrap();
        assert_eq!(thawed.current_expiry(), record.current_expiry() + Duration::days(12));
        assert_eq!(thawed.version(), 2);

        let status = h.membership.status(record.id(), freeze_at + Duration::days(12)).await.unwrap();
        assert_eq!(status.status, EffectiveStatus::Active);
        assert_eq!(status.frozen_days_credited, 12);

        let types: Vec<_> = h.events.events().iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            ["membership.enrolled", "membership.frozen", "membership.unfrozen"]
        );
        match h.events.events().last() {
            Some(MembershipEvent::Unfrozen { credited_days, .. }) => assert_eq!(*credited_days, 12),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gift_days_and_errors() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();

        let gifted = h
            .membership
            .gift_days(GiftDaysCommand {
                record_id: record.id().clone(),
                days: 7,
                note: "referral".into(),
                now: join(),
            })
            .await
            .unwrap();
        assert_eq!(gifted.current_expiry(), record.current_expiry() + Duration::days(7));

        let err = h
            .membership
            .gift_days(GiftDaysCommand {
                record_id: record.id().clone(),
                days: 0,
                note: "nothing".into(),
                now: join(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::InvalidArgument(_)));

        let err = h.membership.get_membership(&EntityId::new()).await.unwrap_err();
        assert!(matches!(err, MembershipError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_redeem_until_exhausted_then_next_period() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();
        let now = join() + Duration::days(1);

        let first = h.redemption.redeem_benefit(redeem_cmd(&record, "sauna", now)).await.unwrap();
        assert_eq!(first.remaining, Remaining::Count(1));
        let second = h.redemption.redeem_benefit(redeem_cmd(&record, "sauna", now)).await.unwrap();
        assert_eq!(second.remaining, Remaining::Count(0));
        assert_eq!(second.count_in_period, 2);

        let check = h.redemption.check_benefit(redeem_cmd(&record, "sauna", now)).await.unwrap();
        assert!(!check.allowed);

        let err = h.redemption.redeem_benefit(redeem_cmd(&record, "sauna", now)).await.unwrap_err();
        assert!(matches!(err, MembershipError::LimitExceeded(_)));

        let balances = h.redemption.balances(record.id(), now).await.unwrap();
        assert_eq!(balances[0].used_in_period, 2);
    }

    #[tokio::test]
    async fn test_redeem_gates() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();
        let now = join() + Duration::days(1);

        let err = h.redemption.redeem_benefit(redeem_cmd(&record, "pool", now)).await.unwrap_err();
        assert!(matches!(err, MembershipError::NotFound(_)));

        let mut cmd = redeem_cmd(&record, "ladies-spa", now);
        cmd.gender = Some(Gender::Male);
        let err = h.redemption.redeem_benefit(cmd.clone()).await.unwrap_err();
        assert!(matches!(err, MembershipError::InvalidArgument(_)));

        cmd.gender = Some(Gender::Female);
        let receipt = h.redemption.redeem_benefit(cmd).await.unwrap();
        assert_eq!(receipt.remaining, Remaining::Unlimited);

        let expired = record.current_expiry() + Duration::days(1);
        let err = h.redemption.redeem_benefit(redeem_cmd(&record, "sauna", expired)).await.unwrap_err();
        assert!(matches!(err, MembershipError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_redeem_while_frozen_rejected() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();
        h.membership
            .freeze(FreezeCommand {
                record_id: record.id().clone(),
                duration_months: 1,
                reason: "injury".into(),
                chargeable: true,
                now: join(),
            })
            .await
            .unwrap();

        let err = h
            .redemption
            .redeem_benefit(redeem_cmd(&record, "sauna", join() + Duration::days(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_list_for_member() {
        let h = harness().await;
        let record = enroll(&h).await.unwrap();
        let rows = h.membership.list_for_member(record.member_id(), join()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, EffectiveStatus::Active);
    }
}
