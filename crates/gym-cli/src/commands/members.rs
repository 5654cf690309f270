//! Member commands

use chrono::{DateTime, Utc};
use gym_membership::application::{
    EnrollCommand, FreezeCommand, GiftDaysCommand, MembershipSummary, RedeemCommand, StatusView,
};
use gym_membership::domain::services::BenefitBalance;
use gym_membership::{EnrollmentUseCases, EntityId, MembershipUseCases, RedemptionUseCases};
use tabled::Tabled;

use crate::output::{status_cell, OutputFormat};
use crate::state::Workspace;
use crate::MemberCommands;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Days left")]
    days_remaining: i64,
}

impl From<&StatusView> for StatusRow {
    fn from(view: &StatusView) -> Self {
        Self {
            record: view.record_id.to_string(),
            member: view.member_id.to_string(),
            plan: view.plan_id.to_string(),
            status: status_cell(view.status),
            expires: view.current_expiry.to_rfc3339(),
            days_remaining: view.days_remaining,
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&MembershipSummary> for SummaryRow {
    fn from(summary: &MembershipSummary) -> Self {
        Self {
            record: summary.record_id.to_string(),
            plan: summary.plan_id.to_string(),
            status: status_cell(summary.status),
            expires: summary.current_expiry.to_rfc3339(),
        }
    }
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Benefit")]
    benefit: String,
    #[tabled(rename = "Quota")]
    quota: String,
    #[tabled(rename = "Renews")]
    renewal: String,
    #[tabled(rename = "Used")]
    used: u32,
    #[tabled(rename = "Remaining")]
    remaining: String,
}

impl From<&BenefitBalance> for BalanceRow {
    fn from(balance: &BenefitBalance) -> Self {
        Self {
            benefit: balance.benefit_id.to_string(),
            quota: balance.quota.to_string(),
            renewal: format!("{:?}", balance.renewal_period),
            used: balance.used_in_period,
            remaining: balance.remaining.to_string(),
        }
    }
}

pub async fn handle(
    action: MemberCommands,
    ws: &Workspace,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        MemberCommands::Enroll {
            org,
            member,
            plan,
            join,
        } => {
            let record = ws
                .enrollment
                .enroll(EnrollCommand {
                    organization_id: EntityId::from_string(org),
                    member_id: EntityId::from_string(member),
                    plan_id: EntityId::from_string(plan),
                    join_date: join.unwrap_or(now),
                })
                .await?;
            format.confirm(
                &format!("enrolled as {} until {}", record.id(), record.current_expiry().to_rfc3339()),
                &record,
            );
        }
        MemberCommands::Show { record } => {
            let record = ws.membership.get_membership(&EntityId::from_string(record)).await?;
            format.print(&record);
        }
        MemberCommands::List { member } => {
            let summaries = ws
                .membership
                .list_for_member(&EntityId::from_string(member), now)
                .await?;
            let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
            format.print_rows(&rows, &summaries);
        }
        MemberCommands::Status { record } => {
            let view = ws.membership.status(&EntityId::from_string(record), now).await?;
            format.print_rows(&[StatusRow::from(&view)], &view);
        }
        MemberCommands::Freeze {
            record,
            months,
            reason,
            chargeable,
        } => {
            let record = ws
                .membership
                .freeze(FreezeCommand {
                    record_id: EntityId::from_string(record),
                    duration_months: months,
                    reason,
                    chargeable,
                    now,
                })
                .await?;
            format.confirm(&format!("froze {} for {} month(s)", record.id(), months), &record);
        }
        MemberCommands::Unfreeze { record } => {
            let record = ws.membership.unfreeze(&EntityId::from_string(record), now).await?;
            format.confirm(
                &format!("unfroze {}; expires {}", record.id(), record.current_expiry().to_rfc3339()),
                &record,
            );
        }
        MemberCommands::Gift { record, days, note } => {
            let record = ws
                .membership
                .gift_days(GiftDaysCommand {
                    record_id: EntityId::from_string(record),
                    days,
                    note,
                    now,
                })
                .await?;
            format.confirm(
                &format!("gifted {} day(s); {} expires {}", days, record.id(), record.current_expiry().to_rfc3339()),
                &record,
            );
        }
        MemberCommands::Redeem {
            record,
            benefit,
            gender,
            check,
        } => {
            let command = RedeemCommand {
                record_id: EntityId::from_string(record),
                benefit_id: EntityId::from_string(benefit),
                gender: gender.map(Into::into),
                now,
            };
            if check {
                let result = ws.redemption.check_benefit(command).await?;
                let verdict = if result.allowed { "allowed" } else { "exhausted" };
                format.confirm(
                    &format!("{}: {} ({} left after use)", result.benefit_id, verdict, result.remaining),
                    &result,
                );
            } else {
                let receipt = ws.redemption.redeem_benefit(command).await?;
                format.confirm(
                    &format!("redeemed {}; {} left this period", receipt.benefit_id, receipt.remaining),
                    &receipt,
                );
            }
        }
        MemberCommands::Balances { record } => {
            let balances = ws.redemption.balances(&EntityId::from_string(record), now).await?;
            let rows: Vec<BalanceRow> = balances.iter().map(BalanceRow::from).collect();
            format.print_rows(&rows, &balances);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use gym_membership::ports::outbound::{BenefitRepository, PlanRepository};
    use gym_membership::{
        BenefitDefinition, BenefitGrant, BillingInterval, GenderScope, MembershipPlan,
        MembershipRecord, Quota, RenewalPeriod,
    };
    use rust_decimal_macros::dec;

    use crate::config::Config;
    use crate::state::StateFile;
    use crate::GenderArg;

    fn join() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    async fn workspace() -> Workspace {
        let ws = Workspace::from_state(StateFile::default(), &Config::default());
        ws.benefits.save(&BenefitDefinition::new("sauna", "Sauna")).await.unwrap();
        ws.benefits
            .save(&BenefitDefinition::new("ladies-spa", "Ladies spa").with_scope(GenderScope::Female))
            .await
            .unwrap();
        ws.plans
            .save(
                &MembershipPlan::new("gold", "Gold", dec!(49), BillingInterval::Monthly)
                    .with_grant(BenefitGrant::new("sauna", Quota::Capped(2), RenewalPeriod::Monthly))
                    .with_grant(BenefitGrant::new("ladies-spa", Quota::Unlimited, RenewalPeriod::Monthly)),
            )
            .await
            .unwrap();
        ws
    }

    async fn enrolled(ws: &Workspace) -> MembershipRecord {
        let enroll = MemberCommands::Enroll {
            org: "club".into(),
            member: "m-1".into(),
            plan: "gold".into(),
            join: None,
        };
        handle(enroll, ws, join(), OutputFormat::Json).await.unwrap();
        ws.records.snapshot().remove(0)
    }

    fn current(ws: &Workspace, id: &EntityId) -> MembershipRecord {
        ws.records.snapshot().into_iter().find(|r| r.id() == id).unwrap()
    }

    fn redeem(record: &MembershipRecord, benefit: &str, check: bool) -> MemberCommands {
        MemberCommands::Redeem {
            record: record.id().to_string(),
            benefit: benefit.into(),
            gender: None,
            check,
        }
    }

    #[tokio::test]
    async fn test_enroll_then_read_views() {
        let ws = workspace().await;
        let record = enrolled(&ws).await;
        assert_eq!(record.join_date(), join());
        assert_eq!(record.current_expiry(), Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());

        let id = record.id().to_string();
        for view in [
            MemberCommands::Show { record: id.clone() },
            MemberCommands::Status { record: id.clone() },
            MemberCommands::List { member: "m-1".into() },
            MemberCommands::Balances { record: id },
        ] {
            handle(view, &ws, join(), OutputFormat::Table).await.unwrap();
        }

        let missing = MemberCommands::Status { record: "nope".into() };
        assert!(handle(missing, &ws, join(), OutputFormat::Json).await.is_err());
    }

    #[tokio::test]
    async fn test_check_does_not_consume() {
        let ws = workspace().await;
        let record = enrolled(&ws).await;
        let now = join() + Duration::days(1);

        handle(redeem(&record, "sauna", true), &ws, now, OutputFormat::Json).await.unwrap();
        assert!(current(&ws, record.id()).usage_of(&"sauna".into()).is_none());

        handle(redeem(&record, "sauna", false), &ws, now, OutputFormat::Json).await.unwrap();
        handle(redeem(&record, "sauna", false), &ws, now, OutputFormat::Json).await.unwrap();
        let usage = *current(&ws, record.id()).usage_of(&"sauna".into()).unwrap();
        assert_eq!(usage.count_in_period, 2);

        // exhausted: checking still succeeds, redeeming fails
        handle(redeem(&record, "sauna", true), &ws, now, OutputFormat::Json).await.unwrap();
        assert!(handle(redeem(&record, "sauna", false), &ws, now, OutputFormat::Json).await.is_err());
    }

    #[tokio::test]
    async fn test_redeem_respects_gender_scope() {
        let ws = workspace().await;
        let record = enrolled(&ws).await;
        let now = join() + Duration::days(1);
        let spa = |gender| MemberCommands::Redeem {
            record: record.id().to_string(),
            benefit: "ladies-spa".into(),
            gender: Some(gender),
            check: false,
        };

        assert!(handle(spa(GenderArg::Male), &ws, now, OutputFormat::Json).await.is_err());
        handle(spa(GenderArg::Female), &ws, now, OutputFormat::Json).await.unwrap();
    }

    #[tokio::test]
    async fn test_freeze_unfreeze_and_gift() {
        let ws = workspace().await;
        let record = enrolled(&ws).await;
        let id = record.id().to_string();
        let frozen_at = join() + Duration::days(2);

        let freeze = MemberCommands::Freeze {
            record: id.clone(),
            months: 1,
            reason: "injury".into(),
            chargeable: false,
        };
        handle(freeze, &ws, frozen_at, OutputFormat::Json).await.unwrap();
        assert!(current(&ws, record.id()).open_freeze().is_some());

        // no redemptions while frozen
        let err = handle(redeem(&record, "sauna", false), &ws, frozen_at, OutputFormat::Json).await;
        assert!(err.is_err());

        let unfreeze = MemberCommands::Unfreeze { record: id.clone() };
        handle(unfreeze, &ws, frozen_at + Duration::days(10), OutputFormat::Json)
            .await
            .unwrap();
        let thawed = current(&ws, record.id());
        assert!(thawed.open_freeze().is_none());
        assert_eq!(thawed.current_expiry(), record.current_expiry() + Duration::days(10));

        let gift = |days| MemberCommands::Gift {
            record: id.clone(),
            days,
            note: "goodwill".into(),
        };
        handle(gift(5), &ws, frozen_at + Duration::days(11), OutputFormat::Json)
            .await
            .unwrap();
        assert!(handle(gift(400), &ws, frozen_at + Duration::days(11), OutputFormat::Json)
            .await
            .is_err());
        assert!(handle(gift(0), &ws, frozen_at + Duration::days(11), OutputFormat::Json)
            .await
            .is_err());

        let gifted = current(&ws, record.id());
        assert_eq!(gifted.current_expiry(), record.current_expiry() + Duration::days(15));
        assert_eq!(gifted.gift_history().len(), 1);
    }
}
