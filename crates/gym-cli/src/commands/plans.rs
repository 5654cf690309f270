//! Plan commands

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use gym_membership::ports::outbound::PlanRepository;
use gym_membership::{EnrollmentUseCases, MembershipPlan, ResourceKind};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::output::OutputFormat;
use crate::state::Workspace;
use crate::PlanCommands;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Billing")]
    billing: String,
    #[tabled(rename = "Members")]
    members: String,
    #[tabled(rename = "Benefits")]
    benefits: usize,
}

impl From<&MembershipPlan> for PlanRow {
    fn from(plan: &MembershipPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            name: plan.name.clone(),
            price: plan.price.to_string(),
            billing: format!("{:?}", plan.billing_interval),
            members: plan
                .org_limits
                .get(&ResourceKind::Members)
                .map(|q| q.to_string())
                .unwrap_or_else(|| "-".into()),
            benefits: plan.benefit_grants.len(),
        }
    }
}

#[derive(Tabled, Serialize)]
struct ViolationRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Problem")]
    problem: String,
}

/// Read a plan from a TOML or JSON file, chosen by extension
pub fn read_plan(path: &Path) -> anyhow::Result<MembershipPlan> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let plan = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };
    Ok(plan)
}

pub async fn handle(action: PlanCommands, ws: &Workspace, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        PlanCommands::List => {
            let plans = ws.plans.list().await?;
            let rows: Vec<PlanRow> = plans.iter().map(PlanRow::from).collect();
            format.print_rows(&rows, &plans);
        }
        PlanCommands::Validate { file } => {
            let plan = read_plan(&file)?;
            let violations = ws.enrollment.validate_plan(&plan).await?;
            let rows: Vec<ViolationRow> = violations
                .iter()
                .map(|v| ViolationRow {
                    kind: format!("{:?}", v.kind()),
                    problem: v.to_string(),
                })
                .collect();
            if rows.is_empty() {
                format.confirm(&format!("plan {} is valid", plan.id), &rows);
            } else {
                format.print_rows(&rows, &rows);
                bail!("plan {} has {} violation(s)", plan.id, rows.len());
            }
        }
        PlanCommands::Import { file } => {
            let plan = read_plan(&file)?;
            let violations = ws.enrollment.validate_plan(&plan).await?;
            if let Some(first) = violations.into_iter().next() {
                return Err(first.into_error().into());
            }
            ws.plans.save(&plan).await?;
            info!(plan_id = %plan.id, "plan imported");
            format.confirm(&format!("imported plan {}", plan.id), &plan);
        }
    }
    Ok(())
}
