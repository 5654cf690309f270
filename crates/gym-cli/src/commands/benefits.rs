//! Benefit catalog commands

use gym_membership::ports::outbound::BenefitRepository;
use gym_membership::{BenefitDefinition, Gender};
use tabled::Tabled;
use tracing::info;

use crate::output::OutputFormat;
use crate::state::Workspace;
use crate::BenefitCommands;

#[derive(Tabled)]
struct BenefitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&BenefitDefinition> for BenefitRow {
    fn from(benefit: &BenefitDefinition) -> Self {
        Self {
            id: benefit.id.to_string(),
            name: benefit.name.clone(),
            scope: format!("{:?}", benefit.gender_scope),
            active: benefit.active,
        }
    }
}

pub async fn handle(action: BenefitCommands, ws: &Workspace, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        BenefitCommands::List { gender } => {
            let catalog = ws.benefits.catalog().await?;
            let benefits: Vec<&BenefitDefinition> = match gender {
                Some(gender) => catalog.list_for(Gender::from(gender)),
                None => catalog.list().collect(),
            };
            let rows: Vec<BenefitRow> = benefits.iter().copied().map(BenefitRow::from).collect();
            format.print_rows(&rows, &benefits);
        }
        BenefitCommands::Add {
            id,
            name,
            scope,
            inactive,
        } => {
            let mut benefit = BenefitDefinition::new(id, name).with_scope(scope.into());
            if inactive {
                benefit = benefit.deactivated();
            }
            ws.benefits.save(&benefit).await?;
            info!(benefit_id = %benefit.id, "benefit saved");
            format.confirm(&format!("saved benefit {}", benefit.id), &benefit);
        }
    }
    Ok(())
}
