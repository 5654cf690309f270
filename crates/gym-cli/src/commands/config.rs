//! Config commands

use std::path::Path;

use anyhow::bail;

use crate::config::Config;
use crate::output::OutputFormat;
use crate::ConfigCommands;

pub fn handle(action: ConfigCommands, config: &Config, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => match format {
            OutputFormat::Json => format.print(config),
            OutputFormat::Table => {
                println!("config file: {}", path.display());
                println!("state file: {}", config.state_file().display());
                println!("freeze credit policy: {:?}", config.engine.freeze_credit_policy);
                println!("max gift days: {}", config.engine.max_gift_days);
                println!("lifetime horizon (years): {}", config.engine.lifetime_horizon_years);
            }
        },
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save(path)?;
            format.confirm(&format!("configuration initialized at {}", path.display()), &Config::default());
        }
    }
    Ok(())
}
