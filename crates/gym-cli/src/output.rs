//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use gym_membership::EffectiveStatus;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Print rows as a table, or the serializable form as JSON
    pub fn print_rows<R, T>(&self, rows: &[R], data: &T)
    where
        R: Tabled,
        T: Serialize + ?Sized,
    {
        match self {
            OutputFormat::Json => print_json(data),
            OutputFormat::Table if rows.is_empty() => println!("{}", "No results".dimmed()),
            OutputFormat::Table => {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
    }

    /// Print a single value; tables fall back to pretty JSON
    pub fn print<T: Serialize + ?Sized>(&self, data: &T) {
        print_json(data)
    }

    /// Print a one-line confirmation, or the JSON payload
    pub fn confirm<T: Serialize + ?Sized>(&self, message: &str, data: &T) {
        match self {
            OutputFormat::Json => print_json(data),
            OutputFormat::Table => println!("{} {}", "✓".green(), message),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(data: &T) {
    println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
}

pub fn status_cell(status: EffectiveStatus) -> String {
    match status {
        EffectiveStatus::Active => status.to_string().green().to_string(),
        EffectiveStatus::Frozen => status.to_string().cyan().to_string(),
        EffectiveStatus::Expired => status.to_string().red().to_string(),
    }
}
