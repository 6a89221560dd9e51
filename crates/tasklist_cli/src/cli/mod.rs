use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasklist_core::config::{ConfigOverrides, CorruptPolicy, canonical_name};
use tasklist_core::error::AppError;

/// Task list backed by a JSON file. Run without a subcommand for the menu.
#[derive(Parser, Debug)]
#[command(name = "tasklist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task file to use instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk" -d "two litres"
    Add {
        title: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List tasks in creation order
    ///
    /// Example: tasklist list --pending
    List {
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        #[arg(long)]
        completed: bool,
    },
    /// Show details of a task
    ///
    /// Example: tasklist show 1
    Show { id: String },
    /// Change a task's title and/or description
    ///
    /// Example: tasklist update 1 --title "Buy oat milk"
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: tasklist done 1
    Done { id: String },
    /// Mark a completed task as pending again
    ///
    /// Example: tasklist undo 1
    Undo { id: String },
    /// Delete a task
    ///
    /// Example: tasklist delete 1
    Delete { id: String },
    /// Show completion statistics
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    StorePath,
    OnCorrupt,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let target = match canonical_name(key_raw).as_str() {
        "" => return Err("override key cannot be empty".to_string()),
        "store_path" | "store" => ConfigOverrideTarget::StorePath,
        "on_corrupt" => ConfigOverrideTarget::OnCorrupt,
        "theme" => ConfigOverrideTarget::Theme,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{}' needs a value", key_raw.trim()));
    }

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value));
            }
            ConfigOverrideTarget::OnCorrupt => {
                overrides.on_corrupt = Some(parsed.value.parse::<CorruptPolicy>()?);
            }
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
        }
    }

    Ok(overrides)
}
