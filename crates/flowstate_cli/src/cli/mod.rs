use clap::{Parser, Subcommand};
use flowstate_core::config::ConfigOverrides;
use flowstate_core::model::TaskStatus;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task to the end of the To Do column
    ///
    /// Example: flowstate add "Write report" -t 25
    Add {
        title: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Countdown length in minutes
        #[arg(short = 't', long = "timer", value_name = "MINUTES")]
        timer_minutes: Option<u32>,
    },
    /// Edit a task's title, description or timer
    ///
    /// Example: flowstate edit task-1 --title "Write the report"
    /// Example: flowstate edit task-1 --clear-timer
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long = "timer", value_name = "MINUTES", conflicts_with = "clear_timer")]
        timer_minutes: Option<u32>,
        #[arg(long)]
        clear_timer: bool,
    },
    /// Delete a task
    ///
    /// Example: flowstate delete task-1
    Delete {
        id: String,
    },
    /// Move a task to a column, or onto another task's slot
    ///
    /// Example: flowstate move task-1 doing
    /// Example: flowstate move task-1 todo --index 0
    /// Example: flowstate move task-3 --onto task-1
    Move {
        id: String,
        #[arg(value_parser = parse_column, required_unless_present = "onto")]
        column: Option<TaskStatus>,
        /// Position among the column's other tasks (appends when omitted)
        #[arg(long, conflicts_with = "onto")]
        index: Option<usize>,
        /// Drop onto the slot held by this task
        #[arg(long, value_name = "TASK", conflicts_with = "column")]
        onto: Option<String>,
    },
    /// Drop a task on the delete zone
    ///
    /// Example: flowstate drop task-1
    Drop {
        id: String,
    },
    /// Show details of a task
    ///
    /// Example: flowstate show task-1
    Show {
        id: String,
    },
    /// List the board, or a single column
    ///
    /// Example: flowstate list
    /// Example: flowstate list doing
    List {
        #[arg(value_parser = parse_column)]
        column: Option<TaskStatus>,
    },
    /// Start, stop or watch the countdown timer
    Timer {
        #[command(subcommand)]
        timer: TimerCommand,
    },
    /// Replace the board with the todos of a dashboard export
    ///
    /// Example: flowstate import todo-storage.json
    Import {
        path: std::path::PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum TimerCommand {
    /// Start a task's countdown, stopping any other running one
    ///
    /// Example: flowstate timer start task-1
    Start { id: String },
    /// Stop a task's countdown
    ///
    /// Example: flowstate timer stop task-1
    Stop { id: String },
    /// Show the remaining time of the running countdown
    Status,
    /// Poll the running countdown until it expires
    Watch,
}

pub fn parse_column(raw: &str) -> Result<TaskStatus, String> {
    raw.parse::<TaskStatus>()
        .map_err(|_| format!("unknown column '{raw}' (expected todo, doing or done)"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    TimerAlerts,
    DefaultTimerMinutes,
    PollIntervalMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "timer_alerts" => ConfigOverrideTarget::TimerAlerts,
        "default_timer_minutes" => ConfigOverrideTarget::DefaultTimerMinutes,
        "poll_interval_ms" => ConfigOverrideTarget::PollIntervalMs,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds parsed overrides into a [`ConfigOverrides`], checking each value.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::TimerAlerts => {
                overrides.timer_alerts = Some(parse_bool(&parsed.value)?);
            }
            ConfigOverrideTarget::DefaultTimerMinutes => {
                overrides.default_timer_minutes =
                    Some(parse_positive(&parsed.value, "default_timer_minutes")?);
            }
            ConfigOverrideTarget::PollIntervalMs => {
                overrides.poll_interval_ms =
                    Some(parse_positive(&parsed.value, "poll_interval_ms")?);
            }
        }
    }
    Ok(overrides)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

fn parse_positive<T>(value: &str, field: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(format!("{field} must be a positive integer")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
