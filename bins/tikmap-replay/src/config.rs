use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use tikmap_api::executor::StreamEvent;
use tikmap_api::record::{ResponseRecord, TrapRecord};

use crate::error::ReplayError;

#[derive(Parser)]
#[command(name = "tikmap-replay", about = "Replay recorded device responses through the entity loaders")]
pub struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. `tikmap_engine=debug`)
    #[arg(long, global = true, env = "TIKMAP_LOG")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load every row at once
    Load(LoadArgs),
    /// Collect rows for a fixed time, then cancel
    Watch(WatchArgs),
    /// Stream rows to callbacks as they arrive
    Stream(StreamArgs),
}

#[derive(Args, Clone, Debug)]
pub struct FixtureArgs {
    /// Path to the TOML replay file
    #[arg(long, default_value = "replay.toml", env = "TIKMAP_REPLAY_CONFIG")]
    pub config: String,

    /// Entity type to materialize rows into
    #[arg(long, value_enum, default_value_t = EntityKind::Interface)]
    pub entity: EntityKind,
}

#[derive(Args, Clone, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Require exactly one row
    #[arg(long, conflicts_with = "single_or_default")]
    pub single: bool,

    /// Require at most one row
    #[arg(long)]
    pub single_or_default: bool,
}

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// How long to collect rows before cancelling
    #[arg(long, default_value_t = 5)]
    pub seconds: u64,
}

#[derive(Args, Clone, Debug)]
pub struct StreamArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Cancel the stream after this many items
    #[arg(long)]
    pub cancel_after: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Interface,
    Address,
    Resource,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ReplayConfig {
    /// Command the rows are attributed to, e.g. `/interface/print`.
    pub command: String,
    /// Delay before each replayed sentence.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Cycle through `events` until cancelled instead of ending with `!done`.
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub events: Vec<FixtureEvent>,
}

fn default_interval_ms() -> u64 {
    10
}

/// One recorded reply sentence.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FixtureEvent {
    Row {
        #[serde(default)]
        fields: toml::Table,
    },
    Trap {
        message: String,
        #[serde(default)]
        category: Option<String>,
    },
}

impl ReplayConfig {
    pub fn load(path: &str) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReplayError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|detail| ReplayError::Config { context: "parse", detail: format!("'{path}': {detail}") })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.repeat && !config.events.iter().any(|e| matches!(e, FixtureEvent::Row { .. })) {
            return Err("repeat requires at least one row".to_string());
        }
        Ok(config)
    }

    /// Fixture sentences as stream events, without the final `Done`.
    pub fn stream_events(&self) -> Vec<StreamEvent> {
        self.events
            .iter()
            .map(|event| match event {
                FixtureEvent::Row { fields } => {
                    let pairs = fields.iter().map(|(k, v)| (k.clone(), wire_string(v)));
                    StreamEvent::Row(ResponseRecord::from_pairs(self.command.clone(), pairs))
                }
                FixtureEvent::Trap { message, category } => {
                    let trap = TrapRecord::new(self.command.clone(), message.clone());
                    match category {
                        Some(category) => StreamEvent::Trap(trap.with("category", category.clone())),
                        None => StreamEvent::Trap(trap),
                    }
                }
            })
            .collect()
    }
}

/// Device replies are all strings; TOML scalars are rendered back to text.
fn wire_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_log_filter_is_global() {
        let cli = Cli::try_parse_from([
            "tikmap-replay",
            "watch",
            "--seconds",
            "2",
            "--log",
            "tikmap_engine=debug",
        ])
        .unwrap();

        assert_eq!(cli.log.as_deref(), Some("tikmap_engine=debug"));
        assert!(matches!(cli.command, Commands::Watch(ref args) if args.seconds == 2));
    }

    const FIXTURE: &str = r#"
command = "/interface/print"
interval_ms = 0

[[events]]
type = "row"
fields = { ".id" = "*1", name = "ether1", mtu = 1500, running = true }

[[events]]
type = "trap"
message = "interrupted"
category = "2"
"#;

    #[test]
    fn test_parse_fixture() {
        let config = ReplayConfig::parse(FIXTURE).unwrap();
        assert_eq!(config.command, "/interface/print");
        assert!(!config.repeat);

        let events = config.stream_events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            StreamEvent::Row(record) => {
                assert_eq!(record.get(".id").unwrap(), "*1");
                assert_eq!(record.get("mtu").unwrap(), "1500");
                assert_eq!(record.get("running").unwrap(), "true");
                assert_eq!(record.command(), "/interface/print");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match &events[1] {
            StreamEvent::Trap(trap) => {
                assert_eq!(trap.message(), "interrupted");
                assert_eq!(trap.category(), Some("2"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_interval_default() {
        let config = ReplayConfig::parse("command = \"/system/resource/print\"").unwrap();
        assert_eq!(config.interval_ms, 10);
        assert!(config.events.is_empty());
    }

    #[test]
    fn test_repeat_without_rows_is_rejected() {
        let err = ReplayConfig::parse("command = \"/log/print\"\nrepeat = true").unwrap_err();
        assert!(err.contains("repeat"));
    }
}
