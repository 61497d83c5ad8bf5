//! # Mathnav - Formula Caret Navigation
//!
//! Replays key chords or navigation commands over a formula fixture and
//! prints where the caret and selection end up after each step.
//!
//! ## Quick Start
//!
//! ```bash
//! # Step through a fraction
//! cargo run -- fixtures/fraction.json --keys "Right Right Up Down"
//!
//! # Replay commands, one JSON object per step
//! cargo run -- fixtures/fraction.json --commands "skip-forward extend-upward" --json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mathnav_core::{
    Config, KeyPress, Keymap, MoveOutHandler, NavCommand, NavDirection, NavEvent, Navigator,
};
use mathnav_model::{FormulaSpec, Model, Offset, Selection};

/// Mathnav - replay caret navigation over a formula
#[derive(Parser, Debug)]
#[command(name = "mathnav")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Formula fixture (JSON)
    #[arg(value_name = "FIXTURE")]
    fixture: PathBuf,

    /// Key chords to replay, e.g. "Right Shift+Up"
    #[arg(short, long, value_name = "CHORDS")]
    keys: Option<String>,

    /// Commands to replay after the keys, e.g. "skip-forward move-upward"
    #[arg(short, long, value_name = "COMMANDS")]
    commands: Option<String>,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Act as a host that takes moves leaving the formula
    #[arg(long)]
    escape_consumed: bool,

    /// Print one JSON object per step
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Host used for replays: logs escapes and answers with a fixed choice.
struct ReplayHost {
    consume: bool,
}

impl MoveOutHandler for ReplayHost {
    fn move_out(&mut self, model: &Model, direction: NavDirection) -> bool {
        tracing::info!(%direction, position = model.position(), consumed = self.consume, "move out");
        !self.consume
    }
}

#[derive(Serialize)]
struct StepReport<'a> {
    step: &'a str,
    handled: bool,
    anchor: Offset,
    position: Offset,
    selection: &'a Selection,
    events: &'a [NavEvent],
}

impl StepReport<'_> {
    fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
            return Ok(());
        }

        let ranges: Vec<String> = self
            .selection
            .ranges
            .iter()
            .map(|r| format!("[{}, {}]", r.start, r.end))
            .collect();
        let events: Vec<String> = self
            .events
            .iter()
            .map(|e| match e.previous_position {
                Some(previous) => format!("{} (from {previous})", e.announcement),
                None => e.announcement.to_string(),
            })
            .collect();
        println!(
            "{:<24} {:<5} position={:<3} selection={} {}",
            self.step,
            if self.handled { "ok" } else { "no" },
            self.position,
            ranges.join(" "),
            events.join(", "),
        );
        Ok(())
    }
}

/// Resolves the key chords and commands to replay, in order.
fn plan(args: &Args, keymap: &Keymap) -> anyhow::Result<Vec<(String, NavCommand)>> {
    let mut steps = Vec::new();
    if let Some(keys) = &args.keys {
        for key in KeyPress::parse_sequence(keys)? {
            let command = keymap.command_for(key)?;
            steps.push((key.to_string(), command));
        }
    }
    if let Some(commands) = &args.commands {
        for command in NavCommand::parse_script(commands)? {
            steps.push((command.to_string(), command));
        }
    }
    Ok(steps)
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting mathnav v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => Config::load(),
    };
    let spec = FormulaSpec::from_file(&args.fixture)
        .with_context(|| format!("cannot read fixture {}", args.fixture.display()))?;

    let keymap = Keymap::from_config(&config);
    let steps = plan(&args, &keymap)?;
    let mut navigator = Navigator::from_spec(&spec, config)?;
    let mut host = ReplayHost {
        consume: args.escape_consumed,
    };

    let start = navigator.model();
    StepReport {
        step: "(start)",
        handled: true,
        anchor: start.anchor(),
        position: start.position(),
        selection: start.selection(),
        events: &[],
    }
    .print(args.json)?;

    for (label, command) in &steps {
        let handled = navigator.execute(*command, &mut host);
        let events = navigator.take_events();
        for effect in navigator.take_effects() {
            tracing::info!(?effect, "formula changed");
        }

        let model = navigator.model();
        StepReport {
            step: label,
            handled,
            anchor: model.anchor(),
            position: model.position(),
            selection: model.selection(),
            events: &events,
        }
        .print(args.json)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["mathnav", "formula.json"]);
        assert_eq!(args.fixture, PathBuf::from("formula.json"));
        assert!(args.keys.is_none());
        assert!(!args.escape_consumed);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_replay() {
        let args = Args::parse_from([
            "mathnav",
            "formula.json",
            "--keys",
            "Right Shift+Up",
            "-c",
            "skip-forward",
            "--escape-consumed",
            "-vv",
        ]);
        assert_eq!(args.keys.as_deref(), Some("Right Shift+Up"));
        assert_eq!(args.commands.as_deref(), Some("skip-forward"));
        assert!(args.escape_consumed);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_plan_orders_keys_before_commands() {
        let args = Args::parse_from([
            "mathnav",
            "formula.json",
            "-k",
            "Right Ctrl+A",
            "-c",
            "extend-upward",
        ]);
        let steps = plan(&args, &Keymap::new()).unwrap();
        let labels: Vec<&str> = steps.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["Right", "Ctrl+A", "extend-upward"]);
        assert_eq!(steps[1].1, NavCommand::SelectAll);
    }

    #[test]
    fn test_plan_rejects_unknown_input() {
        let args = Args::parse_from(["mathnav", "formula.json", "-k", "Ctrl+Q"]);
        assert!(plan(&args, &Keymap::new()).is_err());

        let args = Args::parse_from(["mathnav", "formula.json", "-c", "fly-away"]);
        assert!(plan(&args, &Keymap::new()).is_err());
    }

    #[test]
    fn test_replay_host() {
        let model = Model::new(mathnav_model::AtomTree::new());
        assert!(ReplayHost { consume: false }.move_out(&model, NavDirection::Upward));
        assert!(!ReplayHost { consume: true }.move_out(&model, NavDirection::Upward));
    }
}
