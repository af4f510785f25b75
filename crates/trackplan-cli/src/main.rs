//! trackplan - project plan orchestration CLI
//!
//! The `trackplan` command drives the plan orchestrator offline, against
//! settings and tracker exports stored as JSON files.
//!
//! ## Commands
//!
//! - `next-action`: Evaluate the action state machine for saved inputs
//! - `contributors`: Show the scheduler records for a contributor list
//! - `replay`: Connect, build and print a plan from recorded tracker data
//! - `policy`: Print the effective pipeline policy

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use trackplan_core::{
    map_contributors, next_action, Action, CommittedResult, ConfigurationSnapshot,
    ContributorMapping, Orchestrator, PipelinePolicy, TracingAlertSink,
};
use trackplan_ports::{RecordedScheduler, RecordedTracker};

#[derive(Parser)]
#[command(name = "trackplan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Project plan orchestration for issue trackers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true, env = "TRACKPLAN_LOG_JSON")]
    json: bool,

    /// Pipeline policy file (TOML). Built-in defaults when omitted.
    #[arg(long, global = true, env = "TRACKPLAN_POLICY")]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the action the orchestrator would take next
    NextAction {
        /// Current settings (JSON)
        #[arg(short, long)]
        settings: PathBuf,

        /// Last committed result (JSON)
        #[arg(short, long)]
        committed: Option<PathBuf>,

        /// Tracker metadata has been loaded
        #[arg(long)]
        metadata_present: bool,

        /// A pass is running
        #[arg(long)]
        in_progress: bool,

        /// A metadata fetch is running
        #[arg(long)]
        connection_pending: bool,
    },

    /// Print the scheduler records for the configured contributors
    Contributors {
        /// Current settings (JSON)
        #[arg(short, long)]
        settings: PathBuf,
    },

    /// Build a plan from a recorded tracker export and schedule
    Replay {
        /// Current settings (JSON)
        #[arg(short, long)]
        settings: PathBuf,

        /// Tracker export with metadata and reconstructed plan (JSON)
        #[arg(short, long)]
        export: PathBuf,

        /// Recorded schedule (JSON)
        #[arg(long)]
        schedule: PathBuf,

        /// Write the committed result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective pipeline policy as TOML
    Policy,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    trackplan_core::telemetry::init_tracing(cli.json, level);

    let policy = load_policy(cli.policy.as_deref())?;

    match cli.command {
        Commands::NextAction {
            settings,
            committed,
            metadata_present,
            in_progress,
            connection_pending,
        } => {
            let action = cmd_next_action(
                &settings,
                committed.as_deref(),
                metadata_present,
                in_progress,
                connection_pending,
            )?;
            println!("{action}");
            Ok(())
        }
        Commands::Contributors { settings } => {
            let mapping = cmd_contributors(&settings)?;
            println!("{}", serde_json::to_string_pretty(&mapping)?);
            Ok(())
        }
        Commands::Replay {
            settings,
            export,
            schedule,
            output,
        } => {
            let committed = cmd_replay(&settings, &export, &schedule, policy).await?;
            write_output(&committed, output.as_deref())
        }
        Commands::Policy => {
            print!(
                "{}",
                toml::to_string_pretty(&policy).context("Failed to render policy")?
            );
            Ok(())
        }
    }
}

fn load_policy(path: Option<&Path>) -> Result<PipelinePolicy> {
    match path {
        Some(path) => PipelinePolicy::load(path)
            .with_context(|| format!("Failed to load policy from {:?}", path)),
        None => Ok(PipelinePolicy::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {what}: {:?}", path))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid {what} JSON: {:?}", path))
}

fn load_settings(path: &Path) -> Result<ConfigurationSnapshot> {
    let settings: ConfigurationSnapshot = read_json(path, "settings")?;
    Ok(settings.normalized())
}

fn cmd_next_action(
    settings: &Path,
    committed: Option<&Path>,
    metadata_present: bool,
    in_progress: bool,
    connection_pending: bool,
) -> Result<Action> {
    let current = load_settings(settings)?;
    let committed: Option<CommittedResult> = committed
        .map(|path| read_json(path, "committed result"))
        .transpose()?;

    Ok(next_action(
        in_progress,
        connection_pending,
        metadata_present,
        committed.as_ref(),
        &current,
    ))
}

fn cmd_contributors(settings: &Path) -> Result<ContributorMapping> {
    let current = load_settings(settings)?;
    Ok(map_contributors(&current.contributors))
}

/// Drive the orchestrator from `Connect` to a committed build.
async fn cmd_replay(
    settings: &Path,
    export: &Path,
    schedule: &Path,
    policy: PipelinePolicy,
) -> Result<Arc<CommittedResult>> {
    let settings = load_settings(settings)?;
    let tracker = RecordedTracker::load(export)
        .await
        .with_context(|| format!("Failed to load tracker export: {:?}", export))?;
    let scheduler = RecordedScheduler::load(schedule)
        .await
        .with_context(|| format!("Failed to load schedule: {:?}", schedule))?;

    let orchestrator = Orchestrator::new(
        Arc::new(tracker),
        Arc::new(scheduler),
        Arc::new(TracingAlertSink),
        settings,
        policy,
    );

    orchestrator.dispatch().await;
    if orchestrator.metadata().is_none() {
        anyhow::bail!("Could not connect to the recorded tracker");
    }
    let action = orchestrator.dispatch().await;
    info!(action = %action, "Replay pass finished");

    orchestrator
        .committed()
        .context("Replay did not produce a project plan")
}

fn write_output(committed: &CommittedResult, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(committed)?;
    if let Some(path) = output {
        std::fs::write(path, &json).with_context(|| format!("Failed to write to {:?}", path))?;
        println!("Wrote project plan to {:?}", path);
    } else {
        println!("{json}");
    }
    Ok(())
}
