//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod chat_cmd;
mod health;
mod helpers;
mod job;
mod segment_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::pipeline::TimeoutPolicy;

/// Poll timeout behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OnTimeoutArg {
    /// Treat the job as completed and fetch whatever result exists
    #[default]
    ForceComplete,
    /// Fail with an error instead
    ReportError,
}

impl From<OnTimeoutArg> for TimeoutPolicy {
    fn from(arg: OnTimeoutArg) -> Self {
        match arg {
            OnTimeoutArg::ForceComplete => TimeoutPolicy::ForceComplete,
            OnTimeoutArg::ReportError => TimeoutPolicy::ReportError,
        }
    }
}

#[derive(Parser)]
#[command(name = "checky")]
#[command(about = "Contract risk analysis client for the Checky backend")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config file)
    #[arg(short = 'u', long, global = true, env = "CHECKY_API_URL")]
    api_url: Option<String>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a contract and follow the analysis to completion
    Analyze {
        /// Contract file to analyze
        file: PathBuf,
        /// Send segmented article text for immediate analysis (expects a text file)
        #[arg(long)]
        sync: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// What to do when the poll budget runs out
        #[arg(long, value_enum)]
        on_timeout: Option<OnTimeoutArg>,
        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Ask questions about contract terms
    Chat {
        /// One-shot question (starts an interactive session if omitted)
        message: Option<String>,
    },

    /// Split a contract text file into articles and sentences locally
    Segment {
        /// Text file to segment
        file: PathBuf,
        /// Print the segmented contract as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current status of an analysis job
    Status {
        /// Task id returned by upload
        task_id: String,
    },

    /// Fetch the finished analysis report for a job
    Result {
        /// Task id returned by upload
        task_id: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether the backend is reachable
    Health,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (mut settings, _config) = load_settings_with_options(options).await;

    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    match cli.command {
        Commands::Analyze {
            file,
            sync,
            json,
            on_timeout,
            no_progress,
        } => {
            if let Some(policy) = on_timeout {
                settings.on_timeout = policy.into();
            }
            if sync {
                analyze::cmd_analyze_sync(&settings, &file, json).await
            } else {
                analyze::cmd_analyze(&settings, &file, json, !no_progress).await
            }
        }
        Commands::Chat { message } => chat_cmd::cmd_chat(&settings, message.as_deref()).await,
        Commands::Segment { file, json } => segment_cmd::cmd_segment(&file, json).await,
        Commands::Status { task_id } => job::cmd_status(&settings, &task_id).await,
        Commands::Result { task_id, json } => job::cmd_result(&settings, &task_id, json).await,
        Commands::Health => health::cmd_health(&settings).await,
    }
}
