//! attnview CLI: render attention thumbnails and detail views to SVG or HTML.
//!
//! Loads the JSON parameters an attention producer writes, replays any
//! interactions, and writes the resulting drawing.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use attnview_core::OutputFormat;

/// attnview: layer/head attention visualization
#[derive(Parser, Debug)]
#[command(name = "attnview", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Render the thumbnail grid, optionally with a detail view open
    Render {
        /// Path to the viewer parameters JSON
        params: PathBuf,

        /// Attention filter to show instead of the default one
        #[arg(long)]
        filter: Option<String>,

        /// Open the detail view for a thumbnail, as LAYER:HEAD
        #[arg(long, value_parser = commands::parse_selection)]
        select: Option<(usize, usize)>,

        /// Highlight a left-token row in the open detail view
        #[arg(long)]
        hover: Option<usize>,

        /// JSON file with a list of interaction events to replay
        #[arg(long)]
        events: Option<PathBuf>,

        /// Output format (defaults to the configured one)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the layout metrics for a filter as JSON
    Layout {
        /// Path to the viewer parameters JSON
        params: PathBuf,

        /// Attention filter to measure instead of the default one
        #[arg(long)]
        filter: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default configuration file in the workspace
    Init,
    /// Show the effective configuration
    Show,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Svg,
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Svg => OutputFormat::Svg,
            FormatArg::Html => OutputFormat::Html,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // stdout carries the rendered output, so human logs go to stderr.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "attnview", "attnview")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "attnview.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref()).await
}
