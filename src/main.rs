//! devtop CLI - developer dashboard

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use devtop::{DashConfig, DashError, FixSuggestion};

#[derive(Parser)]
#[command(name = "devtop")]
#[command(about = "devtop - terminal dashboard for your dev machine")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/devtop/config.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log file (default: <cache dir>/devtop/devtop.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("devtop")
        .join("devtop.log")
}

/// Log to a file: the terminal belongs to the dashboard.
fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_env("DEVTOP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        // No log file, no logs; the dashboard still runs
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli.log_file.clone().unwrap_or_else(default_log_path));

    let config_path = cli.config.clone().unwrap_or_else(DashConfig::config_path);

    let result = match cli.command {
        Some(Commands::Init { force }) => init_config(&config_path, force).map_err(anyhow::Error::from),
        None => run_dashboard(&config_path).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.downcast_ref::<DashError>().and_then(|d| d.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn init_config(path: &Path, force: bool) -> Result<(), DashError> {
    DashConfig::write_default(path, force)?;
    println!(
        "{} Config file generated at {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

async fn run_dashboard(config_path: &Path) -> anyhow::Result<()> {
    let (config, notice) = DashConfig::load_or_default(config_path);
    tracing::info!(config = %config_path.display(), "starting dashboard");
    devtop::tui::run(config, notice).await
}
