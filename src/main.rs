use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use semver_git_resource::cli::orchestration;
use semver_git_resource::config::load_settings;
use semver_git_resource::git::ShellRunner;
use semver_git_resource::models::{CheckRequest, InRequest, OutRequest};
use semver_git_resource::ui;

#[derive(Parser)]
#[command(
    name = "semver-git-resource",
    version,
    about = "Track a semantic version in a git branch (check/in/out)"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom settings file path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List versions newer than the given baseline
    Check,
    /// Write the requested version into a directory
    In {
        /// Destination directory
        destination: PathBuf,
    },
    /// Bump the stored version and push it
    Out {
        /// Build sources directory (unused)
        source: PathBuf,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run(Args::parse()) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;

    match args.command {
        Command::Check => {
            let request: CheckRequest = read_request()?;
            ui::display_status(&format!("checking {}", request.source.uri));
            let versions = orchestration::run_check(&request, ShellRunner::new(), &settings)?;
            write_response(&versions)
        }
        Command::In { destination } => {
            let request: InRequest = read_request()?;
            let response = orchestration::run_in(&request, &destination)?;
            ui::display_success(&format!(
                "wrote version {} to {}",
                response.version.number,
                destination.display()
            ));
            write_response(&response)
        }
        Command::Out { source: _ } => {
            let request: OutRequest = read_request()?;
            ui::display_status(&format!("bumping version in {}", request.source.uri));
            let response = orchestration::run_out(&request, ShellRunner::new(), &settings)?;
            ui::display_success(&format!("version is now {}", response.version.number));
            write_response(&response)
        }
    }
}

/// Logs go to stderr; stdout is reserved for the JSON response
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn read_request<T: DeserializeOwned>() -> Result<T> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;
    serde_json::from_str(&input).context("invalid request JSON")
}

fn write_response<T: Serialize>(response: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    Ok(())
}
