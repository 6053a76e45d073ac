use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ax_uat::cli;
use ax_uat::desktop::imagediff::compare_images;
use ax_uat::desktop::{ArtifactStore, CaptureTarget};
use ax_uat::{HarnessError, Result};

#[derive(Parser)]
#[command(name = "ax-screenshot", version, about = "Capture screenshots and compare them against baselines")]
struct Args {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a screenshot
    Capture {
        /// Logical name for the screenshot
        #[arg(long)]
        name: String,
        /// Capture the window of this pid instead of the whole screen
        #[arg(long)]
        pid: Option<u32>,
    },
    /// Capture and save as the baseline for `name`
    Baseline {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pid: Option<u32>,
    },
    /// Capture and compare against the existing baseline
    Compare {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pid: Option<u32>,
        /// Allowed fraction of changed pixels (default: UAT_TOLERANCE)
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Compare two image files
    CompareFiles {
        /// Reference image
        file_a: PathBuf,
        /// Candidate image
        file_b: PathBuf,
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HarnessError::not_found(format!("file not found: {}", path.display())))
    }
}

fn run(args: Args) -> Result<bool> {
    let config = cli::load_config();
    let default_tolerance = config.tolerance;
    let store = ArtifactStore::new(&config);

    match args.command {
        Command::Capture { name, pid } => {
            let path = store.capture(&name, CaptureTarget::from(pid))?;
            cli::print_json(&json!({ "screenshot": path }))?;
            Ok(true)
        }
        Command::Baseline { name, pid } => {
            let screenshot = store.capture(&name, CaptureTarget::from(pid))?;
            let baseline = store.promote_baseline(&name, &screenshot)?;
            cli::print_json(&json!({ "screenshot": screenshot, "baseline": baseline }))?;
            Ok(true)
        }
        Command::Compare { name, pid, tolerance } => {
            let baseline = store.existing_baseline(&name)?;
            let current = store.capture(&format!("{name}_compare"), CaptureTarget::from(pid))?;
            let report = compare_images(
                &baseline,
                &current,
                tolerance.unwrap_or(default_tolerance),
                store.screenshots_dir(),
            )?;
            cli::print_json(&report)?;
            Ok(report.passed)
        }
        Command::CompareFiles { file_a, file_b, tolerance } => {
            require_file(&file_a)?;
            require_file(&file_b)?;
            let report = compare_images(
                &file_a,
                &file_b,
                tolerance.unwrap_or(default_tolerance),
                store.screenshots_dir(),
            )?;
            cli::print_json(&report)?;
            Ok(report.passed)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing(args.verbose);
    cli::finish(run(args))
}
