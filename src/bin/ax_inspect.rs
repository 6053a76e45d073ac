use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use ax_uat::cli::{self, TargetArgs};
use ax_uat::desktop::serializer::FoundElement;
use ax_uat::desktop::{Desktop, MatchCriteria, Snapshot};
use ax_uat::{diff, wait, HarnessError, Result};

#[derive(Parser)]
#[command(name = "ax-inspect", version, about = "Inspect the accessibility tree of a running application")]
struct Args {
    /// `--app` / `--pid`, accepted before or after the subcommand
    #[command(flatten)]
    target: TargetArgs,

    /// Max tree depth (default: UAT_MAX_DEPTH or 10)
    #[arg(long, global = true)]
    depth: Option<usize>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the tree and print it as JSON
    Dump,
    /// Find elements matching criteria
    Find {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Diff the current tree against a saved snapshot
    Diff {
        /// Path to a JSON snapshot written by `dump`
        snapshot: PathBuf,
    },
    /// Wait for an element to appear (or disappear with --gone)
    Wait {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        gone: bool,
        /// Seconds to wait (default: UAT_TIMEOUT_MS)
        #[arg(long)]
        timeout: Option<f64>,
    },
}

fn criteria(role: Option<String>, title: Option<String>, description: Option<String>) -> MatchCriteria {
    MatchCriteria { role, title, description }
}

fn load_snapshot(path: &PathBuf) -> Result<Snapshot> {
    if !path.exists() {
        return Err(HarnessError::not_found(format!("snapshot file {}", path.display())));
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn run(args: Args) -> Result<bool> {
    let mut config = cli::load_config();
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    let default_timeout = config.default_timeout;
    let desktop = Desktop::system(config)?;
    let pid = args.target.resolve(&desktop)?;

    match args.command {
        Command::Dump => {
            cli::print_json(&desktop.snapshot(pid))?;
            Ok(true)
        }
        Command::Find { role, title, description } => {
            let criteria = criteria(role, title, description);
            let found: Vec<FoundElement> = desktop
                .find_all(pid, &criteria)
                .iter()
                .map(FoundElement::from_node)
                .collect();
            tracing::info!("{} element(s) match {}", found.len(), criteria);
            cli::print_json(&found)?;
            Ok(!found.is_empty())
        }
        Command::Diff { snapshot } => {
            let old = load_snapshot(&snapshot)?;
            let changes = diff::diff(&old, &desktop.snapshot(pid));
            for change in &changes {
                tracing::info!("{}", change);
            }
            cli::print_json(&json!({ "identical": changes.is_empty(), "changes": changes }))?;
            Ok(true)
        }
        Command::Wait { role, title, gone, timeout } => {
            let criteria = criteria(role, title, None);
            let timeout = match timeout {
                Some(s) => cli::seconds(s, "--timeout")?,
                None => default_timeout,
            };
            let outcome = if gone {
                wait::wait_for_element_gone(&desktop, pid, &criteria, timeout)
            } else {
                wait::wait_for_element(&desktop, pid, &criteria, timeout)
            };
            let element = outcome.value.as_ref().map(FoundElement::from_node);
            cli::print_json(&json!({
                "success": outcome.success,
                "elapsed_s": (outcome.elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
                "criteria": criteria,
                "element": element,
            }))?;
            Ok(outcome.success)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing(args.verbose);
    cli::finish(run(args))
}
