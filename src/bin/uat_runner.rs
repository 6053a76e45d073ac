use clap::{Parser, Subcommand};
use std::process::ExitCode;

use ax_uat::cli;
use ax_uat::desktop::Desktop;
use ax_uat::uat::{suites, Runner, RunSummary, Selection, TestRegistry};
use ax_uat::Result;

#[derive(Parser)]
#[command(name = "uat-runner", version, about = "Behavioral acceptance test runner")]
struct Args {
    /// Process name of the app under test (default: UAT_APP_NAME)
    #[arg(long, global = true)]
    app: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available suites and tests
    List,
    /// Run tests: everything, one suite, or one test
    Run {
        #[arg(long, conflicts_with = "test")]
        suite: Option<String>,
        #[arg(long)]
        test: Option<String>,
        #[arg(long, short)]
        verbose: bool,
    },
}

fn list(registry: &TestRegistry) {
    println!("Available UAT test suites and tests:\n");
    for (suite, tests) in registry.suites() {
        println!("  Suite: {suite}");
        for name in tests {
            let summary = registry
                .get(name)
                .map(|case| case.summary.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("(no description)");
            println!("    - {name}: {summary}");
        }
        println!();
    }
}

fn run(args: Args) -> Result<bool> {
    let registry = suites::builtin()?;

    let (suite, test, verbose) = match args.command {
        Command::List => {
            list(&registry);
            return Ok(true);
        }
        Command::Run { suite, test, verbose } => (suite, test, verbose),
    };

    let selection = match (test, suite) {
        (Some(test), _) => Selection::Test(test),
        (None, Some(suite)) => Selection::Suite(suite),
        (None, None) => Selection::All,
    };
    let names = registry.select(&selection)?;

    let mut config = cli::load_config();
    if let Some(app) = args.app {
        config.app_name = app;
    }
    let desktop = Desktop::system(config)?;

    let results = Runner::new(&registry, &desktop).verbose(verbose).run(&names);
    let summary = RunSummary::from_results(results);
    println!("{}", summary.render_table());
    cli::print_json(&summary)?;
    Ok(summary.all_passed)
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing(matches!(args.command, Command::Run { verbose: true, .. }));
    cli::finish(run(args))
}
