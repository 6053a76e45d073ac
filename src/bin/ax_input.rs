use clap::{Parser, Subcommand};
use serde_json::json;
use std::process::ExitCode;

use ax_uat::cli::{self, TargetArgs};
use ax_uat::desktop::{Desktop, MatchCriteria, Modifiers, MouseButton, Point};
use ax_uat::Result;

#[derive(Parser)]
#[command(name = "ax-input", version, about = "Drive a running application with synthetic HID input")]
struct Args {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Click at screen coordinates
    Click {
        x: f64,
        y: f64,
        /// Right-click instead of left
        #[arg(long)]
        right: bool,
        #[arg(long)]
        double: bool,
    },
    /// Move the pointer
    Move { x: f64, y: f64 },
    /// Press a key with optional modifiers
    Key {
        /// Key name (e.g. return, a, f1)
        name: String,
        #[arg(long)]
        cmd: bool,
        #[arg(long)]
        shift: bool,
        #[arg(long)]
        alt: bool,
        #[arg(long)]
        ctrl: bool,
    },
    /// Type a string character by character
    Type {
        text: String,
        /// Seconds between characters (default: UAT_INPUT_DELAY_MS)
        #[arg(long)]
        delay: Option<f64>,
    },
    /// Find an element and click its center
    FindClick {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        role: String,
        #[arg(long)]
        title: String,
    },
}

fn run(args: Args) -> Result<bool> {
    let desktop = Desktop::system(cli::load_config())?;

    let body = match args.command {
        Command::Click { x, y, right, double } => {
            let button = if right { MouseButton::Right } else { MouseButton::Left };
            desktop.click_at(Point::new(x, y), button, double)?;
            json!({ "action": "click", "x": x, "y": y, "button": if right { "right" } else { "left" }, "double": double })
        }
        Command::Move { x, y } => {
            desktop.move_mouse(Point::new(x, y))?;
            json!({ "action": "move", "x": x, "y": y })
        }
        Command::Key { name, cmd, shift, alt, ctrl } => {
            let modifiers = Modifiers { cmd, shift, alt, ctrl };
            desktop.press_key(&name, modifiers)?;
            json!({ "action": "key", "key": format!("{}{}", modifiers.label(), name) })
        }
        Command::Type { text, delay } => {
            let delay = delay.map(|s| cli::seconds(s, "--delay")).transpose()?;
            let typed = desktop.type_text(&text, delay)?;
            json!({ "action": "type", "typed": typed, "requested": text.chars().count() })
        }
        Command::FindClick { target, role, title } => {
            let pid = target.resolve(&desktop)?;
            let center = desktop.click_element(pid, &MatchCriteria::role(role).with_title(title))?;
            json!({ "action": "find-click", "pid": pid, "x": center.x, "y": center.y })
        }
    };

    cli::print_json(&body)?;
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_tracing(args.verbose);
    cli::finish(run(args))
}
