// Inspect the host's media sessions without a JVM
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use mediatransport4j::{build_snapshots, dispatch, logging, settings, NativePlatform, SessionAction};

#[derive(Parser)]
#[command(name = "mediatransport-dump", about = "List media sessions or send them transport commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every live session as JSON
    List,
    /// Skip to the next item
    Next { index: i32 },
    /// Skip to the previous item
    Previous { index: i32 },
    Play { index: i32 },
    Pause { index: i32 },
    /// Toggle between playing and paused
    Toggle { index: i32 },
    Stop { index: i32 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::current();
    logging::init(&settings.log_filter);

    let platform = NativePlatform::default();
    let (index, action) = match cli.command {
        Command::List => {
            let Some(snapshots) = build_snapshots(&platform, &settings.timeouts) else {
                bail!("media sessions are not available");
            };
            let json = serde_json::to_string_pretty(&snapshots)
                .context("Failed to serialize session snapshots")?;
            println!("{}", json);
            return Ok(());
        }
        Command::Next { index } => (index, SessionAction::Next),
        Command::Previous { index } => (index, SessionAction::Previous),
        Command::Play { index } => (index, SessionAction::Play),
        Command::Pause { index } => (index, SessionAction::Pause),
        Command::Toggle { index } => (index, SessionAction::TogglePlayPause),
        Command::Stop { index } => (index, SessionAction::Stop),
    };

    let accepted = dispatch(&platform, index, action, &settings.timeouts);
    println!("{}", accepted);
    Ok(())
}
