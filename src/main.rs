//! skirmish - console combat tracker
//!
//! Reads narration and commands from stdin and tracks combat for one channel.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use skirmish::console::{self, Command, USAGE};
use skirmish::display::{ConsolePublisher, DisplayUpdateQueue};
use skirmish::store::SessionStore;
use skirmish::{ChannelId, CombatTracker, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Narrated combat tracker
#[derive(Parser, Debug)]
#[command(
    name = "skirmish",
    version,
    about = "Track combat state from narration typed on stdin"
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channel id to track
    #[arg(long, default_value = "console")]
    channel: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let publisher = Arc::new(ConsolePublisher::new());
    let (display, display_task) = DisplayUpdateQueue::spawn(publisher, config.display_queue_capacity);
    let tracker = CombatTracker::new(SessionStore::shared(), display);
    let channel = ChannelId::from(args.channel);

    info!(%channel, "skirmish ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(command) => {
                for out in console::execute(&tracker, &channel, command).await {
                    println!("{}", out);
                }
            }
            Err(e) => println!("{}\n{}", e, USAGE),
        }
    }

    // Closing the queue lets the display task drain and exit
    drop(tracker);
    display_task.await?;

    Ok(())
}
