//! notify-relay: Claude Code notification hook binary.
//!
//! Reads the hook's event JSON from stdin and relays the message to the
//! desktop, the speakers and `.claude/logs/notifications.log`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use notify_relay::announcer::Announcer;
use notify_relay::notifier::DesktopNotifier;
use notify_relay::speech::PiperSpeaker;
use notify_relay::{Config, Relay, RelayError};

#[derive(Parser, Debug)]
#[command(name = "notify-relay", about = "Relay a hook notification to desktop, speech and log")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Notification log file (overrides config)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Skip the desktop popup
    #[arg(long, global = true)]
    no_desktop: bool,

    /// Skip speech synthesis
    #[arg(long, global = true)]
    no_speech: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show recent notifications from the log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Only show entries from this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Report which outputs are available on this host
    Check,
}

fn init_logging(verbose: bool) {
    // stdout belongs to the hook host; diagnostics go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load(args.config.as_deref());
    if let Some(path) = &args.log_file {
        config.log_file = path.clone();
    }
    if args.no_desktop {
        config.desktop.enabled = false;
    }
    if args.no_speech {
        config.speech.enabled = false;
    }
    debug!("Config: {config:?}");

    let result = match args.command {
        None => relay(&config),
        Some(Command::History { limit, date }) => history(&config, limit, date),
        Some(Command::Check) => {
            check(&config);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn relay(config: &Config) -> Result<(), RelayError> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(RelayError::Input)?;

    Relay::from_config(config).run(&input)?;
    Ok(())
}

fn history(config: &Config, limit: usize, date: Option<NaiveDate>) -> Result<(), RelayError> {
    let relay = Relay::from_config(config);
    let entries = relay.log().recent(limit, date)?;

    if entries.is_empty() {
        println!("No notifications in {}", relay.log().path().display());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.message
        );
    }
    Ok(())
}

fn check(config: &Config) {
    let desktop = DesktopNotifier::new(config.desktop.clone());
    let speaker = PiperSpeaker::new(config.speech.clone());

    let status = |available: bool| if available { "available" } else { "unavailable" };

    println!("desktop: {}", status(desktop.is_available()));
    match speaker.binary_path() {
        Some(path) if config.speech.enabled => {
            println!("speech: available ({})", path.display());
        }
        _ => println!("speech: unavailable"),
    }

    let model = &config.speech.model_path;
    let companion = config.speech.resolved_config_path();
    println!(
        "voice model: {} ({})",
        model.display(),
        if model.exists() { "found" } else { "missing" }
    );
    println!(
        "voice config: {} ({})",
        companion.display(),
        if companion.exists() { "found" } else { "missing" }
    );
    println!("log: {}", config.log_file.display());
}
