use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use log::debug;

use super::duration_parser::parse_duration;

/// Cross-process event notification through marker files
#[derive(Parser, Debug)]
#[command(name = "vnotify")]
#[command(about = "Publish and subscribe to named events across processes using only the filesystem")]
#[command(version)]
pub struct Args {
    /// Namespace isolating a set of related events
    #[arg(short = 'n', long, value_name = "NAME", default_value = "test", global = true)]
    pub namespace: String,

    /// Directory holding lock and marker files (defaults to the system temp directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Verbose output (debug level logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION", global = true)]
    pub config_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Publish an event
    #[command(name = "pub")]
    Publish {
        /// Event name
        event: String,

        /// Wait up to this long for a subscriber to arm the event (e.g. 500ms, 2s)
        #[arg(short, long, value_name = "DURATION", value_parser = duration_arg)]
        timeout: Option<Duration>,
    },

    /// Subscribe to events and print each one as it fires
    #[command(name = "sub")]
    Subscribe {
        /// Event names
        #[arg(required = true)]
        events: Vec<String>,

        /// Poll interval (e.g. 50ms, 1s)
        #[arg(short, long, value_name = "DURATION", value_parser = duration_arg)]
        interval: Option<Duration>,

        /// Exit after this many events
        #[arg(short, long, value_name = "N")]
        count: Option<usize>,
    },

    /// Block until an event fires once, then exit
    Wait {
        /// Event name
        event: String,

        /// Poll interval (e.g. 50ms, 1s)
        #[arg(short, long, value_name = "DURATION", value_parser = duration_arg)]
        interval: Option<Duration>,
    },
}

fn duration_arg(value: &str) -> std::result::Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {}
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Valid options: text, json",
                args.log_format
            ))
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!("--log-file-level requires --log-file"));
    }

    match &args.command {
        Command::Subscribe { interval: Some(d), .. } | Command::Wait { interval: Some(d), .. }
            if d.is_zero() =>
        {
            Err(anyhow::anyhow!("Poll interval must be greater than 0"))
        }
        Command::Subscribe { count: Some(0), .. } => {
            Err(anyhow::anyhow!("--count must be greater than 0"))
        }
        _ => Ok(()),
    }
}
