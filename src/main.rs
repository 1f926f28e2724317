mod app;

use anyhow::Result;
use log::error;
use std::process;
use vnotify::{cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let notify_config = app::notify_config(&args, &config_manager)?;

    app::run_command(&args.command, &args.namespace, notify_config)
}
