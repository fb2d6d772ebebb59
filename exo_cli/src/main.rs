#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod app;
mod cli;
mod error_fmt;
mod logging;
mod ops;
mod replay;
mod session;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use exo_core::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = app::load_config(cli.config.as_deref())?;
    logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    let monitor = app::build_monitor(&cfg)?;
    let stdout = std::io::stdout();

    match &cli.cmd {
        Commands::Session { caller } => {
            let who = caller.session();
            session::serve(&monitor, &who, std::io::stdin().lock(), stdout.lock())?;
        }
        Commands::Replay {
            samples,
            poll_ms,
            rate_hz,
            fast,
            user,
        } => {
            let rows = replay::load_samples_csv(samples)?;
            let params = replay::ReplayParams {
                rate_hz: rate_hz.unwrap_or(cfg.device.sample_rate_hz),
                poll: Duration::from_millis(poll_ms.unwrap_or(cfg.dashboard.poll_ms).max(1)),
                fast: *fast,
            };
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                    tracing::warn!(error = %e, "Ctrl-C handler not installed");
                }
            }
            let viewer = Session::patient(user.clone());
            replay::run(&monitor, &viewer, rows, &params, &shutdown, stdout.lock())?;
        }
        Commands::Command { action } => ops::command(&monitor, action, stdout.lock())?,
        Commands::Note { action } => ops::note(&monitor, action, stdout.lock())?,
        Commands::SelfCheck => ops::self_check(&cfg, &monitor, cli.json, stdout.lock())?,
        Commands::Health => ops::health(&cfg, cli.config.as_deref(), &monitor, stdout.lock())?,
    }
    Ok(())
}
