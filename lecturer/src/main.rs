mod command;
mod view;

use anyhow::Context;
use attendance::{
    AttendanceSessionController, ClassId, CountdownTiming, HttpAttendanceBackend,
    MemoryTokenStore, SessionSignal,
};
use clap::Parser;
use command::Command;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use util::config::AppConfig;
use util::http::is_url_alive;
use util::logging::init_logging;
use view::{ConsoleNotifier, CountdownView};

/// Open an attendance code for a class and keep it on screen until it expires.
#[derive(Parser, Debug)]
#[command(name = "lecturer", version)]
struct Args {
    /// Class to open attendance for.
    #[arg(long = "class")]
    class_id: String,

    /// Bearer token (overrides ACCESS_TOKEN).
    #[arg(long)]
    token: Option<String>,

    /// API base URL (overrides API_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Print signals as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(url) = &args.base_url {
        AppConfig::set_api_base_url(url.as_str());
    }
    if let Some(token) = &args.token {
        AppConfig::set_access_token(token.as_str());
    }
    let cfg = AppConfig::snapshot();

    let _log_guard = init_logging("logs", &cfg.log_file, &cfg.log_level, cfg.log_to_stdout);
    tracing::info!(env = %cfg.env, base_url = %cfg.api_base_url, "{} starting", cfg.project_name);

    match is_url_alive(&cfg.api_base_url, cfg.api_timeout_secs).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(url = %cfg.api_base_url, "backend answered with an error status")
        }
        Err(e) => tracing::warn!(url = %cfg.api_base_url, error = %e, "backend not reachable"),
    }

    let tokens = Arc::new(MemoryTokenStore::from_config(&cfg));
    let backend =
        HttpAttendanceBackend::from_config(&cfg, tokens).context("failed to build HTTP client")?;
    let ctl = AttendanceSessionController::new(
        Arc::new(backend),
        Arc::new(ConsoleNotifier),
        CountdownTiming::from_config(&cfg),
    );

    let mut view = CountdownView::new(args.json);
    let mut signals = ctl.subscribe();

    let session = ctl
        .start(&ClassId::new(args.class_id))
        .await
        .context("could not start attendance session")?;

    if !args.json {
        view.help();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Ok(signal) => {
                    view.render(&signal);
                    if signal == SessionSignal::Cleared {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "view fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match Command::from_input(line) {
                Command::Extend => {
                    let _ = ctl.extend(&session.id).await;
                }
                Command::Cancel => {
                    let _ = ctl.cancel(&session.id).await;
                }
                Command::Quit => break,
                Command::Help | Command::Unknown => view.help(),
            },
        }
    }

    ctl.shutdown();
    tracing::info!(session_id = %session.id, "lecturer view closed");
    Ok(())
}
