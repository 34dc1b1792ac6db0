// Bowl pool report entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout carries only the report)
// 2. Load config from BASE_DIR, the working directory, or the user data dir
// 3. Load pool data, compute the report, print it

use std::path::PathBuf;

use anyhow::Context;
use bowlpool_app::{config, report};
use bowlpool_core::simulation::CancelToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = match std::env::args_os().nth(1) {
        Some(arg) => {
            let base_dir = PathBuf::from(arg);
            config::load_config_in(&base_dir).with_context(|| {
                format!("failed to load configuration from {}", base_dir.display())
            })?
        }
        None => config::load_config().context("failed to load configuration")?,
    };
    info!(
        "Config loaded: pool={}, {} iterations",
        config.pool.name, config.simulation.iterations
    );

    // Ctrl+C stops the simulation at the next chunk boundary.
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling simulation");
            on_signal.cancel();
        }
    });

    let output = report::run(&config, Some(&cancel))
        .await
        .context("failed to build report")?;
    println!("{output}");

    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bowlpool=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
