// Lineup assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config (copying defaults into place on first run)
// 3. Build the feed source, optimizer, and session store
// 4. Serve the HTTP routes until Ctrl+C

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use lineup_assistant::config;
use lineup_assistant::lineup::solver::IlpOptimizer;
use lineup_assistant::pool::loader::RemoteCsvSource;
use lineup_assistant::server::session::SessionStore;
use lineup_assistant::server::{routes, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Lineup assistant starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: ${} cap, {}-{} teams per lineup, feed timeout {}s",
        config.contest.salary_cap,
        config.contest.min_teams,
        config.contest.max_teams,
        config.source.fetch_timeout_secs
    );

    let source =
        RemoteCsvSource::new(&config.source).context("failed to build the feed client")?;

    let ctx = AppContext {
        contest: config.contest.clone(),
        weights: config.projection.clone(),
        source: Arc::new(source),
        optimizer: Arc::new(IlpOptimizer::new()),
        sessions: Arc::new(SessionStore::new()),
    };

    let port = config.server.port;
    info!("Serving on http://127.0.0.1:{port}");

    let (_, server) = warp::serve(routes(ctx)).bind_with_graceful_shutdown(
        ([127, 0, 0, 1], port),
        async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        },
    );
    server.await;

    info!("Lineup assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to stdout, honoring RUST_LOG when set.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup_assistant=info,warn")),
        )
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
