// Entry point: load every input once, print a summary, then serve the
// dashboard until the process is stopped.
//
// Startup is all-or-nothing: a missing input file or a malformed coordinate
// aborts before the listener binds, so there is never a partial dashboard.
use anyhow::Context;
use atm_dashboard::config::Config;
use atm_dashboard::{output, server, Dataset};
use std::sync::Arc;

/// Rows shown in the startup participant table.
const SUMMARY_ROWS: usize = 40;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,atm_dashboard=debug,tower_http=info"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env().context("invalid configuration")?;
    let dataset = Dataset::load(&config).context("failed to load dashboard data")?;
    output::print_startup_summary(&dataset, SUMMARY_ROWS);

    server::serve(Arc::new(dataset), &config.bind_addr())
        .await
        .with_context(|| format!("server on {} stopped", config.bind_addr()))?;
    Ok(())
}
