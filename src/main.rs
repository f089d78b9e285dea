use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pawsched::{app, app_state::AppState, config, db, notify::Notifier, scheduling::sweep};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let env = config::init()?.clone();
    let pool = db::init_pool().await?;

    let notifier = Notifier::default();
    let state = AppState::new(pool.clone(), env.clone(), notifier);

    // Time-based session/purchase transitions run off a background ticker.
    sweep::spawn_sweeper(
        pool,
        Duration::from_secs(env.scheduling.sweep_interval_secs),
    );

    let app = app::create_router(state);
    let addr = env.server_addr();
    info!("{} listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
