//! Lending Agent
//!
//! Headless client: logs in with the configured account, synchronizes the
//! local cache and polls for borrow request notifications until Ctrl-C.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use lending_client::{
    config::AppConfig,
    logging,
    services::{
        notifications::{NotificationPoller, TracingSink},
        version::UpdateStatus,
    },
    session::SessionEvent,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting Lending Agent v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::init(config)
        .await
        .context("Failed to initialize client")?;
    let services = &state.services;

    match services.version.check_for_update(state.config.agent.version_code).await {
        Ok(UpdateStatus::UpdateRequired(info)) => {
            tracing::error!("Build {} is required, please update", info.version_name);
            anyhow::bail!("client version {} is no longer supported", state.config.agent.version_code);
        }
        Ok(UpdateStatus::UpdateAvailable(info)) => {
            tracing::warn!("Build {} is available", info.version_name);
        }
        Ok(UpdateStatus::UpToDate) => {}
        Err(e) => tracing::warn!("Version check failed: {}", e.user_message()),
    }

    let (Some(contact), Some(password)) = (&state.config.agent.contact, &state.config.agent.password) else {
        tracing::warn!("No agent credentials configured (LENDING_AGENT__CONTACT / LENDING_AGENT__PASSWORD), exiting");
        return Ok(());
    };

    let user = services
        .auth
        .login(contact, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Login failed")?;
    tracing::info!("Logged in as {} ({})", user.name, user.role.label());

    match services.sync.sync_all().await {
        Ok(report) => tracing::info!(?report, "Initial sync completed"),
        Err(e) => tracing::warn!("Initial sync failed: {}", e.user_message()),
    }
    match services.sync.sync_history().await {
        Ok(count) => tracing::info!("Synchronized {} history entries", count),
        Err(e) => tracing::warn!("History sync failed: {}", e.user_message()),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = state.config.poller.enabled.then(|| {
        NotificationPoller::new(
            state.api.clone(),
            state.repository.clone(),
            Arc::new(TracingSink),
            &state.config.poller,
        )
        .spawn(shutdown_rx)
    });

    let mut session_events = state.api.session().subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Shutting down");
        }
        _ = wait_for_expiry(&mut session_events) => {
            tracing::warn!("Session expired, shutting down");
        }
    }

    shutdown_tx.send(true).ok();
    if let Some(handle) = poller {
        handle.await.context("Notification poller panicked")?;
    }

    if let Err(e) = services.auth.logout().await {
        tracing::warn!("Failed to clear local cache: {}", e);
    }

    Ok(())
}

/// Resolves once the server has rejected the session token
async fn wait_for_expiry(events: &mut broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Expired) => return,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}
