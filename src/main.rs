//! Lobbykeeper - lobby chat router for a multiplayer game server
//!
//! Routes chat from in-app sessions, an external chat bridge, and the
//! server itself to the lobby or to game rooms, persists every line,
//! and dispatches slash commands.

mod bridge;
mod chat;
mod commands;
mod common;
mod config;
mod lobby;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use bridge::{BridgeChannel, BridgeChannels, BridgeOutbound, BridgeRelay};
use chat::{ChatRouter, JsonlChatStore, RouterSettings};
use commands::builtin::{standard_table, BuiltinDeps};
use commands::{ControlSignal, WaitingList};
use common::InboundEvent;
use config::env::get_config_path;
use config::{defaults_with_env, load_and_validate, BridgeConfig};
use lobby::{InMemoryGames, InMemoryRoster, RecipientResolver};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Lobbykeeper v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}...", config_path);
        load_and_validate(&config_path).map_err(|e| {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure {} is properly formatted.", config_path);
            e
        })?
    } else {
        warn!("{} not found, using default configuration", config_path);
        defaults_with_env()?
    };

    info!("Configuration loaded successfully");
    info!("  Chat log: {}", config.storage.chat_log);
    info!("  Max message length: {}", config.chat.max_length);
    info!(
        "  Bridge: {}",
        if config.bridge.enabled { "enabled" } else { "disabled" }
    );

    // ============================================================
    // Build the router and its collaborators
    // ============================================================
    let store = Arc::new(JsonlChatStore::open(&config.storage.chat_log)?);
    info!("Appending chat log to {}", store.path().display());
    let roster = Arc::new(InMemoryRoster::new());
    let games = Arc::new(InMemoryGames::new());
    let waiting_list = Arc::new(WaitingList::new());

    let BridgeChannels {
        outbound_tx,
        outbound_rx,
    } = BridgeChannels::new();
    let relay = if config.bridge.enabled {
        BridgeRelay::new(outbound_tx, config.bridge.external_commands.iter().cloned())
    } else {
        drop(outbound_tx);
        BridgeRelay::disabled()
    };
    let relay = Arc::new(relay);
    debug!(enabled = relay.is_enabled(), "Bridge relay ready");

    let (control_tx, control_rx) = mpsc::unbounded_channel::<ControlSignal>();
    let commands = standard_table(BuiltinDeps {
        waiting_list: waiting_list.clone(),
        bridge: relay.clone(),
        control_tx,
        here_cooldown: Duration::from_secs(config.commands.here_cooldown_secs),
    });

    let settings = RouterSettings {
        max_length: config.chat.max_length,
        server_name: config.chat.server_name.clone(),
    };
    let router = Arc::new(ChatRouter::new(
        settings,
        store,
        RecipientResolver::new(roster.clone(), games.clone()),
        relay,
        commands,
    ));

    // ============================================================
    // Spawn tasks
    // ============================================================

    // Task 1: outbound bridge lines
    let forward_to_bridge = tokio::spawn(forward_bridge(outbound_rx, config.bridge.clone()));

    // Task 2: operator console, one server message per stdin line
    let console = {
        let router = router.clone();
        let server_name = config.chat.server_name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => router.route(InboundEvent::server(server_name.clone(), line)),
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read console input: {}", e);
                        break;
                    }
                }
            }
            info!("Console input closed");
        })
    };

    info!("Lobbykeeper is ready");

    // ============================================================
    // Wait for a shutdown or restart request
    // ============================================================
    let requested = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        signal = handle_control(control_rx, roster.clone(), games.clone(), waiting_list.clone()) => signal,
    };

    if requested == Some(ControlSignal::Graceful) {
        info!("Waiting for ongoing games to finish before restarting...");
        tokio::select! {
            _ = wait_for_idle(&games) => info!("All games finished"),
            _ = shutdown_signal() => info!("Shutdown signal received while waiting for games"),
        }
    }

    console.abort();
    drop(router);
    // The forwarder drains whatever is queued once the last relay handle is gone.
    match tokio::time::timeout(Duration::from_secs(5), forward_to_bridge).await {
        Ok(Ok(())) => debug!("Bridge forwarder finished"),
        Ok(Err(e)) => warn!("Bridge forwarder task panicked: {}", e),
        Err(_) => warn!("Bridge forwarder did not finish in time"),
    }

    if requested.is_some() {
        info!("Exiting for restart...");
    } else {
        info!("Exiting...");
    }
    // A pending stdin read cannot be cancelled and would hold up runtime shutdown.
    std::process::exit(0)
}

/// Log every outbound bridge line under its configured channel name.
async fn forward_bridge(mut rx: mpsc::UnboundedReceiver<BridgeOutbound>, config: BridgeConfig) {
    while let Some(msg) = rx.recv().await {
        let channel = match msg.channel {
            BridgeChannel::Primary => &config.primary_channel,
            BridgeChannel::Secondary => &config.secondary_channel,
        };
        if msg.display_name.is_empty() {
            info!(channel = %channel, "[bridge] {}", msg.text);
        } else {
            info!(channel = %channel, "[bridge] <{}> {}", msg.display_name, msg.text);
        }
    }
    debug!("Bridge forwarding task ended");
}

/// Act on control signals until one of them asks for a restart.
async fn handle_control(
    mut rx: mpsc::UnboundedReceiver<ControlSignal>,
    roster: Arc<InMemoryRoster>,
    games: Arc<InMemoryGames>,
    waiting_list: Arc<WaitingList>,
) -> Option<ControlSignal> {
    while let Some(signal) = rx.recv().await {
        match signal {
            ControlSignal::Debug => {
                info!(
                    sessions = roster.len(),
                    games = games.len(),
                    waiting = ?waiting_list.snapshot(),
                    "Debug dump"
                );
            }
            ControlSignal::Restart | ControlSignal::Graceful => {
                info!("{:?} requested", signal);
                return Some(signal);
            }
        }
    }
    // Every sender is gone; only an OS signal can stop us now.
    std::future::pending().await
}

async fn wait_for_idle(games: &InMemoryGames) {
    let mut interval = tokio::time::interval(Duration::from_secs(5));
    loop {
        interval.tick().await;
        if games.is_empty() {
            return;
        }
        debug!("{} games still in progress", games.len());
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
