//! FCM web-push receiver binary.
//!
//! Registers (or resumes) a web-push endpoint for the configured Firebase
//! project and prints every decrypted push message. Credentials and the
//! received persistent-id list are persisted next to the config so a
//! restart resumes the same endpoint without redelivery.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use push_client::{ClientConfig, ClientOptions, Event, HeartbeatConfig, PushClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod store;

/// FCM web-push receiver
#[derive(Parser, Debug)]
#[command(name = "push-receiver", version, about = "FCM web-push receiver")]
struct Args {
    /// FCM config file (apiKey / projectId / appId / vapidKey)
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// File where minted credentials are persisted
    #[arg(long, default_value = "credentials.json")]
    credentials: PathBuf,

    /// Newline-delimited list of received persistent ids
    #[arg(long, default_value = "persistent_id.txt")]
    persistent_ids: PathBuf,

    /// Client-side heartbeat interval, e.g. 2m
    #[arg(long, default_value = "10m")]
    heartbeat_interval: humantime::Duration,

    /// Ping interval requested from the server, e.g. 1m (0s = server default)
    #[arg(long, default_value = "0s")]
    server_heartbeat_interval: humantime::Duration,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::new(format!(
        "push_receiver={level},push_client={level},push_register={level},push_wire={level}",
        level = args.log_level
    ));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = store::load_config(&args.config)
        .with_context(|| format!("load config {:?}", args.config))?;
    let credentials = store::load_credentials(&args.credentials)
        .with_context(|| format!("load credentials {:?}", args.credentials))?;
    let persistent_ids = store::load_persistent_ids(&args.persistent_ids)
        .with_context(|| format!("load persistent ids {:?}", args.persistent_ids))?;

    info!(
        project_id = %config.project_id,
        registered = credentials.is_some(),
        replayed = persistent_ids.len(),
        "starting push receiver"
    );

    let (client, mut events) = PushClient::with_options(
        ClientConfig {
            api_key: config.api_key,
            project_id: config.project_id,
            app_id: config.app_id,
            vapid_key: config.vapid_key,
        },
        ClientOptions {
            credentials,
            received_persistent_ids: persistent_ids,
            heartbeat: HeartbeatConfig {
                client_interval: args.heartbeat_interval.into(),
                server_interval: args.server_heartbeat_interval.into(),
                ..HeartbeatConfig::default()
            },
            ..ClientOptions::default()
        },
    );

    let cancel = CancellationToken::new();
    let runner = tokio::spawn(client.run(cancel.clone()));

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; shutting down");
            interrupt.cancel();
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            Event::UpdateCredentials { credentials } => {
                info!(token = %credentials.token, "registration token updated");
                store::save_credentials(&args.credentials, &credentials)?;
            }
            Event::Connected { server_timestamp } => {
                info!(server_timestamp, "connected");
                store::clear_persistent_ids(&args.persistent_ids)?;
            }
            Event::Message(message) => {
                info!(
                    persistent_id = %message.persistent_id,
                    from = %message.from,
                    "message: {}",
                    String::from_utf8_lossy(&message.data)
                );
                if !message.persistent_id.is_empty() {
                    store::append_persistent_id(&args.persistent_ids, &message.persistent_id)?;
                }
            }
            Event::Disconnected { reason } => {
                warn!(reason = reason.as_deref().unwrap_or("shutdown"), "disconnected");
            }
            Event::Retry { error, retry_after } => {
                warn!(%error, ?retry_after, "retrying");
            }
            Event::HeartbeatError { error } => {
                warn!(%error, "heartbeat");
            }
            Event::Unauthorized { error } => {
                warn!(%error, "credentials rejected; re-registering");
            }
        }
    }

    cancel.cancel();
    let _ = runner.await;
    Ok(())
}
