//! Connection keep-alive: periodic pings and a deadman timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Error;
use crate::events::Event;
use crate::session::McsSession;

/// Default interval between client-sent pings.
pub const DEFAULT_CLIENT_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Smallest server ping interval MCS accepts.
pub const MIN_SERVER_INTERVAL: Duration = Duration::from_secs(60);

const DEADMAN_FACTOR: u32 = 4;

/// Heartbeat configuration.
///
/// At least one interval must be positive for the heartbeat task to run at
/// all; with both zero the session relies on TCP keep-alive alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Interval between client-sent pings; zero disables them
    pub client_interval: Duration,
    /// Ping interval requested from the server via the `hbping` login
    /// setting; zero leaves the server default; values are clamped to
    /// [`MIN_SERVER_INTERVAL`]
    pub server_interval: Duration,
    /// Silence window after which the connection is forcibly dropped;
    /// zero defaults to 4 × max(client, server) interval
    pub deadman_timeout: Duration,
    /// Advertise adaptive heartbeating at login
    pub adaptive: bool,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            client_interval: DEFAULT_CLIENT_INTERVAL,
            server_interval: Duration::ZERO,
            deadman_timeout: Duration::ZERO,
            adaptive: false,
        }
    }
}

impl HeartbeatConfig {
    /// Whether any heartbeat activity is configured.
    pub fn is_active(&self) -> bool {
        !self.client_interval.is_zero() || !self.server_interval.is_zero()
    }

    /// Clamp intervals to their permitted ranges.
    pub(crate) fn normalized(mut self) -> Self {
        if !self.server_interval.is_zero() {
            self.server_interval = self.server_interval.max(MIN_SERVER_INTERVAL);
        }
        self
    }

    /// The deadman window actually enforced.
    pub(crate) fn effective_deadman(&self) -> Duration {
        if !self.deadman_timeout.is_zero() {
            return self.deadman_timeout;
        }
        self.client_interval.max(self.server_interval) * DEADMAN_FACTOR
    }
}

/// Run the heartbeat sidecar.
///
/// Terminates on cancellation, when the ack channel closes (the session is
/// gone), when a ping write fails (the read pump surfaces that error), or
/// after the deadman fires and forces a disconnect.
pub(crate) async fn run(
    config: HeartbeatConfig,
    session: Arc<McsSession>,
    mut ack: mpsc::Receiver<()>,
    cancel: CancellationToken,
    events: mpsc::Sender<Event>,
) {
    let deadman_timeout = config.effective_deadman();
    let deadman = time::sleep(deadman_timeout);
    tokio::pin!(deadman);

    let mut ticker = if config.client_interval.is_zero() {
        None
    } else {
        let mut ticker = time::interval_at(
            Instant::now() + config.client_interval,
            config.client_interval,
        );
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        Some(ticker)
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("heartbeat stopped");
                return;
            }

            received = ack.recv() => {
                match received {
                    Some(()) => deadman.as_mut().reset(Instant::now() + deadman_timeout),
                    // ack channel closed: the session disconnected
                    None => return,
                }
            }

            _ = deadman.as_mut() => {
                warn!(timeout = ?deadman_timeout, "no heartbeat ack; forcing disconnect");
                let error = Arc::new(Error::HeartbeatTimeout);
                events.send(Event::HeartbeatError { error }).await.ok();
                session.disconnect(Some("heartbeat timeout".to_string())).await;
                cancel.cancel();
                return;
            }

            _ = tick(&mut ticker) => {
                if let Err(error) = session.send_heartbeat_ping().await {
                    debug!(%error, "heartbeat ping failed");
                    return;
                }
                debug!("heartbeat ping sent");
            }
        }
    }
}

async fn tick(ticker: &mut Option<time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
