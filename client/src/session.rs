//! Per-connection MCS session: login, tag dispatch, stream-id tracking.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use push_register::{Credentials, CHROME_VERSION};
use push_wire::proto::mcs::{self, login_request::AuthService};
use push_wire::{FrameReader, FrameWriter, McsPacket};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::error::Error;
use crate::events::{Event, Message};
use crate::heartbeat::HeartbeatConfig;
use crate::payload;
use crate::transport::IoStream;

/// MCS login domain.
const MCS_DOMAIN: &str = "mcs.android.com";
/// Account id the Chrome client logs in under.
const ACCOUNT_ID: i64 = 1_000_000;
/// `network_type` value for Wi-Fi.
const NETWORK_TYPE_WIFI: i32 = 1;

/// State for one MCS connection.
///
/// The read pump is the only writer of `incoming_stream_id`; the ack
/// signal has one producer (the read pump) and one consumer (the
/// heartbeat). Frame writes from the read pump and the heartbeat are
/// serialized through the writer mutex so frames never interleave.
pub(crate) struct McsSession {
    writer: Mutex<FrameWriter<WriteHalf<IoStream>>>,
    incoming_stream_id: AtomicI32,
    ack_tx: Mutex<Option<mpsc::Sender<()>>>,
    disconnected: AtomicBool,
    events: mpsc::Sender<Event>,
}

impl McsSession {
    /// Split the stream into session state, the read half for the pump,
    /// and the ack receiver for the heartbeat.
    pub(crate) fn new(
        stream: IoStream,
        events: mpsc::Sender<Event>,
    ) -> (Arc<Self>, FrameReader<ReadHalf<IoStream>>, mpsc::Receiver<()>) {
        let (read_half, write_half) = tokio::io::split(stream);
        let (ack_tx, ack_rx) = mpsc::channel(1);
        let session = Arc::new(Self {
            writer: Mutex::new(FrameWriter::new(write_half)),
            incoming_stream_id: AtomicI32::new(0),
            ack_tx: Mutex::new(Some(ack_tx)),
            disconnected: AtomicBool::new(false),
            events,
        });
        (session, FrameReader::new(read_half), ack_rx)
    }

    /// Last server stream id observed; 0 until a frame carries one.
    pub(crate) fn stream_id(&self) -> i32 {
        self.incoming_stream_id.load(Ordering::Acquire)
    }

    fn observe_stream_id(&self, last_stream_id_received: Option<i32>) {
        if let Some(id) = last_stream_id_received {
            if id > 0 {
                self.incoming_stream_id.fetch_max(id, Ordering::AcqRel);
            }
        }
    }

    async fn signal_ack(&self) {
        if let Some(ack) = self.ack_tx.lock().await.as_ref() {
            // a full channel already holds a pending deadman reset
            let _ = ack.try_send(());
        }
    }

    /// Send the version-prefixed login frame carrying the replay set.
    pub(crate) async fn send_login(
        &self,
        credentials: &Credentials,
        received_persistent_ids: &[String],
        heartbeat: &HeartbeatConfig,
    ) -> Result<(), Error> {
        let android_id = credentials.android_id.to_string();

        let mut setting = vec![mcs::Setting {
            name: "new_vc".to_string(),
            value: "1".to_string(),
        }];
        if !heartbeat.server_interval.is_zero() {
            setting.push(mcs::Setting {
                name: "hbping".to_string(),
                value: heartbeat.server_interval.as_millis().to_string(),
            });
        }

        let request = mcs::LoginRequest {
            id: format!("chrome-{CHROME_VERSION}"),
            domain: MCS_DOMAIN.to_string(),
            user: Some(android_id.clone()),
            resource: android_id,
            auth_token: credentials.security_token.to_string(),
            device_id: Some(format!("android-{:x}", credentials.android_id)),
            // sending is not enabled, so the rmq id stays at 1
            last_rmq_id: Some(1),
            setting,
            received_persistent_id: received_persistent_ids.to_vec(),
            adaptive_heartbeat: Some(heartbeat.adaptive),
            use_rmq2: Some(true),
            account_id: Some(ACCOUNT_ID),
            auth_service: Some(AuthService::AndroidId as i32),
            network_type: Some(NETWORK_TYPE_WIFI),
            ..Default::default()
        };

        self.send(McsPacket::LoginRequest(request)).await
    }

    /// Send a ping carrying the latest observed stream id.
    pub(crate) async fn send_heartbeat_ping(&self) -> Result<(), Error> {
        let ping = mcs::HeartbeatPing {
            last_stream_id_received: Some(self.stream_id()),
            ..Default::default()
        };
        self.send(McsPacket::HeartbeatPing(ping)).await
    }

    async fn send_heartbeat_ack(&self) -> Result<(), Error> {
        let ack = mcs::HeartbeatAck {
            last_stream_id_received: Some(self.stream_id()),
            ..Default::default()
        };
        self.send(McsPacket::HeartbeatAck(ack)).await
    }

    async fn send(&self, packet: McsPacket) -> Result<(), Error> {
        let mut writer = self.writer.lock().await;
        writer.send(&packet).await?;
        Ok(())
    }

    /// Validate the server's version byte, then pump frames until a fatal
    /// error or until the future is dropped by cancellation.
    pub(crate) async fn read_loop(
        &self,
        mut reader: FrameReader<ReadHalf<IoStream>>,
        credentials: Credentials,
        persistent_ids: Arc<Mutex<Vec<String>>>,
    ) -> Result<(), Error> {
        reader.read_version().await?;
        loop {
            let packet = reader.read_packet().await?;
            self.handle_packet(packet, &credentials, &persistent_ids)
                .await?;
        }
    }

    async fn handle_packet(
        &self,
        packet: McsPacket,
        credentials: &Credentials,
        persistent_ids: &Mutex<Vec<String>>,
    ) -> Result<(), Error> {
        match packet {
            McsPacket::LoginResponse(response) => {
                self.observe_stream_id(response.last_stream_id_received);
                if let Some(error) = &response.error {
                    warn!(
                        code = error.code,
                        detail = error.message.as_deref().unwrap_or(""),
                        "login response carried an error"
                    );
                }
                // the server has flushed its replay queue
                persistent_ids.lock().await.clear();
                let server_timestamp = response.server_timestamp.unwrap_or(0);
                debug!(server_timestamp, "logged in to MCS");
                self.events
                    .send(Event::Connected { server_timestamp })
                    .await
                    .ok();
                Ok(())
            }

            McsPacket::HeartbeatPing(ping) => {
                self.observe_stream_id(ping.last_stream_id_received);
                self.signal_ack().await;
                self.send_heartbeat_ack().await
            }

            McsPacket::HeartbeatAck(ack) => {
                self.observe_stream_id(ack.last_stream_id_received);
                debug!(stream_id = self.stream_id(), "heartbeat ack received");
                self.signal_ack().await;
                Ok(())
            }

            McsPacket::IqStanza(iq) => {
                self.observe_stream_id(iq.last_stream_id_received);
                debug!(id = %iq.id, "ignoring iq stanza");
                Ok(())
            }

            McsPacket::DataMessageStanza(stanza) => {
                self.observe_stream_id(stanza.last_stream_id_received);
                // record the id before decrypting so a bad payload cannot
                // cause a redelivery loop
                if let Some(id) = stanza.persistent_id.as_ref().filter(|id| !id.is_empty()) {
                    persistent_ids.lock().await.push(id.clone());
                }
                match payload::decrypt_message(&stanza, credentials) {
                    Ok(data) => {
                        let message = Message {
                            persistent_id: stanza.persistent_id.unwrap_or_default(),
                            from: stanza.from,
                            to: stanza.to.unwrap_or_default(),
                            ttl: stanza.ttl.unwrap_or(0),
                            sent: stanza.sent.unwrap_or(0),
                            data,
                        };
                        self.events.send(Event::Message(message)).await.ok();
                    }
                    Err(error) => {
                        warn!(
                            %error,
                            persistent_id = stanza.persistent_id.as_deref().unwrap_or(""),
                            "dropping undecryptable message"
                        );
                    }
                }
                Ok(())
            }

            McsPacket::Close(_) => Err(Error::ServerClose),

            McsPacket::StreamErrorStanza(error) => Err(Error::Stream(match error.text {
                Some(text) => format!("{}: {}", error.r#type, text),
                None => error.r#type,
            })),

            McsPacket::LoginRequest(_) => {
                warn!("ignoring unexpected login request from server");
                Ok(())
            }
        }
    }

    /// Tear the session down exactly once: close the connection, close the
    /// ack signal, then emit `Disconnected`.
    pub(crate) async fn disconnect(&self, reason: Option<String>) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(
            reason = reason.as_deref().unwrap_or("shutdown"),
            "disconnecting MCS session"
        );
        {
            let mut writer = self.writer.lock().await;
            let _ = writer.shutdown().await;
        }
        self.ack_tx.lock().await.take();
        self.events.send(Event::Disconnected { reason }).await.ok();
    }
}
