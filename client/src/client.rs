//! Top-level client: registration, connection supervision, reconnect.

use std::sync::Arc;
use std::time::Duration;

use push_crypto::WebPushKeys;
use push_register::{Credentials, IdentityClient, InstallClient};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::config::{ClientConfig, ClientOptions, DEFAULT_HTTP_TIMEOUT};
use crate::error::Error;
use crate::events::Event;
use crate::heartbeat::{self, HeartbeatConfig};
use crate::session::McsSession;
use crate::transport;

/// FCM push receive client.
///
/// Owns the credentials, the MCS connection, both heartbeat timers, and
/// the write end of the event bus; the embedder owns the read end returned
/// by [`new`](PushClient::new). [`run`](PushClient::run) drives
/// registration, connection, and reconnection until the token is
/// cancelled; the event bus closes exactly once, when `run` returns.
pub struct PushClient {
    identity: IdentityClient,
    install: InstallClient,
    app_id: String,
    credentials: Option<Credentials>,
    persistent_ids: Arc<Mutex<Vec<String>>>,
    backoff: Backoff,
    heartbeat: HeartbeatConfig,
    retry: bool,
    tls: Arc<rustls::ClientConfig>,
    dial_timeout: Duration,
    keep_alive: Duration,
    mcs_server: String,
    events: mpsc::Sender<Event>,
}

impl PushClient {
    /// Create a client with default options.
    pub fn new(config: ClientConfig) -> (Self, mpsc::Receiver<Event>) {
        Self::with_options(config, ClientOptions::default())
    }

    /// Create a client with explicit options.
    pub fn with_options(
        config: ClientConfig,
        options: ClientOptions,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (events, events_rx) = mpsc::channel(options.event_capacity.max(1));
        // registration calls are bounded even when cancellation never fires
        let http = options.http.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default()
        });

        let identity = IdentityClient::new(
            http.clone(),
            options.endpoints.clone(),
            config.app_id.clone(),
        );
        let install = InstallClient::new(
            http,
            options.endpoints,
            config.api_key,
            config.project_id,
            config.app_id.clone(),
            config.vapid_key,
        );

        let client = Self {
            identity,
            install,
            app_id: config.app_id,
            credentials: options.credentials,
            persistent_ids: Arc::new(Mutex::new(options.received_persistent_ids)),
            backoff: options.backoff,
            heartbeat: options.heartbeat.normalized(),
            retry: options.retry,
            tls: options.tls.unwrap_or_else(transport::default_tls_config),
            dial_timeout: options.dial_timeout,
            keep_alive: options.keep_alive,
            mcs_server: options.mcs_server,
            events,
        };
        (client, events_rx)
    }

    /// Run until cancelled: (re)register, connect, pump events, and back
    /// off on failure. Consumes the client; dropping its bus sender on
    /// return is what closes the event stream.
    pub async fn run(mut self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            let result = self.subscribe_once(&cancel).await;
            let Err(error) = result else {
                continue;
            };

            let error = Arc::new(error);
            if error.is_unauthorized() {
                warn!(%error, "credentials rejected; forcing re-registration");
                self.credentials = None;
                self.events
                    .send(Event::Unauthorized {
                        error: error.clone(),
                    })
                    .await
                    .ok();
            }
            if !self.retry {
                break;
            }

            let retry_after = self.backoff.next();
            debug!(%error, ?retry_after, "scheduling retry");
            self.events
                .send(Event::Retry { error, retry_after })
                .await
                .ok();
            tokio::select! {
                _ = tokio::time::sleep(retry_after) => {}
                _ = cancel.cancelled() => break,
            }
        }
        info!("push client stopped");
    }

    /// One supervisor iteration; `Ok` means it ended through cancellation.
    async fn subscribe_once(&mut self, cancel: &CancellationToken) -> Result<(), Error> {
        let credentials = match self.ensure_registered(cancel).await {
            Ok(credentials) => credentials,
            // cancellation mid-registration is a clean exit, not a retry
            Err(_) if cancel.is_cancelled() => return Ok(()),
            Err(error) => return Err(error),
        };
        self.connect(credentials, cancel).await
    }

    /// Register from scratch, or validate stored credentials with a
    /// check-in. The token aborts whichever endpoint call is in flight.
    async fn ensure_registered(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Credentials, Error> {
        if let Some(credentials) = &self.credentials {
            self.identity
                .check_in(credentials.android_id, credentials.security_token, cancel)
                .await?;
            return Ok(credentials.clone());
        }

        let credentials = self.register(cancel).await?;
        self.credentials = Some(credentials.clone());
        self.events
            .send(Event::UpdateCredentials {
                credentials: credentials.clone(),
            })
            .await
            .ok();
        Ok(credentials)
    }

    async fn register(&self, cancel: &CancellationToken) -> Result<Credentials, Error> {
        let device = self.identity.check_in(0, 0, cancel).await?;
        let gcm_token = self.identity.register_device(&device, cancel).await?;

        let keys = WebPushKeys::generate();
        let installation_token = self.install.install(cancel).await?;
        let token = self
            .install
            .register_web(&gcm_token, &keys, &installation_token, cancel)
            .await?;
        info!(android_id = device.android_id, "registered with FCM");

        Ok(Credentials {
            app_id: self.app_id.clone(),
            android_id: device.android_id,
            security_token: device.security_token,
            token,
            private_key: keys.private_key,
            public_key: keys.public_key,
            auth_secret: keys.auth_secret,
        })
    }

    /// Dial, log in, and pump one session with the heartbeat as a sibling
    /// task under a shared scope: when either exits, both stop.
    async fn connect(
        &mut self,
        credentials: Credentials,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let stream = transport::connect_tls(
            &self.mcs_server,
            self.tls.clone(),
            self.dial_timeout,
            self.keep_alive,
        )
        .await?;

        let (session, reader, ack_rx) = McsSession::new(stream, self.events.clone());
        let snapshot = self.persistent_ids.lock().await.clone();
        session
            .send_login(&credentials, &snapshot, &self.heartbeat)
            .await?;
        debug!(replayed = snapshot.len(), "login sent");
        // connection established: the next failure starts a fresh backoff run
        self.backoff.reset();

        let scope = cancel.child_token();
        let heartbeat_task = self.heartbeat.is_active().then(|| {
            tokio::spawn(heartbeat::run(
                self.heartbeat.clone(),
                session.clone(),
                ack_rx,
                scope.clone(),
                self.events.clone(),
            ))
        });

        // the read pump is polled in place so cancelling the scope drops
        // it mid-read
        let result = tokio::select! {
            result = session.read_loop(reader, credentials, self.persistent_ids.clone()) => result,
            _ = scope.cancelled() => {
                if cancel.is_cancelled() {
                    Ok(())
                } else {
                    // the heartbeat deadman tore the session down
                    Err(Error::HeartbeatTimeout)
                }
            }
        };

        let reason = result.as_ref().err().map(|error| error.to_string());
        session.disconnect(reason).await;
        scope.cancel();
        if let Some(task) = heartbeat_task {
            let _ = task.await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;
    use push_register::Endpoints;
    use push_wire::proto::checkin::AndroidCheckinResponse;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    const TICK: Duration = Duration::from_secs(5);

    /// Stub for the four registration endpoints. Routes by path; counts
    /// check-ins and optionally rejects the first ones with a 401.
    struct RegistrationStub {
        addr: SocketAddr,
        checkins: Arc<AtomicUsize>,
    }

    async fn spawn_registration_stub(unauthorized_checkins: usize) -> RegistrationStub {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let checkins = Arc::new(AtomicUsize::new(0));
        let seen = checkins.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let seen = seen.clone();
                tokio::spawn(async move {
                    let mut buffer = Vec::new();
                    loop {
                        let header_end = loop {
                            if let Some(pos) =
                                buffer.windows(4).position(|window| window == b"\r\n\r\n")
                            {
                                break pos;
                            }
                            let mut chunk = [0u8; 4096];
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                            }
                        };

                        let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
                        let content_length = head
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())?
                            })
                            .unwrap_or(0);
                        let body_start = header_end + 4;
                        while buffer.len() < body_start + content_length {
                            let mut chunk = [0u8; 4096];
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                            }
                        }
                        buffer.drain(..body_start + content_length);

                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body): (u16, Vec<u8>) = if path.ends_with("/checkin") {
                            let count = seen.fetch_add(1, Ordering::SeqCst);
                            if count < unauthorized_checkins {
                                (401, b"rejected".to_vec())
                            } else {
                                let response = AndroidCheckinResponse {
                                    stats_ok: true,
                                    android_id: Some(1234),
                                    security_token: Some(5678),
                                    ..Default::default()
                                };
                                (200, response.encode_to_vec())
                            }
                        } else if path.ends_with("/register3") {
                            (200, b"token=abc".to_vec())
                        } else if path.ends_with("/installations") {
                            (200, br#"{"authToken":{"token":"T"}}"#.to_vec())
                        } else if path.ends_with("/registrations") {
                            (200, br#"{"token":"XYZ"}"#.to_vec())
                        } else {
                            (404, Vec::new())
                        };

                        let reason = match status {
                            200 => "OK",
                            401 => "Unauthorized",
                            _ => "Status",
                        };
                        let response = format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
                            body.len()
                        );
                        if socket.write_all(response.as_bytes()).await.is_err() {
                            return;
                        }
                        if socket.write_all(&body).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        RegistrationStub { addr, checkins }
    }

    fn endpoints_for(addr: SocketAddr) -> Endpoints {
        let base = format!("http://{addr}");
        Endpoints {
            checkin: format!("{base}/checkin"),
            register: format!("{base}/c2dm/register3"),
            installations: base.clone(),
            registrations: base,
            ..Endpoints::default()
        }
    }

    fn test_config() -> ClientConfig {
        ClientConfig {
            api_key: "key".to_string(),
            project_id: "proj".to_string(),
            app_id: "1:1234:web:abcd".to_string(),
            vapid_key: None,
        }
    }

    fn stored_credentials() -> Credentials {
        let keys = WebPushKeys::generate();
        Credentials {
            app_id: "1:1234:web:abcd".to_string(),
            android_id: 1234,
            security_token: 5678,
            token: "OLD".to_string(),
            private_key: keys.private_key,
            public_key: keys.public_key,
            auth_secret: keys.auth_secret,
        }
    }

    #[tokio::test]
    async fn cold_start_registers_then_attempts_mcs_connect() {
        let stub = spawn_registration_stub(0).await;

        // an MCS stand-in that accepts but never completes a handshake
        let mcs_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mcs_addr = mcs_listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let accept_count = accepted.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = mcs_listener.accept().await {
                accept_count.fetch_add(1, Ordering::SeqCst);
                // hold the socket so the client sits in its dial timeout
                tokio::spawn(async move {
                    let _keep = socket;
                    tokio::time::sleep(Duration::from_secs(10)).await;
                });
            }
        });

        let (client, mut events) = PushClient::with_options(
            test_config(),
            ClientOptions {
                endpoints: endpoints_for(stub.addr),
                mcs_server: mcs_addr.to_string(),
                dial_timeout: Duration::from_millis(300),
                retry: false,
                ..ClientOptions::default()
            },
        );

        let cancel = CancellationToken::new();
        let runner = tokio::spawn(client.run(cancel));

        let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
        let Event::UpdateCredentials { credentials } = event else {
            panic!("expected UpdateCredentials, got {event:?}");
        };
        assert_eq!(credentials.token, "XYZ");
        assert_eq!(credentials.android_id, 1234);
        assert_eq!(credentials.security_token, 5678);
        assert_eq!(credentials.auth_secret.len(), 16);

        // retry disabled: the dial timeout ends the run and closes the bus
        timeout(TICK, runner).await.unwrap().unwrap();
        assert_eq!(accepted.load(Ordering::SeqCst), 1, "MCS connect attempted");
        assert_eq!(stub.checkins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unauthorized_checkin_wipes_credentials_and_reregisters() {
        let stub = spawn_registration_stub(1).await;

        let (client, mut events) = PushClient::with_options(
            test_config(),
            ClientOptions {
                endpoints: endpoints_for(stub.addr),
                credentials: Some(stored_credentials()),
                // dead port: the connect attempt after re-registration fails fast
                mcs_server: "127.0.0.1:1".to_string(),
                dial_timeout: Duration::from_millis(300),
                backoff: Backoff::new(Duration::from_millis(5), Duration::from_millis(50)),
                ..ClientOptions::default()
            },
        );

        let cancel = CancellationToken::new();
        let runner = tokio::spawn(client.run(cancel.clone()));

        // first iteration: stored identity rejected
        let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
        let Event::Unauthorized { error } = event else {
            panic!("expected Unauthorized, got {event:?}");
        };
        assert!(error.is_unauthorized());

        let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
        assert!(matches!(event, Event::Retry { .. }), "got {event:?}");

        // second iteration: full registration runs and mints new credentials
        let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
        let Event::UpdateCredentials { credentials } = event else {
            panic!("expected UpdateCredentials, got {event:?}");
        };
        assert_eq!(credentials.token, "XYZ");

        cancel.cancel();
        timeout(TICK, runner).await.unwrap().unwrap();
        // one rejected validation plus one fresh-registration check-in
        assert!(stub.checkins.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn transport_failures_backoff_with_widening_windows() {
        let stub = spawn_registration_stub(0).await;

        let base = Duration::from_millis(5);
        let (client, mut events) = PushClient::with_options(
            test_config(),
            ClientOptions {
                endpoints: endpoints_for(stub.addr),
                credentials: Some(stored_credentials()),
                // nothing listens here: connection refused immediately
                mcs_server: "127.0.0.1:1".to_string(),
                dial_timeout: Duration::from_millis(300),
                backoff: Backoff::new(base, Duration::from_millis(900)),
                ..ClientOptions::default()
            },
        );

        let cancel = CancellationToken::new();
        let runner = tokio::spawn(client.run(cancel.clone()));

        let mut bounds = [10u64, 20, 40].into_iter();
        let mut seen = 0;
        while seen < 3 {
            let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
            if let Event::Retry { retry_after, error } = event {
                let bound = bounds.next().unwrap();
                assert!(
                    retry_after < Duration::from_millis(bound),
                    "retry {seen}: {retry_after:?} outside [0, {bound}ms)"
                );
                assert!(!error.is_unauthorized());
                seen += 1;
            }
        }

        cancel.cancel();
        timeout(TICK, runner).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn cancellation_aborts_a_hung_registration_call() {
        // a registration endpoint that accepts the request and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let accept_count = accepted.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                accept_count.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    // swallow the request bytes, never write a response
                    let mut sink = [0u8; 4096];
                    while matches!(socket.read(&mut sink).await, Ok(n) if n > 0) {}
                });
            }
        });

        let (client, mut events) = PushClient::with_options(
            test_config(),
            ClientOptions {
                endpoints: endpoints_for(addr),
                ..ClientOptions::default()
            },
        );

        let cancel = CancellationToken::new();
        let runner = tokio::spawn(client.run(cancel.clone()));

        // wait until the check-in request is sitting unanswered on the stub
        let deadline = tokio::time::Instant::now() + TICK;
        while accepted.load(Ordering::SeqCst) == 0 {
            assert!(
                tokio::time::Instant::now() < deadline,
                "check-in never reached the stub"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();

        // shutdown must not wait out the hung call or its timeout
        timeout(Duration::from_secs(1), runner)
            .await
            .expect("run() must return promptly after cancellation")
            .unwrap();
        // nothing was registered and the bus closed cleanly
        assert!(timeout(TICK, events.recv()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cancellation_closes_the_event_bus() {
        let stub = spawn_registration_stub(0).await;

        let (client, mut events) = PushClient::with_options(
            test_config(),
            ClientOptions {
                endpoints: endpoints_for(stub.addr),
                credentials: Some(stored_credentials()),
                mcs_server: "127.0.0.1:1".to_string(),
                // long backoff: cancellation lands in the retry sleep
                backoff: Backoff::new(Duration::from_secs(60), Duration::from_secs(900)),
                ..ClientOptions::default()
            },
        );

        let cancel = CancellationToken::new();
        let runner = tokio::spawn(client.run(cancel.clone()));

        let event = timeout(TICK, events.recv()).await.unwrap().unwrap();
        assert!(matches!(event, Event::Retry { .. }));

        cancel.cancel();
        timeout(TICK, runner).await.unwrap().unwrap();
        // the bus closes exactly when the supervisor exits
        assert!(timeout(TICK, events.recv()).await.unwrap().is_none());
    }
}
