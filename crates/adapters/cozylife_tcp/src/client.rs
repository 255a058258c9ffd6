//! [`DeviceClient`] over a persistent TCP connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use cozyhub_app::ports::DeviceClient;
use cozyhub_domain::device::DeviceIdentity;
use cozyhub_domain::error::CozyHubError;
use cozyhub_domain::state::StatePayload;

use crate::config::TcpDeviceConfig;
use crate::error::TcpError;
use crate::protocol::{self, Command, Reply};

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Client for one CozyLife device.
///
/// The connection is opened on first use and kept open. Any IO error or
/// timeout drops it, so the next call starts from a fresh connection.
/// Requests on one client are serialized.
pub struct TcpDeviceClient {
    identity: DeviceIdentity,
    config: TcpDeviceConfig,
    connection: Mutex<Option<Connection>>,
    last_sn: AtomicU64,
}

impl TcpDeviceClient {
    /// Create a client for a device whose identity is already known.
    ///
    /// No IO happens until the first request.
    #[must_use]
    pub fn new(identity: DeviceIdentity, config: TcpDeviceConfig) -> Self {
        Self {
            identity,
            config,
            connection: Mutex::new(None),
            last_sn: AtomicU64::new(0),
        }
    }

    /// Create a client, asking the device for its id when the configuration
    /// does not carry one.
    ///
    /// # Errors
    ///
    /// Returns a [`TcpError`] if the info request fails or the resulting
    /// identity is invalid.
    #[tracing::instrument(skip(config), fields(addr = %config.addr()))]
    pub async fn connect(config: TcpDeviceConfig) -> Result<Self, TcpError> {
        let placeholder = DeviceIdentity::builder()
            .id(config.device_id.clone().unwrap_or_else(|| config.addr()))
            .model_name(config.model_name.clone())
            .type_code(config.type_code.clone())
            .build()?;
        let mut client = Self::new(placeholder, config);

        if client.config.device_id.is_none() {
            let reply = client
                .request(Command::Info, None)
                .await?
                .ok_or(TcpError::MissingBody)?;
            let did = reply.device_id()?;
            tracing::info!(device = %did, "device identified");
            client.identity.id = did.parse()?;
        }

        Ok(client)
    }

    /// Send one request; when `Some` is returned it is the matching reply.
    ///
    /// A reply is awaited for info and query requests, and for set requests
    /// when `await_ack` is configured.
    async fn request(
        &self,
        command: Command,
        fields: Option<&StatePayload>,
    ) -> Result<Option<Reply>, TcpError> {
        let sn = self.next_sn().to_string();
        let line = protocol::encode(command, &sn, protocol::request_body(command, fields)?)?;
        let expect_reply = command != Command::Set || self.config.await_ack;
        let timeout = self.config.timeout();

        let mut guard = self.connection.lock().await;
        let exchange = Self::exchange(&mut guard, &self.config, &line, &sn, expect_reply);
        let result = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(TcpError::Timeout(timeout)),
        };

        if let Err(err) = &result {
            tracing::debug!(device = %self.identity.id, error = %err, "dropping device connection");
            *guard = None;
        }
        result
    }

    async fn exchange(
        slot: &mut Option<Connection>,
        config: &TcpDeviceConfig,
        line: &[u8],
        sn: &str,
        expect_reply: bool,
    ) -> Result<Option<Reply>, TcpError> {
        if slot.is_none() {
            let addr = config.addr();
            let stream = TcpStream::connect(&addr)
                .await
                .map_err(|source| TcpError::Connect { addr, source })?;
            let (read, write) = stream.into_split();
            *slot = Some(Connection {
                reader: BufReader::new(read),
                writer: write,
            });
        }
        let Some(conn) = slot.as_mut() else {
            return Err(TcpError::ConnectionClosed);
        };

        conn.writer.write_all(line).await?;
        conn.writer.flush().await?;
        if !expect_reply {
            return Ok(None);
        }

        let mut buf = String::new();
        loop {
            buf.clear();
            if conn.reader.read_line(&mut buf).await? == 0 {
                return Err(TcpError::ConnectionClosed);
            }
            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            match protocol::decode_reply(text, sn) {
                Some(reply) => return reply.map(Some),
                None => tracing::trace!(line = text, "skipping unsolicited device line"),
            }
        }
    }

    /// Millisecond timestamp, bumped when needed so serials never repeat.
    fn next_sn(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        let mut last = self.last_sn.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self
                .last_sn
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

impl DeviceClient for TcpDeviceClient {
    fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    async fn query(&self) -> Result<Value, CozyHubError> {
        let reply = self
            .request(Command::Query, None)
            .await?
            .ok_or(TcpError::MissingBody)?;
        Ok(reply.into_data()?)
    }

    async fn control(&self, fields: &StatePayload) -> Result<bool, CozyHubError> {
        let reply = self.request(Command::Set, Some(fields)).await?;
        Ok(reply.is_none_or(|reply| reply.is_success()))
    }
}
