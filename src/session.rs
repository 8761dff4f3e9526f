//! AgentX session lifecycle and caller-facing API.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UnixStream;
use tokio::net::unix::OwnedWriteHalf;
use tokio::sync::watch;

use crate::dispatch::Dispatcher;
use crate::error::{Error, ProtocolErrorKind, Result};
use crate::handler::{
    CleanupSetHandler, CommitSetHandler, GetHandler, HandlerRegistry, SubtreeHandler,
    TestSetHandler,
};
use crate::oid::Oid;
use crate::pdu::{Close, CloseReason, Open, Pdu, Register};
use crate::transport::{self, MASTER_SOCKET_PATH};

/// Deadline on connecting and completing the Open handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// Serving traffic.
    Active,
    /// A Close has been sent or received; draining until EOF.
    Closing,
    /// The socket is gone.
    Closed,
}

/// State shared between the [`Session`] handle and its dispatcher task.
pub(crate) struct Shared {
    pub(crate) session_id: u32,
    /// Serializes socket writes so PDUs never interleave.
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    state: Mutex<SessionState>,
    /// OIDs of past Register/Unregister requests, indexed by the
    /// `packet_id` the request carried.
    pub(crate) registrations: Mutex<Vec<Oid>>,
    pub(crate) registry: RwLock<HandlerRegistry>,
    closed_tx: watch::Sender<bool>,
}

impl Shared {
    /// Write one marshalled PDU, failing fast once the session is closed.
    pub(crate) async fn send(&self, pdu: Bytes) -> Result<()> {
        if *self.state.lock().unwrap() == SessionState::Closed {
            return Err(Error::Closed);
        }
        let mut writer = self.writer.lock().await;
        transport::write_pdu(&mut *writer, &pdu).await
    }

    /// Transition to Closing. Returns false if already past Active.
    pub(crate) fn begin_close(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == SessionState::Active {
            *state = SessionState::Closing;
            true
        } else {
            false
        }
    }

    /// Transition to Closed and fire the closed event, exactly once.
    pub(crate) fn mark_closed(&self) {
        let mut state = self.state.lock().unwrap();
        if *state != SessionState::Closed {
            *state = SessionState::Closed;
            drop(state);
            // send_replace updates the value even with no receiver yet, so
            // a later closed() call still observes the flag.
            self.closed_tx.send_replace(true);
        }
    }
}

/// Configuration for opening a [`Session`].
pub struct SessionBuilder {
    path: PathBuf,
    id: Option<Oid>,
    descr: Option<String>,
    timeout: Duration,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            path: PathBuf::from(MASTER_SOCKET_PATH),
            id: None,
            descr: None,
            timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Master agent socket path (defaults to `/var/agentx/master`).
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// OID identifying this subagent in the Open PDU.
    pub fn id(mut self, id: Oid) -> Self {
        self.id = Some(id);
        self
    }

    /// Human-readable description sent in the Open PDU.
    pub fn descr(mut self, descr: impl Into<String>) -> Self {
        self.descr = Some(descr.into());
        self
    }

    /// Deadline on connecting and completing the Open handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connect to the master socket and open a session.
    pub async fn open(self) -> Result<Session> {
        let deadline = self.timeout;
        let connect = UnixStream::connect(&self.path);
        let stream = tokio::time::timeout(deadline, connect)
            .await
            .map_err(|_| Error::Timeout { elapsed: deadline })??;
        self.open_on(stream).await
    }

    /// Open a session over an already-connected stream. This is how tests
    /// drive a session against an in-process master stand-in.
    pub async fn open_on(self, stream: UnixStream) -> Result<Session> {
        let (mut read_half, mut write_half) = stream.into_split();
        let deadline = self.timeout;

        let handshake = async {
            let mut open = Open::new(self.id.clone(), self.descr.as_deref());
            transport::write_pdu(&mut write_half, &open.encode()).await?;

            let (header, payload) = transport::read_pdu(&mut read_half)
                .await?
                .ok_or_else(|| Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof)))?;
            match Pdu::decode(header, payload)? {
                Pdu::Response(resp) => {
                    if resp.error != 0 {
                        return Err(Error::protocol(ProtocolErrorKind::MasterError {
                            code: resp.error,
                        }));
                    }
                    Ok(resp.header.session_id)
                }
                other => Err(Error::protocol(ProtocolErrorKind::UnexpectedPdu {
                    ty: other.header().ty.as_u8(),
                })),
            }
        };

        let session_id = tokio::time::timeout(deadline, handshake)
            .await
            .map_err(|_| Error::Timeout { elapsed: deadline })??;

        tracing::info!(session_id, "AgentX session opened");

        let (closed_tx, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            session_id,
            writer: tokio::sync::Mutex::new(write_half),
            state: Mutex::new(SessionState::Active),
            registrations: Mutex::new(Vec::new()),
            registry: RwLock::new(HandlerRegistry::default()),
            closed_tx,
        });

        tokio::spawn(Dispatcher::new(shared.clone(), read_half).run());

        Ok(Session { shared })
    }
}

/// Extra knobs for [`Session::register_with`].
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// Registration priority; `None` keeps the library default.
    pub priority: Option<u8>,
    /// Range registration: `(range_subid, upper_bound)`.
    pub range: Option<(u8, u32)>,
    /// Non-default context.
    pub context: Option<Bytes>,
}

/// An open AgentX session against a master agent.
///
/// Cloning yields another handle to the same session; all handles share
/// one socket, one dispatcher, and one handler registry.
///
/// # Example
///
/// ```rust,no_run
/// use async_agentx::handler::BoxFuture;
/// use async_agentx::{Oid, Session, Value, VarBind};
///
/// fn answer(oid: &Oid) -> BoxFuture<'_, VarBind> {
///     Box::pin(async move { VarBind::new(oid.clone(), Value::Integer(47)) })
/// }
///
/// # async fn example() -> async_agentx::Result<()> {
/// let session = Session::open(None, Some("example agent")).await?;
///
/// session.on_get("1.3.6.1.4.1.99999.1.0", answer)?;
/// session.register("1.3.6.1.4.1.99999").await?;
///
/// session.closed().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Configure a session before opening it.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Open a session on the default master socket.
    pub async fn open(id: Option<Oid>, descr: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(id) = id {
            builder = builder.id(id);
        }
        if let Some(descr) = descr {
            builder = builder.descr(descr);
        }
        builder.open().await
    }

    /// The master-assigned session id.
    pub fn session_id(&self) -> u32 {
        self.shared.session_id
    }

    /// Register responsibility for an OID subtree.
    ///
    /// Returns as soon as the Register PDU is written; the master's
    /// verdict arrives asynchronously and is logged by the dispatcher.
    pub async fn register(&self, subtree: &str) -> Result<()> {
        self.register_with(subtree, RegisterOptions::default()).await
    }

    /// Register with explicit priority, range, or context.
    pub async fn register_with(&self, subtree: &str, opts: RegisterOptions) -> Result<()> {
        let oid: Oid = subtree.parse()?;
        self.send_registration(Register::new(oid.clone()), oid, opts)
            .await
    }

    /// Withdraw a previous registration.
    pub async fn unregister(&self, subtree: &str) -> Result<()> {
        let oid: Oid = subtree.parse()?;
        self.send_registration(
            Register::unregister(oid.clone()),
            oid,
            RegisterOptions::default(),
        )
        .await
    }

    async fn send_registration(
        &self,
        mut msg: Register,
        oid: Oid,
        opts: RegisterOptions,
    ) -> Result<()> {
        if let Some(priority) = opts.priority {
            msg = msg.with_priority(priority);
        }
        if let Some((range_subid, upper_bound)) = opts.range {
            msg = msg.with_range(range_subid, upper_bound);
        }
        if let Some(context) = opts.context {
            msg = msg.with_context(context);
        }
        msg.header.session_id = self.shared.session_id;

        // Reserve the packet id and record the OID under one lock so the
        // dispatcher can index responses by packet_id.
        msg.header.packet_id = {
            let mut registrations = self.shared.registrations.lock().unwrap();
            let packet_id = registrations.len() as u32;
            registrations.push(oid);
            packet_id
        };

        self.shared.send(msg.encode()).await
    }

    /// Install an exact-match Get handler for `oid`.
    pub fn on_get(&self, oid: &str, handler: impl GetHandler) -> Result<()> {
        let oid: Oid = oid.parse()?;
        self.shared
            .registry
            .write()
            .unwrap()
            .install_get(oid, Arc::new(handler));
        Ok(())
    }

    /// Install a subtree handler owning `oid` and everything below it.
    pub fn on_get_subtree(&self, oid: &str, handler: impl SubtreeHandler) -> Result<()> {
        let oid: Oid = oid.parse()?;
        self.shared
            .registry
            .write()
            .unwrap()
            .install_subtree(oid, Arc::new(handler));
        Ok(())
    }

    /// Install a TestSet handler for any VarBind whose name starts with
    /// `oid`.
    pub fn on_test_set(&self, oid: &str, handler: impl TestSetHandler) -> Result<()> {
        let oid: Oid = oid.parse()?;
        self.shared
            .registry
            .write()
            .unwrap()
            .install_test_set(oid, Arc::new(handler));
        Ok(())
    }

    /// Install the CommitSet handler.
    pub fn on_commit_set(&self, handler: impl CommitSetHandler) {
        self.shared
            .registry
            .write()
            .unwrap()
            .install_commit_set(Arc::new(handler));
    }

    /// Install the CleanupSet handler.
    pub fn on_cleanup_set(&self, handler: impl CleanupSetHandler) {
        self.shared
            .registry
            .write()
            .unwrap()
            .install_cleanup_set(Arc::new(handler));
    }

    /// Send a Close PDU and return. Best-effort: the [`closed`](Self::closed)
    /// event fires once the master acknowledges or the socket drains.
    pub async fn disconnect(&self) -> Result<()> {
        if !self.shared.begin_close() {
            return Ok(());
        }
        tracing::info!(session_id = self.shared.session_id, "disconnecting");

        let mut close = Close::new(CloseReason::Shutdown, self.shared.session_id);
        match self.shared.send(close.encode()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_disconnect() => {
                // The dispatcher noticed first; the closed event covers it.
                tracing::debug!(error = %e, "close PDU not sent, session already down");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Wait until the session is closed: the master answered our Close,
    /// sent its own, or the socket reached EOF.
    pub async fn closed(&self) {
        let mut rx = self.shared.closed_tx.subscribe();
        // Err would mean the sender is gone, but Shared owns it and we
        // hold Shared; treat it as closed either way.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
