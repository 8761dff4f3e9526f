//! Async AgentX (RFC 2741) subagent library.
//!
//! AgentX lets a subagent extend an SNMP master agent's MIB: the subagent
//! registers responsibility for OID subtrees over the local AgentX socket
//! and answers the master's Get, GetNext, and Set requests. This crate
//! implements the subagent side - the wire codec, the session handshake,
//! and a dispatcher that routes inbound PDUs to user-installed handlers.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use async_agentx::handler::BoxFuture;
//! use async_agentx::{Oid, Session, Value, VarBind, oid};
//!
//! fn uptime(oid: &Oid) -> BoxFuture<'_, VarBind> {
//!     Box::pin(async move { VarBind::new(oid.clone(), Value::TimeTicks(4711)) })
//! }
//!
//! #[tokio::main]
//! async fn main() -> async_agentx::Result<()> {
//!     let session = Session::builder()
//!         .id(oid!(1, 3, 6, 1, 4, 1, 99999))
//!         .descr("example subagent")
//!         .open()
//!         .await?;
//!
//!     session.on_get("1.3.6.1.4.1.99999.1.0", uptime)?;
//!     session.register("1.3.6.1.4.1.99999").await?;
//!
//!     // Serve until the master ends the session.
//!     session.closed().await;
//!     Ok(())
//! }
//! ```
//!
//! # Structure
//!
//! - [`wire`] - big-endian primitives with AgentX's 4-byte alignment
//! - [`pdu`] - header and per-type PDU codecs
//! - [`transport`] - framed PDU exchange over the master socket
//! - [`handler`] - handler traits, [`SetResult`], and [`OidMap`](handler::OidMap)
//! - [`Session`] - open/register/disconnect and handler installation
//!
//! Exactly one task per session reads the socket (the internal
//! dispatcher); any number of tasks may hold [`Session`] clones and
//! write. Handlers run inline on the dispatcher task, so a slow handler
//! stalls its session, not the process.

pub mod error;
pub mod handler;
pub mod oid;
pub mod pdu;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod wire;

mod dispatch;
mod session;

pub mod prelude;

pub use error::{Error, Result};
pub use handler::SetResult;
pub use oid::Oid;
pub use session::{RegisterOptions, Session, SessionBuilder};
pub use value::Value;
pub use varbind::VarBind;
