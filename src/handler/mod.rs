//! Handler types and traits for serving MIB variables.
//!
//! This module provides the interface between the dispatcher and user
//! code:
//!
//! - [`GetHandler`], [`SubtreeHandler`] - answer Get/GetNext lookups
//! - [`TestSetHandler`], [`CommitSetHandler`], [`CleanupSetHandler`] -
//!   drive the phases of a Set transaction
//! - [`SetResult`] - outcome of a Set phase
//! - [`OidMap`] - sorted OID storage for implementing subtree handlers
//!
//! # Overview
//!
//! Handlers are installed on a [`Session`](crate::Session) keyed by OID.
//! Point handlers ([`Session::on_get`](crate::Session::on_get)) answer
//! exactly their own OID. Subtree handlers
//! ([`Session::on_get_subtree`](crate::Session::on_get_subtree)) own every
//! OID at or below their key and additionally resolve GetNext probes
//! inside that region. TestSet handlers match any VarBind whose name they
//! prefix.
//!
//! # Example: a subtree handler over an [`OidMap`]
//!
//! ```rust
//! use async_agentx::handler::{BoxFuture, OidMap, SubtreeHandler};
//! use async_agentx::{Oid, Value, VarBind};
//!
//! struct PortTable {
//!     rows: OidMap<Value>,
//! }
//!
//! impl SubtreeHandler for PortTable {
//!     fn get_subtree<'a>(&'a self, oid: &'a Oid, next: bool) -> BoxFuture<'a, VarBind> {
//!         Box::pin(async move {
//!             let hit = if next {
//!                 self.rows.next_after(oid)
//!             } else {
//!                 self.rows.at_or_after(oid)
//!             };
//!             match hit {
//!                 Some((name, value)) => VarBind::new(name.clone(), value.clone()),
//!                 None => VarBind::end_of_mib_view(oid.clone()),
//!             }
//!         })
//!     }
//! }
//! ```

mod registry;
mod results;
mod table;
mod traits;

pub use results::SetResult;
pub use table::OidMap;
pub use traits::{
    BoxFuture, CleanupSetHandler, CommitSetHandler, GetHandler, SubtreeHandler, TestSetHandler,
};

pub(crate) use registry::{HandlerRegistry, NextEntry};
