//! Handler traits and the boxed-future alias they share.

use std::future::Future;
use std::pin::Pin;

use crate::oid::Oid;
use crate::varbind::VarBind;

use super::SetResult;

/// Type alias for boxed async return type (dyn-compatible).
///
/// Async trait methods cannot be object-safe, and the dispatcher stores
/// handlers as `Arc<dyn ...>`, so every handler method returns `BoxFuture`.
///
/// # Example
///
/// ```rust
/// use async_agentx::handler::BoxFuture;
/// use async_agentx::{Oid, Value, VarBind};
///
/// fn answer<'a>(oid: &'a Oid) -> BoxFuture<'a, VarBind> {
///     Box::pin(async move { VarBind::new(oid.clone(), Value::Integer(47)) })
/// }
/// ```
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answers a Get for exactly the OID it was installed under.
///
/// The dispatcher calls `get` with the requested OID (which equals the
/// installation key). Return an exception-valued VarBind
/// ([`Value::NoSuchInstance`](crate::Value::NoSuchInstance)) to report a
/// missing instance; handlers must not panic to signal failure.
pub trait GetHandler: Send + Sync + 'static {
    /// Produce the binding for `oid`.
    fn get<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, VarBind>;
}

/// Owns every OID at or below its installation key.
///
/// For a Get-style probe (`next == false`) return the binding at or after
/// `oid`; for a GetNext probe (`next == true`) return the first binding
/// strictly after `oid`. Return an
/// [`endOfMibView`](crate::Value::EndOfMibView) binding when the region is
/// exhausted - the dispatcher then moves on to later handlers.
pub trait SubtreeHandler: Send + Sync + 'static {
    /// Resolve a probe inside this handler's region.
    fn get_subtree<'a>(&'a self, oid: &'a Oid, next: bool) -> BoxFuture<'a, VarBind>;
}

/// Validates one binding of a Set transaction (TestSet phase).
///
/// Installed under a prefix; invoked for any VarBind whose name the prefix
/// covers. Must not apply the change yet.
pub trait TestSetHandler: Send + Sync + 'static {
    /// Check whether the write in `varbind` would succeed.
    fn test_set<'a>(&'a self, varbind: &'a VarBind, session_id: u32) -> BoxFuture<'a, SetResult>;
}

/// Applies a previously tested Set transaction (CommitSet phase).
pub trait CommitSetHandler: Send + Sync + 'static {
    /// Apply the transaction's writes.
    fn commit_set<'a>(&'a self, session_id: u32) -> BoxFuture<'a, SetResult>;
}

/// Releases any state held for a Set transaction (CleanupSet phase).
pub trait CleanupSetHandler: Send + Sync + 'static {
    /// Drop transaction state. No response is sent for this phase.
    fn cleanup_set<'a>(&'a self, session_id: u32) -> BoxFuture<'a, ()>;
}

impl<F> GetHandler for F
where
    F: for<'a> Fn(&'a Oid) -> BoxFuture<'a, VarBind> + Send + Sync + 'static,
{
    fn get<'a>(&'a self, oid: &'a Oid) -> BoxFuture<'a, VarBind> {
        self(oid)
    }
}

impl<F> SubtreeHandler for F
where
    F: for<'a> Fn(&'a Oid, bool) -> BoxFuture<'a, VarBind> + Send + Sync + 'static,
{
    fn get_subtree<'a>(&'a self, oid: &'a Oid, next: bool) -> BoxFuture<'a, VarBind> {
        self(oid, next)
    }
}

impl<F> TestSetHandler for F
where
    F: for<'a> Fn(&'a VarBind, u32) -> BoxFuture<'a, SetResult> + Send + Sync + 'static,
{
    fn test_set<'a>(&'a self, varbind: &'a VarBind, session_id: u32) -> BoxFuture<'a, SetResult> {
        self(varbind, session_id)
    }
}

impl<F> CommitSetHandler for F
where
    F: Fn(u32) -> BoxFuture<'static, SetResult> + Send + Sync + 'static,
{
    fn commit_set<'a>(&'a self, session_id: u32) -> BoxFuture<'a, SetResult> {
        self(session_id)
    }
}

impl<F> CleanupSetHandler for F
where
    F: Fn(u32) -> BoxFuture<'static, ()> + Send + Sync + 'static,
{
    fn cleanup_set<'a>(&'a self, session_id: u32) -> BoxFuture<'a, ()> {
        self(session_id)
    }
}
