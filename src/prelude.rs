//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use async_agentx::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::handler::{
    BoxFuture, CleanupSetHandler, CommitSetHandler, GetHandler, OidMap, SetResult, SubtreeHandler,
    TestSetHandler,
};
pub use crate::oid::Oid;
pub use crate::session::{RegisterOptions, Session, SessionBuilder};
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;
