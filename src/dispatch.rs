//! The per-session dispatcher: the only task that reads the socket.
//!
//! Inbound PDUs are either responses to our own administrative requests
//! (matched by the sentinel transaction ids) or requests from the master,
//! which are resolved against the handler registry and answered with a
//! Response PDU. Decode failures drop the PDU and keep the loop alive;
//! only I/O failures and EOF end the session.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::net::unix::OwnedReadHalf;

use crate::error::Error;
use crate::handler::{NextEntry, SetResult};
use crate::oid::Oid;
use crate::pdu::{CLOSE_TAG, Get, Pdu, REGISTER_TAG, Response, TestSet, UNREGISTER_TAG};
use crate::session::Shared;
use crate::transport;
use crate::value::Value;
use crate::varbind::VarBind;

pub(crate) struct Dispatcher {
    shared: Arc<Shared>,
    reader: OwnedReadHalf,
}

impl Dispatcher {
    pub(crate) fn new(shared: Arc<Shared>, reader: OwnedReadHalf) -> Self {
        Self { shared, reader }
    }

    /// Read-and-dispatch until the session ends, then mark it closed.
    pub(crate) async fn run(mut self) {
        loop {
            match transport::read_pdu(&mut self.reader).await {
                Ok(Some((header, payload))) => {
                    let pdu = match Pdu::decode(header, payload) {
                        Ok(pdu) => pdu,
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping undecodable PDU");
                            continue;
                        }
                    };
                    if self.handle(pdu).await.is_break() {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("master closed the connection");
                    break;
                }
                Err(e @ Error::Decode { .. }) => {
                    tracing::warn!(error = %e, "dropping unreadable PDU");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "read loop failed");
                    break;
                }
            }
        }
        self.shared.mark_closed();
    }

    async fn handle(&self, pdu: Pdu) -> ControlFlow<()> {
        match pdu {
            Pdu::Response(resp) => return self.handle_response(resp),
            Pdu::Get(get) => {
                let varbinds = self.serve_get(&get).await;
                self.respond(Response::to(&get.header).with_varbinds(varbinds))
                    .await;
            }
            Pdu::GetNext(get) => {
                let varbinds = self.serve_get_next(&get).await;
                self.respond(Response::to(&get.header).with_varbinds(varbinds))
                    .await;
            }
            Pdu::TestSet(set) => {
                let (error, index) = self.serve_test_set(&set).await;
                self.respond(Response::to(&set.header).with_error(error, index))
                    .await;
            }
            Pdu::CommitSet(header) => {
                let result = self.serve_commit_set().await;
                self.respond(Response::to(&header).with_error(result.code(), 0))
                    .await;
            }
            Pdu::UndoSet(header) => {
                // Not threaded through handlers; acknowledge and move on.
                self.respond(Response::to(&header)).await;
            }
            Pdu::CleanupSet(header) => {
                // RFC 2741 §6.2.10: CleanupSet gets no Response.
                let handler = { self.shared.registry.read().unwrap().cleanup_set() };
                if let Some(handler) = handler {
                    handler.cleanup_set(header.session_id).await;
                }
            }
            Pdu::Close(close) => {
                tracing::info!(reason = ?close.reason, "master is closing the session");
                self.shared.begin_close();
                self.respond(Response::to(&close.header)).await;
            }
            other => {
                tracing::debug!(ty = other.header().ty.as_u8(), "ignoring unhandled PDU");
            }
        }
        ControlFlow::Continue(())
    }

    /// Route a Response by the transaction tag we stamped on the request.
    fn handle_response(&self, resp: Response) -> ControlFlow<()> {
        match resp.header.transaction_id {
            CLOSE_TAG => {
                tracing::debug!("close acknowledged by master");
                return ControlFlow::Break(());
            }
            tag @ (REGISTER_TAG | UNREGISTER_TAG) => {
                let verb = if tag == REGISTER_TAG {
                    "register"
                } else {
                    "unregister"
                };
                let subtree = {
                    let registrations = self.shared.registrations.lock().unwrap();
                    registrations.get(resp.header.packet_id as usize).cloned()
                };
                match (subtree, resp.error) {
                    (Some(oid), 0) => tracing::info!(%oid, "{} accepted", verb),
                    (Some(oid), code) => {
                        tracing::warn!(%oid, code, "{} rejected by master", verb);
                    }
                    (None, code) => tracing::warn!(
                        packet_id = resp.header.packet_id,
                        code,
                        "{} response for unknown registration",
                        verb
                    ),
                }
            }
            tag => {
                tracing::debug!(transaction_id = tag, "uncorrelated response");
            }
        }
        ControlFlow::Continue(())
    }

    async fn serve_get(&self, get: &Get) -> Vec<VarBind> {
        let mut out = Vec::with_capacity(get.ranges.len());
        for range in &get.ranges {
            let handler = { self.shared.registry.read().unwrap().point_get(&range.start) };
            let vb = match handler {
                Some(handler) => handler.get(&range.start).await,
                None => VarBind::no_such_object(range.start.clone()),
            };
            out.push(vb);
        }
        out
    }

    async fn serve_get_next(&self, get: &Get) -> Vec<VarBind> {
        let mut out = Vec::with_capacity(get.ranges.len());
        for range in &get.ranges {
            out.push(self.resolve_next(&range.start).await);
        }
        out
    }

    /// Find the least bound OID strictly greater than `start`.
    ///
    /// Walks the merged point/subtree key list in ascending order. A
    /// subtree at or above `start` is probed at `start` itself; a subtree
    /// past `start` is probed at its own root so a walk can descend into
    /// it. Point handlers answer for their own key once the walk passes
    /// `start`.
    async fn resolve_next(&self, start: &Oid) -> VarBind {
        let entries = { self.shared.registry.read().unwrap().next_entries() };
        for (key, entry) in entries {
            match entry {
                NextEntry::Subtree(handler) => {
                    let vb = if key < *start || start.has_prefix(&key) {
                        handler.get_subtree(start, start != &key).await
                    } else {
                        handler.get_subtree(&key, false).await
                    };
                    if vb.value != Value::EndOfMibView {
                        return vb;
                    }
                }
                NextEntry::Point(handler) => {
                    if key > *start {
                        return handler.get(&key).await;
                    }
                }
            }
        }
        VarBind::end_of_mib_view(start.clone())
    }

    /// Run every binding past its prefix-matched TestSet handler. The
    /// reply carries the last non-NoError result and that binding's
    /// 1-based index; bindings nobody claims are NotWritable.
    async fn serve_test_set(&self, set: &TestSet) -> (u16, u16) {
        let session_id = self.shared.session_id;
        let mut error = SetResult::NoError;
        let mut index = 0u16;

        for (i, vb) in set.varbinds.iter().enumerate() {
            let handler = { self.shared.registry.read().unwrap().test_set_for(&vb.name) };
            let result = match handler {
                Some(handler) => handler.test_set(vb, session_id).await,
                None => SetResult::NotWritable,
            };
            if !result.is_ok() {
                tracing::debug!(name = %vb.name, %result, "test-set rejected");
                error = result;
                index = (i + 1) as u16;
            }
        }
        (error.code(), index)
    }

    async fn serve_commit_set(&self) -> SetResult {
        let handler = { self.shared.registry.read().unwrap().commit_set() };
        match handler {
            Some(handler) => handler.commit_set(self.shared.session_id).await,
            None => SetResult::NoError,
        }
    }

    async fn respond(&self, mut response: Response) {
        let transaction_id = response.header.transaction_id;
        if let Err(e) = self.shared.send(response.encode()).await {
            if e.is_disconnect() {
                tracing::debug!(transaction_id, "response dropped, session closing");
            } else {
                tracing::warn!(transaction_id, error = %e, "failed to send response");
            }
        }
    }
}
