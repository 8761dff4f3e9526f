//! Per-type PDU message structs.

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list};
use crate::wire::{Decoder, EncodeBuf};

use super::{
    CLOSE_TAG, CloseReason, DEFAULT_OPEN_TIMEOUT_SECS, DEFAULT_PRIORITY,
    DEFAULT_REGISTER_TIMEOUT_SECS, Header, PduType, REGISTER_TAG, UNREGISTER_TAG, assemble, flags,
};

/// A search range: a start OID (with its include flag) and an end OID
/// bounding a Get/GetNext lookup. The core decodes but does not act on
/// `include` and `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRange {
    /// Start of the range.
    pub start: Oid,
    /// Include flag from the start OID's encoding.
    pub include: bool,
    /// Non-inclusive upper bound; null when unbounded.
    pub end: Oid,
}

impl SearchRange {
    /// A range starting at `start` with a null upper bound.
    pub fn from(start: Oid) -> Self {
        Self {
            start,
            include: false,
            end: Oid::null(),
        }
    }

    pub(crate) fn encode(&self, buf: &mut EncodeBuf) {
        buf.put_oid(&self.start, self.include);
        buf.put_oid(&self.end, false);
    }
}

/// Open PDU (RFC 2741 §6.2.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Open {
    /// PDU header.
    pub header: Header,
    /// Seconds the master should wait on this session before declaring us
    /// unresponsive.
    pub timeout: u8,
    /// OID identifying the subagent; may be null.
    pub id: Oid,
    /// Human-readable subagent description.
    pub descr: Bytes,
}

impl Open {
    /// Create an Open PDU. A missing id encodes as the null OID.
    pub fn new(id: Option<Oid>, descr: Option<&str>) -> Self {
        Self {
            header: Header::new(PduType::Open),
            timeout: DEFAULT_OPEN_TIMEOUT_SECS,
            id: id.unwrap_or_default(),
            descr: descr
                .map(|d| Bytes::copy_from_slice(d.as_bytes()))
                .unwrap_or_default(),
        }
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        payload.put_u8(self.timeout);
        payload.put_slice(&[0, 0, 0]); // reserved
        payload.put_oid(&self.id, false);
        payload.put_octet_string(&self.descr);
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let timeout = dec.get_u8()?;
        dec.get_u8()?;
        dec.get_u8()?;
        dec.get_u8()?;
        let (id, _) = dec.get_oid()?;
        let descr = dec.get_octet_string()?;
        Ok(Self {
            header,
            timeout,
            id,
            descr,
        })
    }
}

/// Close PDU (RFC 2741 §6.2.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Close {
    /// PDU header; `transaction_id` carries [`CLOSE_TAG`] on PDUs this
    /// library originates.
    pub header: Header,
    /// Why the session is ending.
    pub reason: CloseReason,
}

impl Close {
    /// Create a Close PDU for the given session.
    pub fn new(reason: CloseReason, session_id: u32) -> Self {
        let mut header = Header::new(PduType::Close);
        header.session_id = session_id;
        header.transaction_id = CLOSE_TAG;
        Self { header, reason }
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        payload.put_u8(self.reason.as_u8());
        payload.put_slice(&[0, 0, 0]); // reserved
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let offset = dec.offset();
        let raw = dec.get_u8()?;
        let reason = CloseReason::from_u8(raw)
            .ok_or_else(|| Error::decode(offset, DecodeErrorKind::UnknownCloseReason(raw)))?;
        dec.get_u8()?;
        dec.get_u8()?;
        dec.get_u8()?;
        Ok(Self { header, reason })
    }
}

/// Register / Unregister PDU (RFC 2741 §6.2.3, §6.2.4). The two types
/// share a layout; the header type tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    /// PDU header.
    pub header: Header,
    /// Optional non-default context; present on the wire iff the
    /// NonDefaultContext flag is set.
    pub context: Option<Bytes>,
    /// Per-region timeout override in seconds.
    pub timeout: u8,
    /// Registration priority (lower wins on overlap).
    pub priority: u8,
    /// When non-zero, the index of the sub-identifier that ranges up to
    /// `upper_bound`.
    pub range_subid: u8,
    /// The registered subtree.
    pub subtree: Oid,
    /// Range upper bound; present on the wire iff `range_subid != 0`.
    pub upper_bound: Option<u32>,
}

impl Register {
    /// Create a Register PDU for a subtree with default timeout and
    /// priority.
    pub fn new(subtree: Oid) -> Self {
        let mut header = Header::new(PduType::Register);
        header.transaction_id = REGISTER_TAG;
        Self {
            header,
            context: None,
            timeout: DEFAULT_REGISTER_TIMEOUT_SECS,
            priority: DEFAULT_PRIORITY,
            range_subid: 0,
            subtree,
            upper_bound: None,
        }
    }

    /// Create an Unregister PDU for a previously registered subtree.
    pub fn unregister(subtree: Oid) -> Self {
        let mut msg = Self::new(subtree);
        msg.header.ty = PduType::Unregister;
        msg.header.transaction_id = UNREGISTER_TAG;
        msg
    }

    /// Attach a non-default context.
    pub fn with_context(mut self, context: impl Into<Bytes>) -> Self {
        self.context = Some(context.into());
        self.header.flags |= flags::NON_DEFAULT_CONTEXT;
        self
    }

    /// Override the registration priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Register a range of subtrees: the sub-identifier at `range_subid`
    /// (1-based) spans up to `upper_bound`.
    pub fn with_range(mut self, range_subid: u8, upper_bound: u32) -> Self {
        self.range_subid = range_subid;
        self.upper_bound = Some(upper_bound);
        self
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        if let Some(context) = &self.context {
            payload.put_octet_string(context);
        }
        payload.put_u8(self.timeout);
        payload.put_u8(self.priority);
        payload.put_u8(self.range_subid);
        payload.put_u8(0); // reserved
        payload.put_oid(&self.subtree, false);
        if self.range_subid != 0
            && let Some(upper_bound) = self.upper_bound
        {
            payload.put_u32(upper_bound);
        }
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let context = if header.has_flag(flags::NON_DEFAULT_CONTEXT) {
            Some(dec.get_octet_string()?)
        } else {
            None
        };
        let timeout = dec.get_u8()?;
        let priority = dec.get_u8()?;
        let range_subid = dec.get_u8()?;
        dec.get_u8()?;
        let (subtree, _) = dec.get_oid()?;
        let upper_bound = if range_subid != 0 {
            Some(dec.get_u32()?)
        } else {
            None
        };
        Ok(Self {
            header,
            context,
            timeout,
            priority,
            range_subid,
            subtree,
            upper_bound,
        })
    }
}

/// Get / GetNext PDU (RFC 2741 §6.2.5, §6.2.6). The two types share a
/// layout; the header type tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Get {
    /// PDU header.
    pub header: Header,
    /// Optional non-default context.
    pub context: Option<Bytes>,
    /// The requested ranges, one reply VarBind each.
    pub ranges: Vec<SearchRange>,
}

impl Get {
    /// Create a Get PDU.
    pub fn new(ranges: Vec<SearchRange>) -> Self {
        Self {
            header: Header::new(PduType::Get),
            context: None,
            ranges,
        }
    }

    /// Create a GetNext PDU.
    pub fn get_next(ranges: Vec<SearchRange>) -> Self {
        let mut msg = Self::new(ranges);
        msg.header.ty = PduType::GetNext;
        msg
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        if let Some(context) = &self.context {
            payload.put_octet_string(context);
        }
        for range in &self.ranges {
            range.encode(&mut payload);
        }
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header. A range whose start OID is
    /// null terminates the list and is not included.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let context = if header.has_flag(flags::NON_DEFAULT_CONTEXT) {
            Some(dec.get_octet_string()?)
        } else {
            None
        };
        let mut ranges = Vec::new();
        while !dec.is_empty() {
            // A null start OID terminates the list; it may arrive without
            // an end OID behind it, so check before reading one.
            let (start, include) = dec.get_oid()?;
            if start.is_empty() {
                break;
            }
            let (end, _) = dec.get_oid()?;
            ranges.push(SearchRange {
                start,
                include,
                end,
            });
        }
        Ok(Self {
            header,
            context,
            ranges,
        })
    }
}

/// TestSet PDU (RFC 2741 §6.2.8), the first phase of a Set transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSet {
    /// PDU header.
    pub header: Header,
    /// Optional non-default context.
    pub context: Option<Bytes>,
    /// The bindings the master wants to write.
    pub varbinds: Vec<VarBind>,
}

impl TestSet {
    /// Create a TestSet PDU.
    pub fn new(varbinds: Vec<VarBind>) -> Self {
        Self {
            header: Header::new(PduType::TestSet),
            context: None,
            varbinds,
        }
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        if let Some(context) = &self.context {
            payload.put_octet_string(context);
        }
        for vb in &self.varbinds {
            vb.encode(&mut payload);
        }
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let context = if header.has_flag(flags::NON_DEFAULT_CONTEXT) {
            Some(dec.get_octet_string()?)
        } else {
            None
        };
        let varbinds = decode_varbind_list(dec)?;
        Ok(Self {
            header,
            context,
            varbinds,
        })
    }
}

/// Response PDU (RFC 2741 §6.2.16).
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// PDU header, echoing the request's correlation ids.
    pub header: Header,
    /// Master's notion of uptime; meaningless subagent-to-master.
    pub sys_uptime: u32,
    /// Error status, 0 on success.
    pub error: u16,
    /// 1-based index of the failing binding, 0 on success.
    pub index: u16,
    /// Result bindings, in request order.
    pub varbinds: Vec<VarBind>,
}

impl Response {
    /// A success Response answering `request`: copies the session,
    /// transaction, and packet ids and the request's NetworkByteOrder
    /// flag bit.
    pub fn to(request: &Header) -> Self {
        let mut header = Header::new(PduType::Response);
        header.flags = request.flags & flags::NETWORK_BYTE_ORDER;
        header.session_id = request.session_id;
        header.transaction_id = request.transaction_id;
        header.packet_id = request.packet_id;
        Self {
            header,
            sys_uptime: 0,
            error: 0,
            index: 0,
            varbinds: Vec::new(),
        }
    }

    /// Set the error status and failing index.
    pub fn with_error(mut self, error: u16, index: u16) -> Self {
        self.error = error;
        self.index = index;
        self
    }

    /// Attach result bindings.
    pub fn with_varbinds(mut self, varbinds: Vec<VarBind>) -> Self {
        self.varbinds = varbinds;
        self
    }

    /// Serialize, stamping the payload length.
    pub fn encode(&mut self) -> Bytes {
        let mut payload = EncodeBuf::new();
        payload.put_u32(self.sys_uptime);
        payload.put_u16(self.error);
        payload.put_u16(self.index);
        for vb in &self.varbinds {
            vb.encode(&mut payload);
        }
        assemble(&mut self.header, payload)
    }

    /// Decode the payload against its header.
    pub fn decode(header: Header, dec: &mut Decoder) -> Result<Self> {
        let sys_uptime = dec.get_u32()?;
        let error = dec.get_u16()?;
        let index = dec.get_u16()?;
        let varbinds = decode_varbind_list(dec)?;
        Ok(Self {
            header,
            sys_uptime,
            error,
            index,
            varbinds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::{HEADER_SIZE, Pdu};
    use crate::value::Value;

    fn decode_back(bytes: Bytes) -> Pdu {
        let header = Header::decode(&bytes).unwrap();
        assert_eq!(header.payload_length as usize, bytes.len() - HEADER_SIZE);
        Pdu::decode(header, bytes.slice(HEADER_SIZE..)).unwrap()
    }

    #[test]
    fn test_open_roundtrip() {
        let mut open = Open::new(Some(oid!(1, 2, 3, 4, 7)), Some("muffin man"));
        let bytes = open.encode();

        // timeout word, uncompressed 5-arc id, 10-byte descr padded to 12
        assert_eq!(open.header.payload_length, 4 + (4 + 4 * 5) + (4 + 12));
        assert_eq!(bytes.len(), HEADER_SIZE + 44);

        match decode_back(bytes) {
            Pdu::Open(decoded) => assert_eq!(decoded, open),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_open_null_id() {
        let mut open = Open::new(None, None);
        let bytes = open.encode();
        assert_eq!(open.header.payload_length, 4 + 4 + 4);
        match decode_back(bytes) {
            Pdu::Open(decoded) => {
                assert!(decoded.id.is_empty());
                assert!(decoded.descr.is_empty());
                assert_eq!(decoded.timeout, DEFAULT_OPEN_TIMEOUT_SECS);
            }
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_close_roundtrip() {
        let mut close = Close::new(CloseReason::Shutdown, 47);
        let bytes = close.encode();

        assert_eq!(close.header.ty.as_u8(), 2);
        assert_eq!(close.header.transaction_id, CLOSE_TAG);
        assert_eq!(close.header.session_id, 47);
        assert_eq!(close.reason.as_u8(), 5);
        assert_eq!(close.header.payload_length, 4);

        match decode_back(bytes) {
            Pdu::Close(decoded) => assert_eq!(decoded, close),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_register_roundtrip() {
        let mut reg = Register::new(oid!(1, 3, 6, 1, 2, 1, 17));
        assert_eq!(reg.header.transaction_id, REGISTER_TAG);
        assert_eq!(reg.priority, DEFAULT_PRIORITY);

        match decode_back(reg.encode()) {
            Pdu::Register(decoded) => assert_eq!(decoded, reg),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_register_with_context_and_range() {
        let mut reg = Register::new(oid!(1, 2, 3, 4, 7))
            .with_context(&b"pirates"[..])
            .with_range(5, 4094);
        assert!(reg.header.has_flag(flags::NON_DEFAULT_CONTEXT));

        match decode_back(reg.encode()) {
            Pdu::Register(decoded) => {
                assert_eq!(decoded.context.as_deref(), Some(&b"pirates"[..]));
                assert_eq!(decoded.range_subid, 5);
                assert_eq!(decoded.upper_bound, Some(4094));
                assert_eq!(decoded, reg);
            }
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_unregister_flips_type_and_tag() {
        let mut unreg = Register::unregister(oid!(1, 3, 6, 1, 2, 1, 17));
        assert_eq!(unreg.header.transaction_id, UNREGISTER_TAG);
        match decode_back(unreg.encode()) {
            Pdu::Unregister(decoded) => assert_eq!(decoded.subtree, unreg.subtree),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_get_roundtrip() {
        let mut get = Get::new(vec![
            SearchRange::from(oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 1, 1, 0)),
            SearchRange::from(oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 1, 2, 0)),
        ]);
        match decode_back(get.encode()) {
            Pdu::Get(decoded) => assert_eq!(decoded, get),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_get_next_null_start_terminates_list() {
        let mut get = Get::get_next(vec![
            SearchRange::from(oid!(1, 3, 6, 1)),
            SearchRange::from(Oid::null()),
            SearchRange::from(oid!(1, 3, 6, 2)),
        ]);
        match decode_back(get.encode()) {
            Pdu::GetNext(decoded) => {
                assert_eq!(decoded.ranges.len(), 1);
                assert_eq!(decoded.ranges[0].start, oid!(1, 3, 6, 1));
            }
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_test_set_roundtrip() {
        let mut set = TestSet::new(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 3, 1, 2, 4),
            Value::from(vec![0xcc, 0x33]),
        )]);
        match decode_back(set.encode()) {
            Pdu::TestSet(decoded) => assert_eq!(decoded, set),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_response_roundtrip_and_echo() {
        let mut request = Header::new(PduType::Get);
        request.session_id = 9;
        request.transaction_id = 1234;
        request.packet_id = 77;
        request.flags = flags::NETWORK_BYTE_ORDER | flags::NON_DEFAULT_CONTEXT;

        let mut response = Response::to(&request)
            .with_varbinds(vec![VarBind::new(oid!(1, 3, 6, 1, 1), Value::Integer(47))]);

        assert_eq!(response.header.session_id, 9);
        assert_eq!(response.header.transaction_id, 1234);
        assert_eq!(response.header.packet_id, 77);
        // Only the byte-order bit is echoed
        assert_eq!(response.header.flags, flags::NETWORK_BYTE_ORDER);

        match decode_back(response.encode()) {
            Pdu::Response(decoded) => assert_eq!(decoded, response),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_commit_set_is_header_only() {
        let mut header = Header::new(PduType::CommitSet);
        header.session_id = 3;
        header.transaction_id = 12;
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        match decode_back(bytes) {
            Pdu::CommitSet(h) => assert_eq!(h.transaction_id, 12),
            other => panic!("wrong PDU: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_payload_is_short_buffer() {
        let mut open = Open::new(Some(oid!(1, 2, 3)), Some("x"));
        let bytes = open.encode();
        let header = Header::decode(&bytes).unwrap();
        // Drop the last 4 bytes of the payload
        let truncated = bytes.slice(HEADER_SIZE..bytes.len() - 4);
        assert!(Pdu::decode(header, truncated).is_err());
    }
}
