//! AgentX PDU codec (RFC 2741 §6).
//!
//! Every PDU starts with a fixed 20-byte header; the type field selects
//! the payload layout. Message structs carry their header and serialize
//! with `encode(&mut self)`, which stamps `payload_length` with the exact
//! byte count following the header.

mod messages;

pub use messages::{Close, Get, Open, Register, Response, SearchRange, TestSet};

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::wire::{Decoder, EncodeBuf};

/// AgentX protocol version (the only one).
pub const VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 20;

/// Header flag bits (RFC 2741 §6.1).
pub mod flags {
    /// Registration is for a fully-qualified instance.
    pub const INSTANCE_REGISTRATION: u8 = 0x01;
    /// Index allocation: any new value.
    pub const NEW_INDEX: u8 = 0x02;
    /// Index allocation: any value.
    pub const ANY_INDEX: u8 = 0x04;
    /// A context octet string precedes the payload body.
    pub const NON_DEFAULT_CONTEXT: u8 = 0x08;
    /// Multi-byte fields are big-endian. Always set by this library.
    pub const NETWORK_BYTE_ORDER: u8 = 0x10;
}

/// Sentinel transaction IDs stamped on administrative PDUs so the
/// dispatcher can correlate the master's responses without a pending-call
/// table. Arbitrary but fixed values.
pub const CLOSE_TAG: u32 = 86;
/// Transaction ID used on Register PDUs.
pub const REGISTER_TAG: u32 = 47;
/// Transaction ID used on Unregister PDUs.
pub const UNREGISTER_TAG: u32 = 74;

/// Default Open timeout in seconds offered to the master.
pub const DEFAULT_OPEN_TIMEOUT_SECS: u8 = 5;
/// Default per-region timeout on Register PDUs.
pub const DEFAULT_REGISTER_TIMEOUT_SECS: u8 = 10;
/// Default registration priority.
pub const DEFAULT_PRIORITY: u8 = 47;

/// PDU type codes (RFC 2741 §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    Open = 1,
    Close = 2,
    Register = 3,
    Unregister = 4,
    Get = 5,
    GetNext = 6,
    GetBulk = 7,
    TestSet = 8,
    CommitSet = 9,
    UndoSet = 10,
    CleanupSet = 11,
    Notify = 12,
    Ping = 13,
    IndexAllocate = 14,
    IndexDeallocate = 15,
    AddAgentCaps = 16,
    RemoveAgentCaps = 17,
    Response = 18,
}

impl PduType {
    /// The wire code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a wire code back to a type.
    pub fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            1 => Self::Open,
            2 => Self::Close,
            3 => Self::Register,
            4 => Self::Unregister,
            5 => Self::Get,
            6 => Self::GetNext,
            7 => Self::GetBulk,
            8 => Self::TestSet,
            9 => Self::CommitSet,
            10 => Self::UndoSet,
            11 => Self::CleanupSet,
            12 => Self::Notify,
            13 => Self::Ping,
            14 => Self::IndexAllocate,
            15 => Self::IndexDeallocate,
            16 => Self::AddAgentCaps,
            17 => Self::RemoveAgentCaps,
            18 => Self::Response,
            _ => return None,
        })
    }
}

/// Close reason codes (RFC 2741 §6.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CloseReason {
    /// None of the reasons below.
    Other = 1,
    /// Too many parse errors from the peer.
    ParseError = 2,
    /// Too many protocol errors from the peer.
    ProtocolError = 3,
    /// Too many timeouts waiting for the peer.
    Timeouts = 4,
    /// The sending entity is shutting down.
    Shutdown = 5,
    /// Closed on behalf of an SNMP management request.
    ByManager = 6,
}

impl CloseReason {
    /// The wire code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a wire code back to a reason.
    pub fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            1 => Self::Other,
            2 => Self::ParseError,
            3 => Self::ProtocolError,
            4 => Self::Timeouts,
            5 => Self::Shutdown,
            6 => Self::ByManager,
            _ => return None,
        })
    }
}

/// The fixed 20-byte PDU header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Protocol version, always 1.
    pub version: u8,
    /// PDU type.
    pub ty: PduType,
    /// Flag bits, see [`flags`].
    pub flags: u8,
    /// Session this PDU belongs to (0 before Open completes).
    pub session_id: u32,
    /// Transaction correlation id.
    pub transaction_id: u32,
    /// Packet correlation id.
    pub packet_id: u32,
    /// Exact byte count following the header.
    pub payload_length: u32,
}

impl Header {
    /// A header of the given type with the NetworkByteOrder flag set, as
    /// every PDU this library emits has.
    pub fn new(ty: PduType) -> Self {
        Self {
            version: VERSION,
            ty,
            flags: flags::NETWORK_BYTE_ORDER,
            session_id: 0,
            transaction_id: 0,
            packet_id: 0,
            payload_length: 0,
        }
    }

    /// Check a flag bit.
    pub fn has_flag(&self, mask: u8) -> bool {
        self.flags & mask != 0
    }

    /// Append the header to an encode buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.put_u8(self.version);
        buf.put_u8(self.ty.as_u8());
        buf.put_u8(self.flags);
        buf.put_u8(0); // reserved
        buf.put_u32(self.session_id);
        buf.put_u32(self.transaction_id);
        buf.put_u32(self.packet_id);
        buf.put_u32(self.payload_length);
    }

    /// Serialize a header-only PDU (CommitSet, UndoSet, CleanupSet).
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::with_capacity(HEADER_SIZE);
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a header from the first 20 bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::decode(
                0,
                DecodeErrorKind::ShortBuffer {
                    needed: HEADER_SIZE,
                    available: buf.len(),
                },
            ));
        }
        let ty = PduType::from_u8(buf[1])
            .ok_or_else(|| Error::decode(1, DecodeErrorKind::UnknownPduType(buf[1])))?;
        Ok(Self {
            version: buf[0],
            ty,
            flags: buf[2],
            session_id: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            transaction_id: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            packet_id: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
            payload_length: u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]]),
        })
    }
}

/// Assemble header + payload, stamping `payload_length`.
pub(crate) fn assemble(header: &mut Header, payload: EncodeBuf) -> Bytes {
    header.payload_length = payload.len() as u32;
    let mut out = EncodeBuf::with_capacity(HEADER_SIZE + payload.len());
    header.encode(&mut out);
    out.put_slice(&payload.freeze());
    out.freeze()
}

/// A decoded inbound PDU, demultiplexed by header type.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    /// Open session request.
    Open(Open),
    /// Close session.
    Close(Close),
    /// Register a subtree.
    Register(Register),
    /// Unregister a subtree.
    Unregister(Register),
    /// Get request.
    Get(Get),
    /// GetNext request.
    GetNext(Get),
    /// First phase of a Set transaction.
    TestSet(TestSet),
    /// Commit phase of a Set transaction.
    CommitSet(Header),
    /// Undo phase of a failed Set transaction.
    UndoSet(Header),
    /// Cleanup phase ending a Set transaction.
    CleanupSet(Header),
    /// Response to an earlier PDU.
    Response(Response),
    /// Recognized but unhandled type (GetBulk, Notify, Ping, Index*,
    /// *AgentCaps); the dispatcher logs and drops these.
    Unsupported(Header),
}

impl Pdu {
    /// Decode a payload against its already-parsed header.
    pub fn decode(header: Header, payload: Bytes) -> Result<Self> {
        let mut dec = Decoder::with_base(payload, HEADER_SIZE);
        let pdu = match header.ty {
            PduType::Open => Self::Open(Open::decode(header, &mut dec)?),
            PduType::Close => Self::Close(Close::decode(header, &mut dec)?),
            PduType::Register => Self::Register(Register::decode(header, &mut dec)?),
            PduType::Unregister => Self::Unregister(Register::decode(header, &mut dec)?),
            PduType::Get => Self::Get(Get::decode(header, &mut dec)?),
            PduType::GetNext => Self::GetNext(Get::decode(header, &mut dec)?),
            PduType::TestSet => Self::TestSet(TestSet::decode(header, &mut dec)?),
            PduType::CommitSet => Self::CommitSet(header),
            PduType::UndoSet => Self::UndoSet(header),
            PduType::CleanupSet => Self::CleanupSet(header),
            PduType::Response => Self::Response(Response::decode(header, &mut dec)?),
            PduType::GetBulk
            | PduType::Notify
            | PduType::Ping
            | PduType::IndexAllocate
            | PduType::IndexDeallocate
            | PduType::AddAgentCaps
            | PduType::RemoveAgentCaps => Self::Unsupported(header),
        };
        Ok(pdu)
    }

    /// The PDU's header.
    pub fn header(&self) -> &Header {
        match self {
            Self::Open(m) => &m.header,
            Self::Close(m) => &m.header,
            Self::Register(m) | Self::Unregister(m) => &m.header,
            Self::Get(m) | Self::GetNext(m) => &m.header,
            Self::TestSet(m) => &m.header,
            Self::CommitSet(h) | Self::UndoSet(h) | Self::CleanupSet(h) => h,
            Self::Response(m) => &m.header,
            Self::Unsupported(h) => h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let mut header = Header::new(PduType::Get);
        header.session_id = 42;
        header.transaction_id = 7;
        header.packet_id = 99;
        header.payload_length = 16;

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(Header::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_wire_layout() {
        let mut header = Header::new(PduType::Response);
        header.session_id = 0x01020304;
        let bytes = header.to_bytes();
        assert_eq!(bytes[0], 1); // version
        assert_eq!(bytes[1], 18); // type
        assert_eq!(bytes[2], flags::NETWORK_BYTE_ORDER);
        assert_eq!(bytes[3], 0); // reserved
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_header_rejects_unknown_type() {
        let mut raw = Header::new(PduType::Get).to_bytes().to_vec();
        raw[1] = 200;
        assert!(matches!(
            Header::decode(&raw).unwrap_err(),
            Error::Decode {
                kind: DecodeErrorKind::UnknownPduType(200),
                ..
            }
        ));
    }

    #[test]
    fn test_header_short_buffer() {
        assert!(Header::decode(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_pdu_type_codes_cover_rfc_table() {
        for code in 1..=18 {
            let ty = PduType::from_u8(code).unwrap();
            assert_eq!(ty.as_u8(), code);
        }
        assert!(PduType::from_u8(0).is_none());
        assert!(PduType::from_u8(19).is_none());
    }

    #[test]
    fn test_close_reason_codes() {
        for code in 1..=6 {
            assert_eq!(CloseReason::from_u8(code).unwrap().as_u8(), code);
        }
        assert!(CloseReason::from_u8(0).is_none());
        assert!(CloseReason::from_u8(7).is_none());
    }

    #[test]
    fn test_unsupported_types_decode_to_header_only() {
        let mut header = Header::new(PduType::Ping);
        header.session_id = 5;
        let pdu = Pdu::decode(header.clone(), Bytes::new()).unwrap();
        assert_eq!(pdu, Pdu::Unsupported(header));
    }
}
