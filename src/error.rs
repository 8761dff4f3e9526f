//! Error types for async-agentx.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.

use std::time::Duration;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Wire decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Ran off the end of the PDU.
    ShortBuffer { needed: usize, available: usize },
    /// Unknown AgentX protocol version.
    UnknownVersion(u8),
    /// Unknown PDU type code.
    UnknownPduType(u8),
    /// Unknown Close reason code.
    UnknownCloseReason(u8),
    /// Unknown VarBind type code.
    UnknownVarBindType(u16),
    /// OID has more sub-identifiers than RFC 2741 allows (128).
    OidTooLong { count: usize },
    /// Declared payload length exceeds the sanity cap.
    PayloadTooLarge { length: u32, max: u32 },
    /// Octet string length field does not fit the remaining payload.
    InvalidLength { length: u32 },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortBuffer { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::UnknownVersion(v) => write!(f, "unknown AgentX version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: {}", t),
            Self::UnknownCloseReason(r) => write!(f, "unknown close reason: {}", r),
            Self::UnknownVarBindType(t) => write!(f, "unknown VarBind type: {}", t),
            Self::OidTooLong { count } => {
                write!(f, "OID has {} sub-identifiers, exceeds maximum 128", count)
            }
            Self::PayloadTooLarge { length, max } => {
                write!(f, "payload length {} exceeds maximum {}", length, max)
            }
            Self::InvalidLength { length } => {
                write!(f, "length field {} overruns the payload", length)
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// An arc is not an unsigned 32-bit decimal integer.
    InvalidArc,
    /// OID has too many arcs (exceeds 128).
    TooManyArcs { count: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "arc is not an unsigned 32-bit integer"),
            Self::TooManyArcs { count } => {
                write!(f, "OID has {} arcs, exceeds maximum 128", count)
            }
        }
    }
}

/// Protocol error kinds: the master misbehaved or rejected us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// Master replied with a non-zero error status.
    MasterError { code: u16 },
    /// Received a PDU type inappropriate for the current session state.
    UnexpectedPdu { ty: u8 },
}

impl std::fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MasterError { code } => write!(f, "master agent returned error {}", code),
            Self::UnexpectedPdu { ty } => write!(f, "unexpected PDU type {}", ty),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error on the master agent socket.
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// The Open handshake did not complete within the deadline.
    #[error("open handshake timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Wire decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// AgentX protocol violation or master-reported failure.
    #[error("protocol error: {kind}")]
    Protocol { kind: ProtocolErrorKind },

    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_deref().map(|i| format!(" {:?}", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// A send was attempted on a session past Closing.
    #[error("session is closed")]
    Closed,
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create a protocol error.
    pub fn protocol(kind: ProtocolErrorKind) -> Self {
        Self::Protocol { kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// True if this error represents the peer going away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Io { source } => matches!(
                source.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
