//! VarBind value type.
//!
//! Wire type codes are from RFC 2741 §5.4.

use bytes::Bytes;

use crate::oid::Oid;

/// A typed SNMP value carried in a variable binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 32-bit signed integer.
    Integer(i32),
    /// Arbitrary octets.
    OctetString(Bytes),
    /// Null value (placeholder, carries no payload).
    Null,
    /// An OID-valued object.
    ObjectIdentifier(Oid),
    /// IPv4 address.
    IpAddress([u8; 4]),
    /// Monotonic 32-bit counter.
    Counter32(u32),
    /// 32-bit gauge.
    Gauge32(u32),
    /// Hundredths of a second since an epoch.
    TimeTicks(u32),
    /// Opaque octets (application-specific encoding).
    Opaque(Bytes),
    /// Monotonic 64-bit counter.
    Counter64(u64),
    /// Exception: object type not implemented.
    NoSuchObject,
    /// Exception: object exists but this instance does not.
    NoSuchInstance,
    /// Exception: no bindings past this OID.
    EndOfMibView,
}

/// VarBind type codes (RFC 2741 §5.4).
pub mod type_code {
    pub const INTEGER: u16 = 2;
    pub const OCTET_STRING: u16 = 4;
    pub const NULL: u16 = 5;
    pub const OBJECT_IDENTIFIER: u16 = 6;
    pub const IP_ADDRESS: u16 = 64;
    pub const COUNTER32: u16 = 65;
    pub const GAUGE32: u16 = 66;
    pub const TIME_TICKS: u16 = 67;
    pub const OPAQUE: u16 = 68;
    pub const COUNTER64: u16 = 70;
    pub const NO_SUCH_OBJECT: u16 = 128;
    pub const NO_SUCH_INSTANCE: u16 = 129;
    pub const END_OF_MIB_VIEW: u16 = 130;
}

impl Value {
    /// The wire type code for this value.
    pub fn type_code(&self) -> u16 {
        match self {
            Self::Integer(_) => type_code::INTEGER,
            Self::OctetString(_) => type_code::OCTET_STRING,
            Self::Null => type_code::NULL,
            Self::ObjectIdentifier(_) => type_code::OBJECT_IDENTIFIER,
            Self::IpAddress(_) => type_code::IP_ADDRESS,
            Self::Counter32(_) => type_code::COUNTER32,
            Self::Gauge32(_) => type_code::GAUGE32,
            Self::TimeTicks(_) => type_code::TIME_TICKS,
            Self::Opaque(_) => type_code::OPAQUE,
            Self::Counter64(_) => type_code::COUNTER64,
            Self::NoSuchObject => type_code::NO_SUCH_OBJECT,
            Self::NoSuchInstance => type_code::NO_SUCH_INSTANCE,
            Self::EndOfMibView => type_code::END_OF_MIB_VIEW,
        }
    }

    /// True for the three payload-less exception values.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::OctetString(v) | Self::Opaque(v) => {
                match std::str::from_utf8(v) {
                    Ok(s) if !s.contains(char::is_control) => write!(f, "{:?}", s),
                    _ => {
                        for byte in v.iter() {
                            write!(f, "{:02x}", byte)?;
                        }
                        Ok(())
                    }
                }
            }
            Self::Null => write!(f, "null"),
            Self::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Self::IpAddress([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Self::Counter32(v) | Self::Gauge32(v) => write!(f, "{}", v),
            Self::TimeTicks(v) => write!(f, "{} ticks", v),
            Self::Counter64(v) => write!(f, "{}", v),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::OctetString(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::OctetString(Bytes::from(v))
    }
}
