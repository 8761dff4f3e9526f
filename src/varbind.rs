//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a typed value. On the wire (RFC 2741 §5.4)
//! it is `type: u16, reserved: u16, name: OID, data`.

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::{Value, type_code};
use crate::wire::{Decoder, EncodeBuf};

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier naming the variable.
    pub name: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(name: Oid, value: Value) -> Self {
        Self { name, value }
    }

    /// A `noSuchObject` exception binding for the requested OID.
    pub fn no_such_object(name: Oid) -> Self {
        Self {
            name,
            value: Value::NoSuchObject,
        }
    }

    /// An `endOfMibView` exception binding for the requested OID.
    pub fn end_of_mib_view(name: Oid) -> Self {
        Self {
            name,
            value: Value::EndOfMibView,
        }
    }

    /// Encode to the wire form.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.put_u16(self.value.type_code());
        buf.put_u16(0); // reserved
        buf.put_oid(&self.name, false);
        match &self.value {
            Value::Integer(v) => buf.put_i32(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => buf.put_u32(*v),
            Value::Counter64(v) => buf.put_u64(*v),
            Value::OctetString(v) | Value::Opaque(v) => buf.put_octet_string(v),
            Value::IpAddress(v) => buf.put_octet_string(v),
            Value::ObjectIdentifier(oid) => buf.put_oid(oid, false),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {}
        }
    }

    /// Decode from the wire form.
    pub fn decode(dec: &mut Decoder) -> Result<Self> {
        let start = dec.offset();
        let ty = dec.get_u16()?;
        let _reserved = dec.get_u16()?;
        let (name, _include) = dec.get_oid()?;

        let value = match ty {
            type_code::INTEGER => Value::Integer(dec.get_i32()?),
            type_code::COUNTER32 => Value::Counter32(dec.get_u32()?),
            type_code::GAUGE32 => Value::Gauge32(dec.get_u32()?),
            type_code::TIME_TICKS => Value::TimeTicks(dec.get_u32()?),
            type_code::COUNTER64 => Value::Counter64(dec.get_u64()?),
            type_code::OCTET_STRING => Value::OctetString(dec.get_octet_string()?),
            type_code::OPAQUE => Value::Opaque(dec.get_octet_string()?),
            type_code::IP_ADDRESS => {
                let octets = dec.get_octet_string()?;
                let mut addr = [0u8; 4];
                let n = octets.len().min(4);
                addr[..n].copy_from_slice(&octets[..n]);
                Value::IpAddress(addr)
            }
            type_code::OBJECT_IDENTIFIER => {
                let (oid, _) = dec.get_oid()?;
                Value::ObjectIdentifier(oid)
            }
            type_code::NULL => Value::Null,
            type_code::NO_SUCH_OBJECT => Value::NoSuchObject,
            type_code::NO_SUCH_INSTANCE => Value::NoSuchInstance,
            type_code::END_OF_MIB_VIEW => Value::EndOfMibView,
            other => {
                return Err(Error::decode(start, DecodeErrorKind::UnknownVarBindType(other)));
            }
        };

        Ok(Self { name, value })
    }

    /// Encode a standalone VarBind to bytes. Mostly useful for tests and
    /// size accounting; PDU encoding appends in place.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Decode VarBinds until the payload is exhausted.
pub fn decode_varbind_list(dec: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut varbinds = Vec::new();
    while !dec.is_empty() {
        varbinds.push(VarBind::decode(dec)?);
    }
    Ok(varbinds)
}
