//! Transport layer: framed PDU exchange over the AgentX stream socket.
//!
//! Receives are two paired reads, header then payload, so PDU boundaries
//! always align with what [`read_pdu`] returns; there is no buffer to
//! resynchronize after a short read.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::{HEADER_SIZE, Header, VERSION};

/// The well-known AgentX master socket (RFC 2741 §8.2).
pub const MASTER_SOCKET_PATH: &str = "/var/agentx/master";

/// Upper bound on a single PDU payload. Far above anything a master sends
/// in practice; stops a corrupt length field from allocating gigabytes.
pub const MAX_PAYLOAD_LENGTH: u32 = 1 << 24;

/// Read one framed PDU: the 20-byte header, then exactly
/// `payload_length` more bytes.
///
/// Returns `Ok(None)` on a clean EOF at a PDU boundary. An EOF inside a
/// PDU surfaces as an I/O error. A header that fails validation is still
/// fully consumed (payload included) before the error is returned, so the
/// caller can log it and keep reading.
pub async fn read_pdu<R>(reader: &mut R) -> Result<Option<(Header, Bytes)>>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; HEADER_SIZE];
    match reader.read_exact(&mut header_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    // Parse the length before validating anything else so a bad version
    // or type still leaves the stream aligned on the next PDU.
    let payload_length = u32::from_be_bytes([
        header_buf[16],
        header_buf[17],
        header_buf[18],
        header_buf[19],
    ]);
    if payload_length > MAX_PAYLOAD_LENGTH {
        return Err(Error::decode(
            16,
            DecodeErrorKind::PayloadTooLarge {
                length: payload_length,
                max: MAX_PAYLOAD_LENGTH,
            },
        ));
    }

    let mut payload = BytesMut::zeroed(payload_length as usize);
    if !payload.is_empty() {
        reader.read_exact(&mut payload).await?;
    }

    if header_buf[0] != VERSION {
        return Err(Error::decode(
            0,
            DecodeErrorKind::UnknownVersion(header_buf[0]),
        ));
    }
    let header = Header::decode(&header_buf)?;

    Ok(Some((header, payload.freeze())))
}

/// Write one fully-marshalled PDU.
pub async fn write_pdu<W>(writer: &mut W, pdu: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(pdu).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::{CloseReason, Close, PduType};

    #[tokio::test]
    async fn test_read_back_to_back_pdus() {
        let mut close = Close::new(CloseReason::Shutdown, 1);
        let mut wire = close.encode().to_vec();
        wire.extend_from_slice(&Close::new(CloseReason::Other, 2).encode());

        let mut reader = &wire[..];
        let (first, payload) = read_pdu(&mut reader).await.unwrap().unwrap();
        assert_eq!(first.ty, PduType::Close);
        assert_eq!(first.session_id, 1);
        assert_eq!(payload.len(), 4);

        let (second, _) = read_pdu(&mut reader).await.unwrap().unwrap();
        assert_eq!(second.session_id, 2);

        assert!(read_pdu(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_at_boundary_is_clean() {
        let mut reader = &[][..];
        assert!(read_pdu(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_eof_mid_pdu_is_io_error() {
        let mut open = crate::pdu::Open::new(Some(oid!(1, 2, 3)), Some("cut short"));
        let bytes = open.encode();
        let mut reader = &bytes[..bytes.len() - 2];
        assert!(matches!(
            read_pdu(&mut reader).await.unwrap_err(),
            Error::Io { .. }
        ));
    }

    #[tokio::test]
    async fn test_bad_version_consumes_whole_pdu() {
        let mut close = Close::new(CloseReason::Shutdown, 1);
        let mut wire = close.encode().to_vec();
        wire[0] = 2; // wrong version
        wire.extend_from_slice(&Close::new(CloseReason::Other, 2).encode());

        let mut reader = &wire[..];
        let err = read_pdu(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::UnknownVersion(2),
                ..
            }
        ));

        // The bad PDU was consumed in full; the next one parses.
        let (next, _) = read_pdu(&mut reader).await.unwrap().unwrap();
        assert_eq!(next.session_id, 2);
    }

    #[tokio::test]
    async fn test_oversized_length_rejected() {
        let mut close = Close::new(CloseReason::Shutdown, 1);
        let mut wire = close.encode().to_vec();
        wire[16..20].copy_from_slice(&u32::MAX.to_be_bytes());
        let mut reader = &wire[..];
        assert!(matches!(
            read_pdu(&mut reader).await.unwrap_err(),
            Error::Decode {
                kind: DecodeErrorKind::PayloadTooLarge { .. },
                ..
            }
        ));
    }
}
