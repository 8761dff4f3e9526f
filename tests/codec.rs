//! Wire-level round-trip tests against known AgentX encodings.

use bytes::Bytes;

use async_agentx::oid::Oid;
use async_agentx::pdu::{
    CLOSE_TAG, Close, CloseReason, Get, HEADER_SIZE, Header, Open, Pdu, Register, Response,
    SearchRange, TestSet, flags,
};
use async_agentx::value::Value;
use async_agentx::varbind::VarBind;
use async_agentx::wire::Decoder;
use async_agentx::{SetResult, oid};

fn decode_back(bytes: Bytes) -> Pdu {
    let header = Header::decode(&bytes).unwrap();
    // payload_length must account for every byte after the header
    assert_eq!(header.payload_length as usize, bytes.len() - HEADER_SIZE);
    Pdu::decode(header, bytes.slice(HEADER_SIZE..)).unwrap()
}

#[test]
fn open_message_round_trip() {
    let mut open = Open::new(Some("1.2.3.4.7".parse().unwrap()), Some("muffin man"));
    let bytes = open.encode();

    // timeout word + five uncompressed arcs + "muffin man" padded to 12
    assert_eq!(open.header.payload_length, 44);
    assert_eq!(open.header.payload_length, 4 + (4 + 4 * 5) + (4 + 12));

    match decode_back(bytes) {
        Pdu::Open(decoded) => {
            assert_eq!(decoded, open);
            assert_eq!(&decoded.descr[..], b"muffin man");
        }
        other => panic!("wrong PDU: {:?}", other),
    }
}

#[test]
fn close_message_round_trip() {
    let mut close = Close::new(CloseReason::Shutdown, 47);
    let bytes = close.encode();

    assert_eq!(close.header.ty.as_u8(), 2);
    assert_eq!(close.header.transaction_id, CLOSE_TAG);
    assert_eq!(close.reason.as_u8(), 5);

    match decode_back(bytes) {
        Pdu::Close(decoded) => assert_eq!(decoded, close),
        other => panic!("wrong PDU: {:?}", other),
    }
}

#[test]
fn integer_varbind_round_trip() {
    let vb = VarBind::new("1.3.5.1.2.1.17".parse().unwrap(), Value::Integer(47));
    let bytes = vb.to_bytes();

    // type word + OID header + 7 arcs + integer
    assert_eq!(bytes.len(), 40);

    let decoded = VarBind::decode(&mut Decoder::new(bytes)).unwrap();
    assert_eq!(decoded, vb);
}

#[test]
fn octet_string_varbind_round_trip() {
    let vb = VarBind::new(
        "1.3.5.1.2.1.17".parse().unwrap(),
        Value::OctetString(Bytes::from_static(&[0xcc, 0x33])),
    );
    let bytes = vb.to_bytes();

    // The octet string field: length 2, payload, two pad bytes
    assert_eq!(&bytes[bytes.len() - 8..], &[0, 0, 0, 2, 0xcc, 0x33, 0, 0]);

    let decoded = VarBind::decode(&mut Decoder::new(bytes)).unwrap();
    assert_eq!(decoded.name, vb.name);
    assert_eq!(decoded.value, Value::OctetString(Bytes::from_static(&[0xcc, 0x33])));
}

#[test]
fn every_pdu_stamps_exact_payload_length() {
    let pdus: Vec<Bytes> = vec![
        Open::new(None, None).encode(),
        Open::new(Some(oid!(1, 3, 6, 1, 4, 1, 99999)), Some("x")).encode(),
        Close::new(CloseReason::Timeouts, 9).encode(),
        Register::new(oid!(1, 3, 6, 1, 2, 1, 17)).encode(),
        Register::new(oid!(1, 3, 6, 1, 2, 1, 17))
            .with_context(&b"backbone"[..])
            .with_range(11, 4094)
            .encode(),
        Register::unregister(oid!(1, 3, 6, 1, 2, 1, 17)).encode(),
        Get::new(vec![SearchRange::from(oid!(1, 3, 6, 1, 1, 0))]).encode(),
        Get::get_next(vec![
            SearchRange::from(oid!(1, 3, 6, 1, 1, 0)),
            SearchRange::from(oid!(1, 3, 6, 1, 2, 0)),
        ])
        .encode(),
        TestSet::new(vec![VarBind::new(oid!(1, 3, 6, 1, 1, 0), Value::from("v"))]).encode(),
        Response::to(&Header::new(async_agentx::pdu::PduType::Get))
            .with_error(SetResult::NotWritable.code(), 1)
            .with_varbinds(vec![VarBind::new(oid!(1, 3, 6, 1), Value::Counter64(1))])
            .encode(),
    ];

    for bytes in pdus {
        let header = Header::decode(&bytes).unwrap();
        assert_eq!(
            header.payload_length as usize,
            bytes.len() - HEADER_SIZE,
            "payload_length mismatch for type {:?}",
            header.ty
        );
        // All wire structures stay 4-byte aligned
        assert_eq!(bytes.len() % 4, 0);
        // And every one decodes back
        Pdu::decode(header, bytes.slice(HEADER_SIZE..)).unwrap();
    }
}

#[test]
fn response_echoes_request_correlation() {
    let mut request = Header::new(async_agentx::pdu::PduType::TestSet);
    request.session_id = 7;
    request.transaction_id = 31337;
    request.packet_id = 424242;
    request.flags = flags::NETWORK_BYTE_ORDER | flags::NON_DEFAULT_CONTEXT;

    let response = Response::to(&request);
    assert_eq!(response.header.session_id, 7);
    assert_eq!(response.header.transaction_id, 31337);
    assert_eq!(response.header.packet_id, 424242);
    assert_eq!(response.header.flags, flags::NETWORK_BYTE_ORDER);
}

#[test]
fn oid_comparison_is_on_expanded_arcs() {
    // The compressed form must not influence ordering: 1.3.6.1.4 encodes
    // with a prefix byte while 1.3.7 does not, yet compares above it.
    let compressed: Oid = "1.3.6.1.4.1".parse().unwrap();
    let plain: Oid = "1.3.7".parse().unwrap();
    assert!(compressed < plain);

    let shorter: Oid = "1.3.6.1.4".parse().unwrap();
    assert!(shorter < compressed);
}
