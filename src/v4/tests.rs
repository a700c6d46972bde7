use super::message::{
    self, describe_offer, options, MAGIC_COOKIE, MAGIC_COOKIE_OFFSET, MIN_PACKET_SIZE,
    OPTIONS_OFFSET,
};
use super::*;
use bytes::Bytes;
use dhcproto::{v4, Decodable, Decoder, Encodable, Encoder};
use std::net::Ipv4Addr;

const XID: u32 = 0x12345678;

fn mac() -> Bytes {
    Bytes::from_static(&[0x00, 0x0c, 0x29, 0xa8, 0x92, 0xf4])
}

/// A minimal reply: fixed header, cookie, then the given option bytes.
fn reply(xid: u32, opts: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; OPTIONS_OFFSET];
    packet[0] = 2;
    packet[1] = 1;
    packet[2] = 6;
    packet[4..8].copy_from_slice(&xid.to_be_bytes());
    packet[MAGIC_COOKIE_OFFSET..OPTIONS_OFFSET].copy_from_slice(&MAGIC_COOKIE);
    packet.extend_from_slice(opts);
    packet
}

#[test]
fn test_build_dhcp_discover_layout() {
    let packet = build_dhcp_discover(&mac(), XID);

    assert_eq!(packet.len(), MIN_PACKET_SIZE);
    assert_eq!(&packet[..4], &[1, 1, 6, 0]);
    assert_eq!(&packet[4..8], &XID.to_be_bytes());
    assert_eq!(&packet[8..10], &[0, 0]);
    assert_eq!(&packet[10..12], &[0x80, 0x00]);
    assert!(packet[12..28].iter().all(|&b| b == 0));
    assert_eq!(&packet[28..34], &mac()[..]);
    assert!(packet[34..MAGIC_COOKIE_OFFSET].iter().all(|&b| b == 0));
    assert_eq!(&packet[MAGIC_COOKIE_OFFSET..OPTIONS_OFFSET], &MAGIC_COOKIE);
    assert_eq!(
        &packet[OPTIONS_OFFSET..OPTIONS_OFFSET + 10],
        &[53, 1, 1, 55, 4, 1, 3, 6, 15, 255]
    );
    assert!(packet[OPTIONS_OFFSET + 10..].iter().all(|&b| b == 0));
}

#[test]
fn test_build_dhcp_discover_decodes() {
    let packet = build_dhcp_discover(&mac(), XID);

    // Decode the packet to verify it's valid
    let mut decoder = Decoder::new(&packet);
    let msg = v4::Message::decode(&mut decoder).unwrap();

    assert_eq!(msg.xid(), XID);
    assert_eq!(msg.chaddr(), &mac()[..]);
    assert_eq!(msg.opcode(), v4::Opcode::BootRequest);
    assert!(msg.flags().broadcast());

    let msg_type = msg.opts().get(v4::OptionCode::MessageType);
    assert!(matches!(
        msg_type,
        Some(v4::DhcpOption::MessageType(v4::MessageType::Discover))
    ));

    let params = msg.opts().get(v4::OptionCode::ParameterRequestList);
    assert!(matches!(
        params,
        Some(v4::DhcpOption::ParameterRequestList(codes)) if codes == &vec![
            v4::OptionCode::SubnetMask,
            v4::OptionCode::Router,
            v4::OptionCode::DomainNameServer,
            v4::OptionCode::DomainName,
        ]
    ));
}

#[test]
fn test_build_dhcp_discover_short_mac_is_zeroed() {
    for short in [&[][..], &[0xaa, 0xbb, 0xcc][..]] {
        let packet = build_dhcp_discover(short, XID);
        assert_eq!(packet.len(), MIN_PACKET_SIZE);
        assert!(packet[28..34].iter().all(|&b| b == 0));
        assert_eq!(packet[2], 6);
    }
}

#[test]
fn test_build_dhcp_discover_long_hardware_address() {
    let long = [1, 2, 3, 4, 5, 6, 7, 8];
    let packet = build_dhcp_discover(&long, XID);
    assert_eq!(&packet[28..34], &long[..6]);
    assert_eq!(packet[34], 0);
}

#[test]
fn test_discover_request_encodes_its_fields() {
    let request = DiscoverRequest::new(mac(), XID);
    assert_eq!(request.xid(), XID);
    assert_eq!(request.encode(), build_dhcp_discover(&mac(), XID));
}

#[test]
fn test_accepts_offer() {
    let packet = reply(XID, &[53, 1, 2, 255]);
    assert_eq!(validate_offer(&packet, XID), Ok(()));
}

#[test]
fn test_rejects_other_message_types() {
    let packet = reply(XID, &[53, 1, 5, 255]);
    assert_eq!(validate_offer(&packet, XID), Err(Rejection::NotOffer(5)));

    let packet = reply(XID, &[255]);
    assert_eq!(
        validate_offer(&packet, XID),
        Err(Rejection::MissingMessageType)
    );
}

#[test]
fn test_rejects_short_packets() {
    let full = reply(XID, &[53, 1, 2, 255]);
    for len in [0, 1, 8, 236, OPTIONS_OFFSET - 1] {
        assert_eq!(
            validate_offer(&full[..len], XID),
            Err(Rejection::TooShort(len))
        );
    }
}

#[test]
fn test_rejects_bad_magic_cookie() {
    for i in MAGIC_COOKIE_OFFSET..OPTIONS_OFFSET {
        let mut packet = reply(XID, &[53, 1, 2, 255]);
        packet[i] ^= 0x01;
        assert!(matches!(
            validate_offer(&packet, XID),
            Err(Rejection::BadMagicCookie(_))
        ));
    }
}

#[test]
fn test_rejects_transaction_mismatch() {
    let packet = reply(0x87654321, &[53, 1, 2, 255]);
    assert_eq!(
        validate_offer(&packet, XID),
        Err(Rejection::TransactionMismatch {
            expected: XID,
            actual: 0x87654321
        })
    );
}

#[test]
fn test_message_type_after_other_options() {
    let packet = reply(
        XID,
        &[0, 0, 1, 4, 255, 255, 255, 0, 54, 4, 192, 168, 1, 1, 53, 1, 2, 255],
    );
    assert_eq!(message::message_type(&packet), Some(2));
    assert_eq!(validate_offer(&packet, XID), Ok(()));
}

#[test]
fn test_pad_is_a_single_byte() {
    let packet = reply(XID, &[0, 53, 1, 2, 255]);
    assert_eq!(options(&packet).collect::<Vec<_>>(), vec![(53, &[2u8][..])]);
    assert_eq!(validate_offer(&packet, XID), Ok(()));
}

#[test]
fn test_options_stop_at_end() {
    let packet = reply(XID, &[255, 53, 1, 2]);
    assert_eq!(options(&packet).count(), 0);
    assert_eq!(
        validate_offer(&packet, XID),
        Err(Rejection::MissingMessageType)
    );
}

#[test]
fn test_truncated_option_is_rejected() {
    // Declared length runs past the end of the datagram.
    let packet = reply(XID, &[53, 5, 2]);
    assert_eq!(
        validate_offer(&packet, XID),
        Err(Rejection::MissingMessageType)
    );

    // Length byte missing entirely.
    let packet = reply(XID, &[1, 4, 255, 255, 255, 0, 53]);
    assert_eq!(options(&packet).count(), 1);
    assert_eq!(
        validate_offer(&packet, XID),
        Err(Rejection::MissingMessageType)
    );
}

#[test]
fn test_empty_message_type_is_skipped() {
    let packet = reply(XID, &[53, 0, 53, 1, 2, 255]);
    assert_eq!(validate_offer(&packet, XID), Ok(()));
}

#[test]
fn test_field_accessors() {
    let packet = reply(XID, &[255]);
    assert_eq!(message::transaction_id(&packet), Some(XID));
    assert_eq!(message::magic_cookie(&packet), Some(MAGIC_COOKIE));
    assert_eq!(message::transaction_id(&packet[..7]), None);
    assert_eq!(message::magic_cookie(&packet[..239]), None);
    assert_eq!(options(&packet[..100]).count(), 0);
}

#[test]
fn test_accepts_offer_encoded_by_dhcproto() {
    let offered_ip = Ipv4Addr::new(192, 168, 1, 100);
    let server_ip = Ipv4Addr::new(192, 168, 1, 1);

    let mut msg = v4::Message::default();
    msg.set_opcode(v4::Opcode::BootReply)
        .set_chaddr(&mac())
        .set_xid(XID)
        .set_yiaddr(offered_ip)
        .set_flags(v4::Flags::default().set_broadcast());
    msg.opts_mut()
        .insert(v4::DhcpOption::MessageType(v4::MessageType::Offer));
    msg.opts_mut()
        .insert(v4::DhcpOption::ServerIdentifier(server_ip));

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer);
    msg.encode(&mut encoder).unwrap();

    assert_eq!(validate_offer(&buffer, XID), Ok(()));

    let summary = describe_offer(&buffer).unwrap();
    assert_eq!(summary.offered_ip, offered_ip);
    assert_eq!(summary.server_identifier, Some(server_ip));
}

#[test]
fn test_describe_offer_tolerates_garbage() {
    assert!(describe_offer(&[0u8; 10]).is_none());
}
