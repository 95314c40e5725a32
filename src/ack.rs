// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use crate::error::CodecError;
use crate::fixed_buffer::FixedBuffer;
use crate::incoming::IncomingPacket;
use crate::packet_type::AckPacketType;

/// Remaining Length of every simple ack: a 2-byte packet identifier,
/// nothing else.
const ACK_REMAINING_LENGTH: usize = 2;
const ACK_REMAINING_LENGTH_BYTE: u8 = 2;

/// Serialize a PUBACK, PUBREC, PUBREL, PUBCOMP or UNSUBACK packet.
///
/// All five share the wire shape `[type][0x02][id_hi][id_lo]`; only the
/// fixed-header first byte differs (PUBREL sets a reserved flag bit).
///
/// # Errors
///
/// Returns `CodecError::BadParameter` if `packet_id` is zero, or
/// `CodecError::NoMemory` if `buf` is smaller than 4 bytes.
pub fn serialize_ack(
    packet_type: AckPacketType,
    packet_id: u16,
    buf: &mut FixedBuffer,
) -> Result<usize, CodecError> {
    if packet_id == 0 {
        return Err(CodecError::BadParameter);
    }
    buf.write_u8(packet_type.first_byte())?;
    buf.write_u8(ACK_REMAINING_LENGTH_BYTE)?;
    buf.write_u16_be(packet_id)?;
    Ok(buf.len())
}

/// Parse a PUBACK, PUBREC, PUBREL, PUBCOMP or UNSUBACK packet, returning
/// its packet identifier.
///
/// # Errors
///
/// Returns `CodecError::BadResponse` if `packet.packet_type`'s high
/// nibble does not match `expected`, if the Remaining Length is not 2,
/// or if the packet identifier is zero.
pub fn deserialize_ack(
    packet: &IncomingPacket,
    expected: AckPacketType,
) -> Result<u16, CodecError> {
    let nibble = packet.type_nibble();
    match AckPacketType::from_type_nibble(nibble) {
        Some(actual) if actual == expected => {}
        _ => {
            log::error!("ack: expected {expected:?}, got type nibble {nibble:#x}");
            return Err(CodecError::BadResponse);
        }
    }

    if packet.remaining_length != ACK_REMAINING_LENGTH || packet.data.len() != ACK_REMAINING_LENGTH
    {
        return Err(CodecError::BadResponse);
    }

    let packet_id = u16::from_be_bytes([packet.data[0], packet.data[1]]);
    if packet_id == 0 {
        return Err(CodecError::BadResponse);
    }
    Ok(packet_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_puback() {
        let mut raw = [0u8; 4];
        let mut buf = FixedBuffer::new(&mut raw);
        serialize_ack(AckPacketType::PubAck, 7, &mut buf).unwrap();
        assert_eq!(buf.written(), &[0x40, 0x02, 0x00, 0x07]);
    }

    #[test]
    fn serialize_pubrel_sets_reserved_bit() {
        let mut raw = [0u8; 4];
        let mut buf = FixedBuffer::new(&mut raw);
        serialize_ack(AckPacketType::PubRel, 1, &mut buf).unwrap();
        assert_eq!(buf.written(), &[0x62, 0x02, 0x00, 0x01]);
    }

    #[test]
    fn serialize_zero_packet_id_is_bad_parameter() {
        let mut raw = [0u8; 4];
        let mut buf = FixedBuffer::new(&mut raw);
        assert_eq!(
            serialize_ack(AckPacketType::PubAck, 0, &mut buf),
            Err(CodecError::BadParameter)
        );
    }

    #[test]
    fn deserialize_round_trip() {
        let data = [0x00, 0x07];
        let packet = IncomingPacket::new(0x40, &data);
        assert_eq!(
            deserialize_ack(&packet, AckPacketType::PubAck),
            Ok(7)
        );
    }

    #[test]
    fn deserialize_wrong_type_is_bad_response() {
        let data = [0x00, 0x07];
        let packet = IncomingPacket::new(0x50, &data);
        assert_eq!(
            deserialize_ack(&packet, AckPacketType::PubAck),
            Err(CodecError::BadResponse)
        );
    }

    #[test]
    fn deserialize_zero_packet_id_is_bad_response() {
        let data = [0x00, 0x00];
        let packet = IncomingPacket::new(0x40, &data);
        assert_eq!(
            deserialize_ack(&packet, AckPacketType::PubAck),
            Err(CodecError::BadResponse)
        );
    }

    #[test]
    fn deserialize_unsuback_round_trip() {
        let data = [0x00, 0x0A];
        let packet = IncomingPacket::new(0xB0, &data);
        assert_eq!(
            deserialize_ack(&packet, AckPacketType::UnsubAck),
            Ok(10)
        );
    }
}
