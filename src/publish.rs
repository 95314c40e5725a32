// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::byte_reader::ByteReader;
use crate::error::CodecError;
use crate::fixed_buffer::FixedBuffer;
use crate::incoming::IncomingPacket;
use crate::packet_type::type_nibble;
use crate::qos::QoS;
use crate::remaining_length;
use crate::PacketSize;

/// Smallest legal Remaining Length of a QoS 0 PUBLISH: a 2-byte topic
/// name length field plus at least one byte of topic name.
const MIN_PUBLISH_REMAINING_LENGTH_QOS0: usize = 3;

/// A PUBLISH packet's variable header and payload, borrowed from the
/// caller on both the encode and decode paths.
///
/// `topic` and `payload` alias the caller's buffer; on deserialization
/// they point into the slice the caller passed to the framer, and
/// remain valid only as long as that buffer is alive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublishInfo<'a> {
    pub qos: QoS,
    pub retain: bool,
    pub dup: bool,
    pub topic: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> PublishInfo<'a> {
    /// Fixed-header first byte: `0x30` with DUP (bit 3), QoS (bits 2:1)
    /// and RETAIN (bit 0) folded in.
    fn first_byte(&self) -> u8 {
        let dup = u8::from(self.dup) << 3;
        let qos = u8::from(self.qos) << 1;
        let retain = u8::from(self.retain);
        (type_nibble::PUBLISH << 4) | dup | qos | retain
    }

    fn remaining_length(&self) -> Result<usize, CodecError> {
        let mut len = 2usize
            .checked_add(self.topic.len())
            .ok_or(CodecError::BadParameter)?;
        if !self.qos.is_at_most_once() {
            len = len.checked_add(2).ok_or(CodecError::BadParameter)?;
        }
        len.checked_add(self.payload.len())
            .ok_or(CodecError::BadParameter)
    }
}

/// Compute the Remaining Length and total packet size of a PUBLISH.
///
/// # Errors
///
/// Returns `CodecError::BadParameter` if the computed Remaining Length
/// would exceed [`remaining_length::MAX_REMAINING_LENGTH`].
pub fn size_publish(publish: &PublishInfo) -> Result<PacketSize, CodecError> {
    let remaining_length = publish.remaining_length()?;
    PacketSize::from_remaining_length(remaining_length)
}

fn serialize_publish_common(
    publish: &PublishInfo,
    packet_id: u16,
    buf: &mut FixedBuffer,
) -> Result<(), CodecError> {
    if publish.dup && publish.qos.is_at_most_once() {
        // The DUP flag MUST be set to 0 for all QoS 0 messages [MQTT-3.3.1-2].
        return Err(CodecError::BadParameter);
    }
    if !publish.qos.is_at_most_once() && packet_id == 0 {
        return Err(CodecError::BadParameter);
    }

    let remaining_length = publish.remaining_length()?;
    buf.write_u8(publish.first_byte())?;
    remaining_length::encode(remaining_length, buf)?;
    buf.write_length_prefixed(publish.topic)?;
    if !publish.qos.is_at_most_once() {
        buf.write_u16_be(packet_id)?;
    }
    Ok(())
}

/// Serialize a full PUBLISH packet, including the payload, into `buf`.
///
/// `packet_id` is ignored for QoS 0 and must be non-zero otherwise.
///
/// # Errors
///
/// Returns `CodecError::BadParameter` for an invalid DUP/QoS
/// combination or a zero packet identifier at QoS > 0, and
/// `CodecError::NoMemory` if `buf` is smaller than [`size_publish`]
/// reports.
pub fn serialize_publish(
    publish: &PublishInfo,
    packet_id: u16,
    buf: &mut FixedBuffer,
) -> Result<usize, CodecError> {
    serialize_publish_common(publish, packet_id, buf)?;
    buf.write_bytes(publish.payload)?;
    Ok(buf.len())
}

/// Serialize everything through the end of the PUBLISH variable header
/// (fixed header, topic name, packet identifier if QoS > 0) but omit
/// the payload, so the caller can stream a large payload directly to
/// the network without a second copy into a contiguous buffer.
///
/// Returns the number of header bytes written; the caller resumes
/// writing (or transmitting) the payload at that offset.
///
/// # Errors
///
/// Same as [`serialize_publish`].
pub fn serialize_publish_header(
    publish: &PublishInfo,
    packet_id: u16,
    buf: &mut FixedBuffer,
) -> Result<usize, CodecError> {
    serialize_publish_common(publish, packet_id, buf)?;
    Ok(buf.len())
}

/// Parse a PUBLISH packet out of an already-framed [`IncomingPacket`].
///
/// Returns the parsed [`PublishInfo`] (its `topic` and `payload` alias
/// `packet.data`) together with the packet identifier, which is 0 for
/// QoS 0 publishes.
///
/// # Errors
///
/// Returns `CodecError::BadResponse` if: both QoS bits are set, the
/// Remaining Length is too short for the declared QoS, or the packet
/// identifier is zero for QoS > 0.
pub fn deserialize_publish<'a>(
    packet: &IncomingPacket<'a>,
) -> Result<(PublishInfo<'a>, u16), CodecError> {
    let flags = packet.packet_type & 0x0F;
    let dup = flags & 0b0000_1000 != 0;
    let retain = flags & 0b0000_0001 != 0;
    let qos = QoS::try_from((flags & 0b0000_0110) >> 1)?;

    // The DUP flag MUST be set to 0 for all QoS 0 messages [MQTT-3.3.1-2].
    if dup && qos.is_at_most_once() {
        return Err(CodecError::BadResponse);
    }

    let min_len = if qos.is_at_most_once() {
        MIN_PUBLISH_REMAINING_LENGTH_QOS0
    } else {
        MIN_PUBLISH_REMAINING_LENGTH_QOS0 + 2
    };
    if packet.remaining_length < min_len {
        return Err(CodecError::BadResponse);
    }

    let mut reader = ByteReader::new(packet.data);
    let topic = reader.read_length_prefixed()?;

    let packet_id = if qos.is_at_most_once() {
        0
    } else {
        let id = reader.read_u16_be()?;
        if id == 0 {
            return Err(CodecError::BadResponse);
        }
        id
    };

    let payload = reader.read_bytes(reader.remaining())?;

    Ok((
        PublishInfo {
            qos,
            retain,
            dup,
            topic,
            payload,
        },
        packet_id,
    ))
}
