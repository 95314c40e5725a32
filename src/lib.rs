// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Zero-copy, zero-allocation wire codec for MQTT v3.1.1 control packets.
//!
//! Every serializer writes into a caller-provided [`FixedBuffer`]; every
//! deserializer reads out of a caller-provided byte slice (wrapped as an
//! [`IncomingPacket`]) or, for framing, a caller-provided pull reader.
//! The crate never allocates and holds no session state: each call is
//! independent, and a caller drives the CONNECT/PINGREQ/keep-alive
//! timers and retransmission policy itself.

mod ack;
mod byte_reader;
mod connect;
mod connect_ack;
mod disconnect;
mod error;
mod fixed_buffer;
mod framer;
mod incoming;
mod packet_type;
mod ping;
mod publish;
mod qos;
mod remaining_length;
mod subscribe;
mod subscribe_ack;
mod unsubscribe;

pub use ack::{deserialize_ack, serialize_ack};
pub use byte_reader::ByteReader;
pub use connect::{size_connect, serialize_connect, ConnectInfo, WillInfo};
pub use connect_ack::{deserialize_connack, ConnAck, ConnectReturnCode};
pub use disconnect::{serialize_disconnect, size_disconnect};
pub use error::CodecError;
pub use fixed_buffer::FixedBuffer;
pub use framer::{read_incoming_packet, IncomingHeader, PacketReader};
pub use incoming::IncomingPacket;
pub use packet_type::AckPacketType;
pub use ping::{deserialize_pingresp, serialize_pingreq};
pub use publish::{
    deserialize_publish, serialize_publish, serialize_publish_header, size_publish, PublishInfo,
};
pub use qos::QoS;
pub use remaining_length::MAX_REMAINING_LENGTH;
pub use subscribe::{serialize_subscribe, size_subscribe, SubscribeTopic};
pub use subscribe_ack::{deserialize_suback, SubAck, SubscribeReasonCode};
pub use unsubscribe::{serialize_unsubscribe, size_unsubscribe};

/// Remaining Length plus total on-wire size of an encoded packet, as
/// returned by each `size_*` sizing function. The caller allocates (or
/// reuses) a buffer of at least `packet_size` bytes before calling the
/// matching `serialize_*` function.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PacketSize {
    pub remaining_length: usize,
    pub packet_size: usize,
}

impl PacketSize {
    /// Build a `PacketSize` from an already-computed Remaining Length,
    /// adding the 1-byte packet type field and the Remaining Length
    /// field's own encoded size.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::BadParameter` if `remaining_length` exceeds
    /// [`MAX_REMAINING_LENGTH`].
    pub(crate) fn from_remaining_length(remaining_length: usize) -> Result<Self, CodecError> {
        if remaining_length > MAX_REMAINING_LENGTH {
            return Err(CodecError::BadParameter);
        }
        let packet_size = 1 + remaining_length::encoded_size(remaining_length) + remaining_length;
        Ok(Self {
            remaining_length,
            packet_size,
        })
    }
}
