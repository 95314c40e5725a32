// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use crate::error::CodecError;
use crate::fixed_buffer::FixedBuffer;
use crate::packet_type::type_nibble;
use crate::qos::QoS;
use crate::remaining_length;
use crate::PacketSize;

const PROTOCOL_NAME: &[u8] = b"MQTT";
const PROTOCOL_LEVEL: u8 = 4;

/// The CONNECT packet's variable header plus payload is always at
/// least this many bytes before the client identifier: 2-byte protocol
/// name length + "MQTT" + protocol level + connect flags + keep alive.
const CONNECT_HEADER_SIZE: usize = 10;

/// Absolute ceiling on a serialized CONNECT packet, matching the MQTT
/// 3.1.1 four-byte Remaining Length field plus the 1-4 byte type/length
/// prefix actually observed in practice by broker implementations.
pub const MAX_CONNECT_PACKET_SIZE: usize = 327_700;

/// Will message carried by a CONNECT packet, published by the broker if
/// the client disconnects without sending DISCONNECT first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WillInfo<'a> {
    pub topic: &'a [u8],
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Everything a CONNECT packet needs, borrowed from the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectInfo<'a> {
    pub client_id: &'a [u8],
    pub clean_session: bool,
    pub keep_alive: u16,
    pub will: Option<WillInfo<'a>>,
    pub username: Option<&'a [u8]>,
    pub password: Option<&'a [u8]>,
}

impl<'a> ConnectInfo<'a> {
    fn validate(&self) -> Result<(), CodecError> {
        // The Password Flag MUST be set to 0 if the User Name Flag is set
        // to 0 [MQTT-3.1.2-22].
        if self.password.is_some() && self.username.is_none() {
            return Err(CodecError::BadParameter);
        }
        Ok(())
    }

    fn connect_flags(&self) -> u8 {
        let mut flags = 0u8;
        if self.clean_session {
            flags |= 0b0000_0010;
        }
        if let Some(will) = &self.will {
            flags |= 0b0000_0100;
            flags |= u8::from(will.qos) << 3;
            if will.retain {
                flags |= 0b0010_0000;
            }
        }
        if self.password.is_some() {
            flags |= 0b0100_0000;
        }
        if self.username.is_some() {
            flags |= 0b1000_0000;
        }
        flags
    }

    fn remaining_length(&self) -> Result<usize, CodecError> {
        let mut len = CONNECT_HEADER_SIZE
            .checked_add(2)
            .and_then(|n| n.checked_add(self.client_id.len()))
            .ok_or(CodecError::BadParameter)?;

        if let Some(will) = &self.will {
            len = len
                .checked_add(2 + will.topic.len())
                .and_then(|n| n.checked_add(2 + will.payload.len()))
                .ok_or(CodecError::BadParameter)?;
        }
        if let Some(username) = self.username {
            len = len
                .checked_add(2 + username.len())
                .ok_or(CodecError::BadParameter)?;
        }
        if let Some(password) = self.password {
            len = len
                .checked_add(2 + password.len())
                .ok_or(CodecError::BadParameter)?;
        }
        Ok(len)
    }
}

/// Compute the Remaining Length and total packet size of a CONNECT.
///
/// # Errors
///
/// Returns `CodecError::BadParameter` if the Password Flag would be set
/// without the User Name Flag, or if the resulting packet would exceed
/// [`MAX_CONNECT_PACKET_SIZE`].
pub fn size_connect(connect: &ConnectInfo) -> Result<PacketSize, CodecError> {
    connect.validate()?;
    let remaining_length = connect.remaining_length()?;
    let size = PacketSize::from_remaining_length(remaining_length)?;
    if size.packet_size > MAX_CONNECT_PACKET_SIZE {
        return Err(CodecError::BadParameter);
    }
    Ok(size)
}

/// Serialize a CONNECT packet.
///
/// # Errors
///
/// Same as [`size_connect`], plus `CodecError::NoMemory` if `buf` is
/// smaller than the packet's computed size.
pub fn serialize_connect(connect: &ConnectInfo, buf: &mut FixedBuffer) -> Result<usize, CodecError> {
    let size = size_connect(connect)?;

    buf.write_u8(type_nibble::CONNECT << 4)?;
    remaining_length::encode(size.remaining_length, buf)?;

    buf.write_length_prefixed(PROTOCOL_NAME)?;
    buf.write_u8(PROTOCOL_LEVEL)?;
    buf.write_u8(connect.connect_flags())?;
    buf.write_u16_be(connect.keep_alive)?;

    buf.write_length_prefixed(connect.client_id)?;
    if let Some(will) = &connect.will {
        buf.write_length_prefixed(will.topic)?;
        buf.write_length_prefixed(will.payload)?;
    }
    if let Some(username) = connect.username {
        buf.write_length_prefixed(username)?;
    }
    if let Some(password) = connect.password {
        buf.write_length_prefixed(password)?;
    }

    Ok(buf.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_connect_matches_spec_bytes() {
        let connect = ConnectInfo {
            client_id: b"test",
            clean_session: true,
            keep_alive: 60,
            will: None,
            username: None,
            password: None,
        };
        let size = size_connect(&connect).unwrap();
        assert_eq!(size.remaining_length, 16);
        assert_eq!(size.packet_size, 18);

        let mut raw = vec![0u8; size.packet_size];
        let mut buf = FixedBuffer::new(&mut raw);
        serialize_connect(&connect, &mut buf).unwrap();
        assert_eq!(
            buf.written(),
            &[
                0x10, 0x10, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x3C, 0x00,
                0x04, b't', b'e', b's', b't',
            ]
        );
    }

    #[test]
    fn will_flags_packed_into_connect_flags_byte() {
        let connect = ConnectInfo {
            client_id: b"c",
            clean_session: false,
            keep_alive: 0,
            will: Some(WillInfo {
                topic: b"lwt",
                payload: b"bye",
                qos: QoS::ExactlyOnce,
                retain: true,
            }),
            username: None,
            password: None,
        };
        let mut raw = vec![0u8; size_connect(&connect).unwrap().packet_size];
        let mut buf = FixedBuffer::new(&mut raw);
        serialize_connect(&connect, &mut buf).unwrap();
        // Connect flags byte: will(0b100) | will_qos=2(0b10000) | will_retain(0b100000) = 0x34
        assert_eq!(buf.written()[9], 0b0011_0100);
    }

    #[test]
    fn password_without_username_is_bad_parameter() {
        let connect = ConnectInfo {
            client_id: b"c",
            clean_session: true,
            keep_alive: 0,
            will: None,
            username: None,
            password: Some(b"secret"),
        };
        assert_eq!(size_connect(&connect), Err(CodecError::BadParameter));
    }

    #[test]
    fn oversize_connect_is_bad_parameter() {
        let payload = vec![0u8; MAX_CONNECT_PACKET_SIZE];
        let connect = ConnectInfo {
            client_id: b"c",
            clean_session: true,
            keep_alive: 0,
            will: Some(WillInfo {
                topic: b"t",
                payload: &payload,
                qos: QoS::AtMostOnce,
                retain: false,
            }),
            username: None,
            password: None,
        };
        assert_eq!(size_connect(&connect), Err(CodecError::BadParameter));
    }
}
