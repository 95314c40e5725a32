// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use crate::error::CodecError;
use crate::incoming::IncomingPacket;
use crate::packet_type::type_nibble;

/// Reply code carried by the second byte of a CONNACK variable header.
/// Any value other than `Accepted` means the broker closed the
/// connection without accepting it.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConnectReturnCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUsernameOrPassword = 4,
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = CodecError;

    /// # Errors
    ///
    /// Returns `CodecError::BadResponse` for any value above 5: MQTT
    /// 3.1.1 only defines return codes 0 through 5.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Accepted),
            1 => Ok(Self::UnacceptableProtocolVersion),
            2 => Ok(Self::IdentifierRejected),
            3 => Ok(Self::ServerUnavailable),
            4 => Ok(Self::BadUsernameOrPassword),
            5 => Ok(Self::NotAuthorized),
            _ => Err(CodecError::BadResponse),
        }
    }
}

/// Parsed CONNACK variable header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnAck {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

/// Parse a CONNACK packet.
///
/// # Errors
///
/// Returns `CodecError::BadResponse` if the packet is not a CONNACK
/// with Remaining Length 2, if any of the seven reserved high bits of
/// the first variable-header byte are set, if the Session Present bit
/// is set together with a nonzero return code, or if the return code
/// is out of the 0-5 range. Returns `CodecError::ServerRefused` if the
/// return code is valid but nonzero.
pub fn deserialize_connack(packet: &IncomingPacket) -> Result<ConnAck, CodecError> {
    if packet.type_nibble() != type_nibble::CONNACK || packet.remaining_length != 2 {
        return Err(CodecError::BadResponse);
    }
    let ack_flags = packet.data[0];
    let return_code_byte = packet.data[1];

    if ack_flags & 0b1111_1110 != 0 {
        log::error!("connack: reserved bits in ack flags set: {ack_flags:#04x}");
        return Err(CodecError::BadResponse);
    }
    let session_present = ack_flags & 0b0000_0001 != 0;

    // MQTT 3.1.1 requires the fourth CONNACK byte to be 0 when Session
    // Present is set.
    if session_present && return_code_byte != 0 {
        return Err(CodecError::BadResponse);
    }

    let return_code = ConnectReturnCode::try_from(return_code_byte)?;
    if return_code != ConnectReturnCode::Accepted {
        return Err(CodecError::ServerRefused);
    }

    Ok(ConnAck {
        session_present,
        return_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_session_not_present() {
        let data = [0x00, 0x00];
        let packet = IncomingPacket::new(0x20, &data);
        let ack = deserialize_connack(&packet).unwrap();
        assert!(!ack.session_present);
        assert_eq!(ack.return_code, ConnectReturnCode::Accepted);
    }

    #[test]
    fn accepted_session_present() {
        let data = [0x01, 0x00];
        let packet = IncomingPacket::new(0x20, &data);
        let ack = deserialize_connack(&packet).unwrap();
        assert!(ack.session_present);
    }

    #[test]
    fn nonzero_return_code_is_server_refused() {
        let data = [0x00, 0x05];
        let packet = IncomingPacket::new(0x20, &data);
        assert_eq!(deserialize_connack(&packet), Err(CodecError::ServerRefused));
    }

    #[test]
    fn out_of_range_return_code_is_bad_response() {
        let data = [0x00, 0x06];
        let packet = IncomingPacket::new(0x20, &data);
        assert_eq!(deserialize_connack(&packet), Err(CodecError::BadResponse));
    }

    #[test]
    fn reserved_ack_flag_bits_set_is_bad_response() {
        let data = [0x02, 0x00];
        let packet = IncomingPacket::new(0x20, &data);
        assert_eq!(deserialize_connack(&packet), Err(CodecError::BadResponse));
    }

    #[test]
    fn session_present_with_nonzero_return_code_is_bad_response() {
        let data = [0x01, 0x01];
        let packet = IncomingPacket::new(0x20, &data);
        assert_eq!(deserialize_connack(&packet), Err(CodecError::BadResponse));
    }

    #[test]
    fn wrong_remaining_length_is_bad_response() {
        let data = [0x00, 0x00, 0x00];
        let packet = IncomingPacket::new(0x20, &data);
        assert_eq!(deserialize_connack(&packet), Err(CodecError::BadResponse));
    }
}
