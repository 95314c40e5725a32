// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use crate::error::CodecError;
use crate::incoming::IncomingPacket;
use crate::packet_type::type_nibble;
use crate::qos::QoS;

/// One reason code in a SUBACK payload: either the granted QoS for the
/// matching SUBSCRIBE topic filter, or a rejection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscribeReasonCode {
    GrantedQoS(QoS),
    Failure,
}

impl TryFrom<u8> for SubscribeReasonCode {
    type Error = CodecError;

    /// # Errors
    ///
    /// Returns `CodecError::BadResponse` for any byte other than
    /// `0x00`, `0x01`, `0x02` (granted QoS) or `0x80` (failure).
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x80 => Ok(Self::Failure),
            _ => QoS::try_from(value).map(Self::GrantedQoS),
        }
    }
}

/// Parsed SUBACK packet. `reason_codes` aliases the input buffer and
/// holds one raw byte per topic filter in the SUBSCRIBE it acknowledges,
/// in the same order; parse each with
/// `SubscribeReasonCode::try_from`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubAck<'a> {
    pub packet_id: u16,
    pub reason_codes: &'a [u8],
}

/// Parse a SUBACK packet.
///
/// # Errors
///
/// Returns `CodecError::BadResponse` if the packet is not a SUBACK, if
/// its Remaining Length is less than 3 (packet id plus at least one
/// reason code), or if any reason code byte is not one of `0x00`,
/// `0x01`, `0x02` or `0x80` — parsing stops at the first such byte.
pub fn deserialize_suback<'a>(packet: &IncomingPacket<'a>) -> Result<SubAck<'a>, CodecError> {
    if packet.type_nibble() != type_nibble::SUBACK || packet.remaining_length < 3 {
        return Err(CodecError::BadResponse);
    }
    let packet_id = u16::from_be_bytes([packet.data[0], packet.data[1]]);
    let reason_codes = &packet.data[2..];
    for &code in reason_codes {
        SubscribeReasonCode::try_from(code)?;
    }
    Ok(SubAck {
        packet_id,
        reason_codes,
    })
}
