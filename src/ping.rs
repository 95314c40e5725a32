// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use crate::error::CodecError;
use crate::fixed_buffer::FixedBuffer;
use crate::incoming::IncomingPacket;
use crate::packet_type::type_nibble;

/// Serialize a PINGREQ packet: fixed header only, Remaining Length 0.
///
/// # Errors
///
/// Returns `CodecError::NoMemory` if `buf` is smaller than 2 bytes.
pub fn serialize_pingreq(buf: &mut FixedBuffer) -> Result<usize, CodecError> {
    buf.write_u8(type_nibble::PINGREQ << 4)?;
    buf.write_u8(0)?;
    Ok(buf.len())
}

/// Validate a PINGRESP packet. PINGRESP carries no variable header or
/// payload; the only thing to check is that the Remaining Length is 0.
///
/// # Errors
///
/// Returns `CodecError::BadResponse` if `packet` is not a PINGRESP with
/// Remaining Length 0.
pub fn deserialize_pingresp(packet: &IncomingPacket) -> Result<(), CodecError> {
    if packet.type_nibble() != type_nibble::PINGRESP || packet.remaining_length != 0 {
        return Err(CodecError::BadResponse);
    }
    Ok(())
}
