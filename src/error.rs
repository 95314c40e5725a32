// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use std::fmt;

/// Disjoint failure tags for every public operation in this crate.
///
/// There is no hierarchy: a caller either gets a fully-formed value back
/// or one of these tags, never both. Which tag applies to which failure
/// is documented on each function that can return it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CodecError {
    /// A caller-supplied argument violates a precondition: an empty
    /// filter/subscription list, a zero packet identifier where one is
    /// required, a payload too large for the 256MB packet ceiling, or a
    /// packet whose computed size exceeds a protocol-specific limit.
    BadParameter,

    /// The caller-supplied buffer is smaller than the packet size
    /// computed by the matching sizing function.
    NoMemory,

    /// Received bytes violate MQTT 3.1.1 framing or semantic rules:
    /// reserved bits set, a non-minimal or over-long Remaining Length
    /// encoding, a length mismatch between the fixed header and the
    /// packet body, both PUBLISH QoS bits set, a zero packet identifier,
    /// or an invalid CONNACK/SUBACK return code.
    BadResponse,

    /// The packet was well-formed but the broker refused it: a CONNACK
    /// return code in 1..=5, or a SUBACK containing at least one 0x80
    /// entry.
    ServerRefused,

    /// The framer's reader callback returned fewer bytes than requested
    /// (including zero) while reading the fixed header's packet-type
    /// byte.
    NoDataAvailable,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::BadParameter => "bad parameter",
            Self::NoMemory => "buffer too small",
            Self::BadResponse => "malformed or inconsistent packet",
            Self::ServerRefused => "server refused request",
            Self::NoDataAvailable => "no data available from reader",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CodecError {}
