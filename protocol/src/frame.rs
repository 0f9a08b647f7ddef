//! Wire framing of requests and responses.
//!
//! A request frame looks like this:
//!
//! ```text
//! 02 FD D0 E0 00 00 <len> 7E <command> 3B <checksum>
//! ```
//!
//! Responses use one of the headers described by [`ResponseHeader`],
//! followed by a length byte, the payload `~<data>;\r\n` and a checksum.

use alloc::vec::Vec;
use core::{
    fmt::{Display, Formatter},
    str,
};
use strum::FromRepr;

/// Maximum length of a request command.
///
/// The length byte can encode 255 bytes, minus the `~` and `;` envelope.
pub const MAX_CMD_LENGTH: usize = 253;

/// Header of every request frame.
pub const REQUEST_HEADER: [u8; 6] = [0x02, 0xfd, 0xd0, 0xe0, 0x00, 0x00];

/// Length of a response header.
pub const RESPONSE_HEADER_LEN: usize = 6;

/// Common prefix of all known response headers.
const RESPONSE_HEADER_PREFIX: [u8; 4] = [0x02, 0xfd, 0xe0, 0xd0];

/// A byte sequence had an invalid length for the requested operation.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct LengthError {
    /// Actual length of the byte sequence or command.
    pub len: usize,
    /// Violated limit (minimum or maximum, depending on the operation).
    pub limit: usize,
}

impl Display for LengthError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "invalid length {} (limit {})", self.len, self.limit)
    }
}

impl core::error::Error for LengthError {}

/// Computes the checksum of a byte sequence.
///
/// Each byte is folded into the accumulator twice: once as is
/// and once shifted left by one bit.
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0x00, |acc, &b| acc ^ b ^ (b << 1))
}

/// Appends the checksum to a byte sequence.
///
/// # Errors
///
/// - [`LengthError`] if `data` is empty.
pub fn add_checksum(data: &[u8]) -> Result<Vec<u8>, LengthError> {
    if data.is_empty() {
        return Err(LengthError { len: 0, limit: 1 });
    }

    let mut out = Vec::with_capacity(data.len() + 1);

    out.extend_from_slice(data);
    out.push(checksum(data));

    Ok(out)
}

/// Checks whether the last byte of `data` is the checksum of the preceding bytes.
///
/// # Errors
///
/// - [`LengthError`] if `data` is shorter than 2 bytes.
pub fn verify(data: &[u8]) -> Result<bool, LengthError> {
    match data.split_last() {
        Some((&last, rest)) if !rest.is_empty() => Ok(checksum(rest) == last),
        _ => Err(LengthError {
            len: data.len(),
            limit: 2,
        }),
    }
}

/// Builds a complete request frame for the given command.
///
/// # Errors
///
/// - [`LengthError`] if the command is longer than [`MAX_CMD_LENGTH`].
pub fn build_request(cmd: &str) -> Result<Vec<u8>, LengthError> {
    if cmd.len() > MAX_CMD_LENGTH {
        return Err(LengthError {
            len: cmd.len(),
            limit: MAX_CMD_LENGTH,
        });
    }

    let mut frame = Vec::with_capacity(REQUEST_HEADER.len() + cmd.len() + 4);

    frame.extend_from_slice(&REQUEST_HEADER);
    // Fits into a byte due to the length check above
    frame.push((cmd.len() + 2) as u8);
    frame.push(b'~');
    frame.extend_from_slice(cmd.as_bytes());
    frame.push(b';');

    add_checksum(&frame)
}

/// Extracts the data of a response payload.
///
/// The payload must have the form `~<data>;\r\n`, where `data` is
/// ASCII text without semicolons.
#[must_use]
pub fn extract_data(payload: &[u8]) -> Option<&str> {
    let text = str::from_utf8(payload).ok().filter(|text| text.is_ascii())?;
    let data = text.strip_prefix('~')?.strip_suffix(";\r\n")?;

    (!data.contains(';')).then_some(data)
}

/// Known response headers.
///
/// The device is inconsistent in how it reports the payload length and
/// whether it computes a checksum at all, depending on the header it
/// replies with. Each variant carries the corresponding correction rules.
///
/// All headers start with `02 FD E0 D0` and end with `00`.
/// The variant discriminant is the remaining byte.
#[derive(FromRepr, PartialEq, Eq, Copy, Clone, Debug)]
#[repr(u8)]
pub enum ResponseHeader {
    /// Regular response.
    Standard = 0x00,
    /// Some fast query answers, declared length is one byte too long.
    LengthExcessOne = 0x01,
    /// Error messages and some fast query answers,
    /// declared length is two bytes too long.
    LengthExcessTwo = 0x02,
    /// Parameter answers (observed on HP08S10W-WEB, SW 3.0.20), checksum is always zero.
    ZeroChecksum = 0x04,
    /// Parameter answers (observed on HP10S12W-WEB, SW 3.0.8), checksum is always zero.
    ZeroChecksumAlt = 0x08,
}

impl ResponseHeader {
    /// Looks up the header matching the given bytes.
    ///
    /// Returns [`None`] for unknown headers.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; RESPONSE_HEADER_LEN]) -> Option<Self> {
        if bytes[..4] != RESPONSE_HEADER_PREFIX || bytes[5] != 0x00 {
            return None;
        }

        Self::from_repr(bytes[4])
    }

    /// Returns the raw header bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; RESPONSE_HEADER_LEN] {
        [0x02, 0xfd, 0xe0, 0xd0, self as u8, 0x00]
    }

    /// Corrects the payload length for the checksum computation.
    #[must_use]
    pub const fn correct_length(self, len: u8) -> u8 {
        match self {
            Self::Standard | Self::ZeroChecksum | Self::ZeroChecksumAlt => len,
            Self::LengthExcessOne => len.wrapping_sub(1),
            Self::LengthExcessTwo => len.wrapping_sub(2),
        }
    }

    /// Computes the expected checksum of a response with this header.
    ///
    /// `len` must already be corrected using [`ResponseHeader::correct_length`].
    #[must_use]
    pub fn checksum(self, len: u8, payload: &[u8]) -> u8 {
        match self {
            Self::Standard | Self::LengthExcessOne | Self::LengthExcessTwo => {
                let header = self.to_bytes();

                checksum(&header) ^ checksum(&[len]) ^ checksum(payload)
            }
            Self::ZeroChecksum | Self::ZeroChecksumAlt => 0x00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_known_values() {
        assert_eq!(checksum(&[]), 0x00, "empty checksum should be zero");
        assert_eq!(checksum(&[0x01]), 0x03, "checksum should be correct");
        assert_eq!(checksum(&[0x80]), 0x80, "shifted bit should be dropped");
        assert_eq!(
            checksum(&[0x01, 0x02]),
            0x03 ^ 0x06,
            "checksum should be correct"
        );
    }

    #[test]
    fn add_checksum_and_verify() {
        for data in [&b"A"[..], b"~LIN;", &[0x00, 0xff, 0x7f], &[0x02; 255]] {
            let framed = add_checksum(data).unwrap();

            assert_eq!(
                framed.last(),
                Some(&checksum(data)),
                "last byte should be the checksum"
            );
            assert_eq!(verify(&framed), Ok(true), "checksum should verify");
        }
    }

    #[test]
    fn verify_detects_corruption() {
        let mut framed = add_checksum(b"~OK;\r\n").unwrap();

        framed[2] ^= 0x10;

        assert_eq!(verify(&framed), Ok(false), "corruption should be detected");
    }

    #[test]
    fn length_errors() {
        assert_eq!(
            add_checksum(&[]),
            Err(LengthError { len: 0, limit: 1 }),
            "empty input should be rejected"
        );
        assert_eq!(
            verify(&[0x00]),
            Err(LengthError { len: 1, limit: 2 }),
            "single byte should be rejected"
        );
        assert!(verify(&[]).is_err(), "empty input should be rejected");
    }

    #[test]
    fn build_empty_request() {
        assert_eq!(
            build_request("").unwrap(),
            [0x02, 0xfd, 0xd0, 0xe0, 0x00, 0x00, 0x02, 0x7e, 0x3b, 0x98],
            "request should be correct"
        );
    }

    #[test]
    fn build_login_request() {
        assert_eq!(
            build_request("LIN").unwrap(),
            [
                0x02, 0xfd, 0xd0, 0xe0, 0x00, 0x00, 0x05, 0x7e, 0x4c, 0x49, 0x4e, 0x3b, 0x4c
            ],
            "request should be correct"
        );
    }

    #[test]
    fn build_param_request() {
        assert_eq!(
            build_request("SP,NR=69").unwrap(),
            [
                0x02, 0xfd, 0xd0, 0xe0, 0x00, 0x00, 0x0a, 0x7e, 0x53, 0x50, 0x2c, 0x4e, 0x52,
                0x3d, 0x36, 0x39, 0x3b, 0x83
            ],
            "request should be correct"
        );
    }

    #[test]
    fn build_request_length_limit() {
        let max = "X".repeat(MAX_CMD_LENGTH);
        let frame = build_request(&max).unwrap();

        assert_eq!(frame[6], 0xff, "length byte should be saturated");
        assert_eq!(frame.len(), 6 + 1 + 255 + 1, "frame length should be correct");
        assert_eq!(
            build_request(&"X".repeat(MAX_CMD_LENGTH + 1)),
            Err(LengthError {
                len: MAX_CMD_LENGTH + 1,
                limit: MAX_CMD_LENGTH
            }),
            "too long command should be rejected"
        );
    }

    #[test]
    fn extract_payload_data() {
        assert_eq!(extract_data(b"~OK;\r\n"), Some("OK"));
        assert_eq!(extract_data(b"~;\r\n"), Some(""));
        assert_eq!(
            extract_data(b"~MA,0,-3.4,17;\r\n"),
            Some("MA,0,-3.4,17")
        );
        assert_eq!(extract_data(b"OK;\r\n"), None, "missing tilde");
        assert_eq!(extract_data(b"~OK;\n"), None, "missing carriage return");
        assert_eq!(extract_data(b"~O;K;\r\n"), None, "embedded semicolon");
        assert_eq!(extract_data(b"~\xc3\xa4;\r\n"), None, "non-ASCII data");
    }

    #[test]
    fn response_header_lookup() {
        for (byte, header) in [
            (0x00, ResponseHeader::Standard),
            (0x01, ResponseHeader::LengthExcessOne),
            (0x02, ResponseHeader::LengthExcessTwo),
            (0x04, ResponseHeader::ZeroChecksum),
            (0x08, ResponseHeader::ZeroChecksumAlt),
        ] {
            let bytes = [0x02, 0xfd, 0xe0, 0xd0, byte, 0x00];

            assert_eq!(
                ResponseHeader::from_bytes(&bytes),
                Some(header),
                "header should be known"
            );
            assert_eq!(header.to_bytes(), bytes, "header bytes should match");
        }

        for bytes in [
            [0x02, 0xfd, 0xe0, 0xd0, 0x03, 0x00],
            [0x02, 0xfd, 0xe0, 0xd0, 0x00, 0x01],
            [0x02, 0xfd, 0xd0, 0xe0, 0x00, 0x00],
        ] {
            assert_eq!(
                ResponseHeader::from_bytes(&bytes),
                None,
                "header should be unknown"
            );
        }
    }

    #[test]
    fn response_header_policies() {
        let payload = b"~OK;\r\n";

        assert_eq!(ResponseHeader::Standard.correct_length(6), 6);
        assert_eq!(ResponseHeader::LengthExcessOne.correct_length(6), 5);
        assert_eq!(ResponseHeader::LengthExcessTwo.correct_length(6), 4);
        assert_eq!(ResponseHeader::ZeroChecksum.correct_length(6), 6);
        assert_eq!(
            ResponseHeader::Standard.checksum(6, payload),
            0x91,
            "checksum should match the full frame checksum"
        );
        assert_eq!(ResponseHeader::ZeroChecksum.checksum(6, payload), 0x00);
        assert_eq!(ResponseHeader::ZeroChecksumAlt.checksum(6, b"~xyz;\r\n"), 0x00);
    }
}
