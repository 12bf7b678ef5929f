//! CRT-571 reply decoding.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{Crt571Error, Result};
use super::protocol::declared_length;
use super::tables::{error_message, st0_name, st1_name, st2_name};
use super::types::{EMT, EMT_ALT, ETX, HEADER_SIZE, MAX_FRAME_LEN, NEGATIVE_FIXED, PMT, POSITIVE_FIXED, TRAILER_SIZE};

/// Offset of the reply type discriminator.
const TYPE_OFFSET: usize = HEADER_SIZE;

/// Card status bytes (ST0, ST1, ST2) of a positive reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardStatus {
    pub st0: u8,
    pub st1: u8,
    pub st2: u8,
}

impl CardStatus {
    /// Card position.
    pub fn card(&self) -> &'static str {
        st0_name(self.st0).unwrap_or_default()
    }

    /// Stacker fill level.
    pub fn stacker(&self) -> &'static str {
        st1_name(self.st1).unwrap_or_default()
    }

    /// Error card bin fill level.
    pub fn error_bin(&self) -> &'static str {
        st2_name(self.st2).unwrap_or_default()
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "['{}','{}','{}']", self.card(), self.stacker(), self.error_bin())
    }
}

/// Positive reply, borrowing its payload from the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveFrame<'a> {
    pub command: u8,
    pub parameter: u8,
    pub status: CardStatus,
    pub data: &'a [u8],
}

/// Negative reply, borrowing its payload from the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeFrame<'a> {
    pub command: u8,
    pub parameter: u8,
    pub code: [u8; 2],
    pub data: &'a [u8],
}

impl NegativeFrame<'_> {
    /// Error code as its two ASCII characters.
    pub fn code_str(&self) -> String {
        String::from_utf8_lossy(&self.code).into_owned()
    }

    /// Message for the error code; empty when the code is not known.
    pub fn message(&self) -> &'static str {
        error_message(&self.code_str()).unwrap_or_default()
    }
}

/// Parsed view over a raw reply buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    Positive(PositiveFrame<'a>),
    Negative(NegativeFrame<'a>),
}

impl Frame<'_> {
    /// Convert into an owned reply, turning a negative frame into
    /// [`Crt571Error::Device`].
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Frame::Positive(p) => Ok(Reply {
                command: p.command,
                parameter: p.parameter,
                status: p.status,
                data: p.data.to_vec(),
            }),
            Frame::Negative(n) => Err(Crt571Error::Device {
                code: n.code_str(),
                message: n.message().to_string(),
                data: n.data.to_vec(),
            }),
        }
    }
}

/// Owned positive reply handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub command: u8,
    pub parameter: u8,
    pub status: CardStatus,
    pub data: Vec<u8>,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRT-571 positive response: card status:{}, data:[{}]",
            self.status,
            String::from_utf8_lossy(&self.data)
        )
    }
}

/// Decode a raw reply buffer (STX through BCC).
///
/// Positive: `STX ADDR LEN(2) PMT CM PM ST0 ST1 ST2 DATA(LEN-6) ETX BCC`.
/// Negative: `STX ADDR LEN(2) EMT CM E1 E0 PM DATA(LEN-5) ETX BCC`.
///
/// All slicing is bounds-checked against the declared length.
pub fn decode_response(raw: &[u8]) -> Result<Frame<'_>> {
    let Some(&kind) = raw.get(TYPE_OFFSET) else {
        return Err(Crt571Error::TruncatedFrame {
            expected: TYPE_OFFSET + 1,
            actual: raw.len(),
        });
    };
    let length = declared_length(raw)?;

    let fixed = match kind {
        PMT => POSITIVE_FIXED,
        EMT | EMT_ALT => NEGATIVE_FIXED,
        other => {
            warn!("Unknown response type {other:#04X}: {raw:02X?}");
            return Err(Crt571Error::UnknownResponseType(other));
        }
    };

    if length > MAX_FRAME_LEN {
        return Err(Crt571Error::FrameTooLarge {
            size: length,
            max: MAX_FRAME_LEN,
        });
    }
    if length < fixed {
        return Err(Crt571Error::BadLength { length, minimum: fixed });
    }
    let frame_len = HEADER_SIZE + length + TRAILER_SIZE;
    if raw.len() < frame_len {
        return Err(Crt571Error::TruncatedFrame {
            expected: frame_len,
            actual: raw.len(),
        });
    }
    let body = &raw[TYPE_OFFSET..HEADER_SIZE + length];
    if raw[HEADER_SIZE + length] != ETX {
        warn!("Missing ETX at offset {}: {raw:02X?}", HEADER_SIZE + length);
    }

    let frame = if kind == PMT {
        let status = CardStatus {
            st0: body[3],
            st1: body[4],
            st2: body[5],
        };
        let frame = PositiveFrame {
            command: body[1],
            parameter: body[2],
            status,
            data: &body[POSITIVE_FIXED..],
        };
        debug!(
            "Positive response: status={:02X?} ({}) data={:02X?}",
            [status.st0, status.st1, status.st2],
            status,
            frame.data
        );
        Frame::Positive(frame)
    } else {
        let frame = NegativeFrame {
            command: body[1],
            code: [body[2], body[3]],
            parameter: body[4],
            data: &body[NEGATIVE_FIXED..],
        };
        debug!(
            "Negative response: code={} ({}) data={:02X?}",
            frame.code_str(),
            frame.message(),
            frame.data
        );
        Frame::Negative(frame)
    };

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crt571::protocol::bcc;

    /// Assemble a reply frame around `body` (discriminator through payload).
    fn reply(body: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xF2, 0x00];
        frame.extend_from_slice(&(body.len() as u16).to_be_bytes());
        frame.extend_from_slice(body);
        frame.push(ETX);
        frame.push(bcc(&frame));
        frame
    }

    #[test]
    fn test_positive_reply() {
        let raw = reply(&[PMT, 0x31, 0x30, 0x32, 0x32, 0x30]);
        let Frame::Positive(frame) = decode_response(&raw).unwrap() else {
            panic!("expected positive frame");
        };
        assert_eq!(frame.command, 0x31);
        assert_eq!(frame.parameter, 0x30);
        assert!(frame.data.is_empty());
        assert_eq!(frame.status.card(), "One Card on RF/IC Card Position");
        assert_eq!(frame.status.stacker(), "Enough Cards in card box");
        assert_eq!(frame.status.error_bin(), "Error card bin not full");
    }

    #[test]
    fn test_positive_reply_with_data() {
        let raw = reply(&[PMT, 0xA4, 0x30, 0x30, 0x31, 0x30, b'V', b'1', b'.', b'0']);
        let reply = decode_response(&raw).unwrap().into_result().unwrap();
        assert_eq!(reply.data, b"V1.0");
        assert_eq!(reply.status.stacker(), "Few Card in stacker");
        assert_eq!(
            reply.to_string(),
            "CRT-571 positive response: card status:['No Card in CRT-571','Few Card in stacker','Error card bin not full'], data:[V1.0]"
        );
    }

    #[test]
    fn test_negative_reply() {
        let raw = reply(&[EMT, 0x32, b'1', b'0', 0x31]);
        let Frame::Negative(frame) = decode_response(&raw).unwrap() else {
            panic!("expected negative frame");
        };
        assert_eq!(frame.code_str(), "10");
        assert_eq!(frame.message(), "Card Jam");
        assert_eq!(frame.command, 0x32);
        assert_eq!(frame.parameter, 0x31);

        let err = Frame::Negative(frame).into_result().unwrap_err();
        assert_eq!(err.device_code(), Some("10"));
        assert!(matches!(err, Crt571Error::Device { ref message, .. } if message == "Card Jam"));
    }

    #[test]
    fn test_alternate_negative_marker() {
        let raw = reply(&[EMT_ALT, 0x30, b'B', b'0', 0x30, 0xDE, 0xAD]);
        let err = decode_response(&raw).unwrap().into_result().unwrap_err();
        match err {
            Crt571Error::Device { code, message, data } => {
                assert_eq!(code, "B0");
                assert_eq!(message, "Not Reset");
                assert_eq!(data, vec![0xDE, 0xAD]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_device_error_display() {
        let raw = reply(&[EMT, 0x30, b'B', b'0', 0x30, 0xDE, 0xAD]);
        let err = decode_response(&raw).unwrap().into_result().unwrap_err();
        assert_eq!(err.to_string(), "CRT-571 error response: Not Reset(B0), data:[DE, AD]");
    }

    #[test]
    fn test_missing_etx_still_decodes() {
        let mut raw = reply(&[PMT, 0x31, 0x30, 0x32, 0x32, 0x30]);
        let etx = raw.len() - 2;
        raw[etx] = 0x00;
        let reply = decode_response(&raw).unwrap().into_result().unwrap();
        assert_eq!(reply.command, 0x31);
        assert_eq!(reply.status.st0, 0x32);
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut raw = reply(&[PMT, 0xA4, 0x30, 0x30, 0x31, 0x30, b'V', b'1']);
        raw.extend_from_slice(&[0x06, 0xFF, 0xFF]);
        let reply = decode_response(&raw).unwrap().into_result().unwrap();
        assert_eq!(reply.data, b"V1");
    }

    #[test]
    fn test_unknown_error_code_has_empty_message() {
        let raw = reply(&[EMT, 0x30, b'9', b'9', 0x30]);
        let err = decode_response(&raw).unwrap().into_result().unwrap_err();
        assert!(matches!(err, Crt571Error::Device { ref code, ref message, .. } if code == "99" && message.is_empty()));
    }

    #[test]
    fn test_unknown_discriminator() {
        for len in 5..16 {
            let mut raw = vec![0u8; len];
            raw[4] = 0x43;
            assert!(
                matches!(decode_response(&raw), Err(Crt571Error::UnknownResponseType(0x43))),
                "len={len}"
            );
        }
    }

    #[test]
    fn test_truncated_buffers_never_panic() {
        let positive = reply(&[PMT, 0x31, 0x30, 0x32, 0x32, 0x30, 0x01, 0x02]);
        for len in 0..positive.len() {
            let err = decode_response(&positive[..len]).unwrap_err();
            assert!(matches!(err, Crt571Error::TruncatedFrame { .. }), "len={len}: {err}");
        }

        let negative = reply(&[EMT, 0x32, b'1', b'0', 0x31, 0x01]);
        for len in 0..negative.len() {
            let err = decode_response(&negative[..len]).unwrap_err();
            assert!(matches!(err, Crt571Error::TruncatedFrame { .. }), "len={len}: {err}");
        }
    }

    #[test]
    fn test_length_below_shape_minimum() {
        let mut raw = reply(&[PMT, 0x31, 0x30, 0x32, 0x32, 0x30]);
        raw[3] = 0x02;
        assert!(matches!(
            decode_response(&raw),
            Err(Crt571Error::BadLength { length: 2, minimum: 6 })
        ));
    }

    #[test]
    fn test_oversized_length_field() {
        let mut raw = reply(&[PMT, 0x31, 0x30, 0x32, 0x32, 0x30]);
        raw[2] = 0x04;
        raw[3] = 0x01;
        assert!(matches!(
            decode_response(&raw),
            Err(Crt571Error::FrameTooLarge { size: 1025, max: 1024 })
        ));
    }

    #[test]
    fn test_length_field_of_request_frame() {
        let request = crate::crt571::protocol::build_frame(0x00, 0x31, 0x30, &[1, 2, 3]).unwrap();
        assert_eq!(declared_length(&request).unwrap(), 6);
        assert!(matches!(decode_response(&request), Err(Crt571Error::UnknownResponseType(0x43))));
    }
}
