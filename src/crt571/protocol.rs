//! CRT-571 frame building and BCC calculation.

use tracing::debug;

use super::error::{Crt571Error, Result};
use super::types::{CMT, ETX, HEADER_SIZE, MAX_FRAME_LEN, REQUEST_FIXED, STX, TRAILER_SIZE};

/// Calculate the block check character (running XOR of every byte).
pub fn bcc(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Check `candidate` against the BCC of `data`.
pub fn verify_bcc(candidate: u8, data: &[u8]) -> bool {
    let computed = bcc(data);
    debug!("BCC check: data={data:02X?} bcc={candidate:#04X} computed={computed:#04X}");
    candidate == computed
}

/// Build a request frame.
///
/// Frame structure:
/// - STX (1) ADDR (1) LEN (2, BE)
/// - CMT (1) CM (1) PM (1) DATA (LEN - 3)
/// - ETX (1) BCC (1)
///
/// `LEN` counts CMT, CM, PM and the payload and may not exceed
/// [`MAX_FRAME_LEN`]. Fails with [`Crt571Error::FrameTooLarge`] rather than
/// truncating.
pub fn build_frame(address: u8, command: u8, parameter: u8, data: &[u8]) -> Result<Vec<u8>> {
    let counted = REQUEST_FIXED + data.len();
    if counted > MAX_FRAME_LEN {
        return Err(Crt571Error::FrameTooLarge {
            size: counted,
            max: MAX_FRAME_LEN,
        });
    }
    // Bounded by MAX_FRAME_LEN, so it always fits in 16 bits.
    let length = counted as u16;

    let mut frame = Vec::with_capacity(HEADER_SIZE + counted + TRAILER_SIZE);
    frame.push(STX);
    frame.push(address);
    frame.extend_from_slice(&length.to_be_bytes());
    frame.push(CMT);
    frame.push(command);
    frame.push(parameter);
    frame.extend_from_slice(data);
    frame.push(ETX);
    frame.push(bcc(&frame));

    Ok(frame)
}

/// Read the big-endian length field of any frame.
pub fn declared_length(frame: &[u8]) -> Result<usize> {
    match frame.get(2..HEADER_SIZE) {
        Some(&[hi, lo]) => Ok(usize::from(u16::from_be_bytes([hi, lo]))),
        _ => Err(Crt571Error::TruncatedFrame {
            expected: HEADER_SIZE,
            actual: frame.len(),
        }),
    }
}
