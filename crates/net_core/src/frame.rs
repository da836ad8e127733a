//! Simple versioned length framing for wire messages.
//!
//! Format (little-endian):
//! - u8 `FRAME_VERSION` (1)
//! - u32 LEN (bytes of payload)
//! - [u8; LEN] payload
//!
//! This allows multiplexed streams to delimit messages without peeking into
//! inner payloads. Inner payloads may themselves be versioned.

use crate::codec::CodecError;

const FRAME_VERSION: u8 = 1;
const MAX_FRAME_LEN: usize = 65_536; // ability messages are small; cap hard

/// Write a framed message into `out`, appending to any existing bytes.
pub fn write_msg(out: &mut Vec<u8>, payload: &[u8]) {
    out.push(FRAME_VERSION);
    let len = u32::try_from(payload.len()).unwrap_or(0);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
}

/// Read a single framed message from `inp`. Returns the payload slice on success.
///
/// The returned slice borrows from `inp` and is valid as long as `inp` is.
pub fn read_msg(inp: &[u8]) -> Result<&[u8], CodecError> {
    if inp.len() < 5 {
        return Err(CodecError::ShortFrame);
    }
    let ver = inp[0];
    if ver != FRAME_VERSION {
        return Err(CodecError::BadVersion(ver));
    }
    let mut lenb = [0u8; 4];
    lenb.copy_from_slice(&inp[1..5]);
    let len = u32::from_le_bytes(lenb) as usize;
    if len > MAX_FRAME_LEN {
        return Err(CodecError::Oversize(len));
    }
    if inp.len() < 5 + len {
        return Err(CodecError::ShortFrame);
    }
    Ok(&inp[5..5 + len])
}
