//! JSON codec over the versioned framing.

use crate::frame;
use crate::message::{ClientMsg, ServerMsg};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("short frame")]
    ShortFrame,
    #[error("unsupported frame version: {0}")]
    BadVersion(u8),
    #[error("frame too large: {0}")]
    Oversize(usize),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode one client message as a single framed JSON payload.
#[must_use]
pub fn encode_client(msg: &ClientMsg) -> Vec<u8> {
    let payload = serde_json::to_vec(msg).unwrap_or_default();
    let mut out = Vec::with_capacity(payload.len() + 5);
    frame::write_msg(&mut out, &payload);
    out
}

pub fn decode_client(bytes: &[u8]) -> Result<ClientMsg, CodecError> {
    let payload = frame::read_msg(bytes)?;
    Ok(serde_json::from_slice(payload)?)
}

#[must_use]
pub fn encode_server(msg: &ServerMsg) -> Vec<u8> {
    let payload = serde_json::to_vec(msg).unwrap_or_default();
    let mut out = Vec::with_capacity(payload.len() + 5);
    frame::write_msg(&mut out, &payload);
    out
}

pub fn decode_server(bytes: &[u8]) -> Result<ServerMsg, CodecError> {
    let payload = frame::read_msg(bytes)?;
    Ok(serde_json::from_slice(payload)?)
}
