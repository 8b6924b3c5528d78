//! Wire framing for messages on a byte stream.
//!
//! ```text
//! +------------------+-------------------+
//! | Length (4B BE)   | Payload (bincode) |
//! +------------------+-------------------+
//! ```
//!
//! The header matches the defaults of tokio-util's `LengthDelimitedCodec`, so the
//! blocking and async socket transports speak the same protocol.

use std::io::{Read, Write};

use crate::error::{ProtocolViolation, TransportError};
use crate::message::Message;

pub const HEADER_LEN: usize = 4;

/// Largest payload accepted from a peer.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

pub fn encode(message: &Message) -> Result<Vec<u8>, ProtocolViolation> {
    bincode::serialize(message).map_err(ProtocolViolation::Encode)
}

pub fn decode(payload: &[u8]) -> Result<Message, ProtocolViolation> {
    bincode::deserialize(payload).map_err(ProtocolViolation::Decode)
}

/// Encodes `message` with its length header, ready to be written in one go.
pub fn encode_frame(message: &Message) -> Result<Vec<u8>, ProtocolViolation> {
    let payload = encode(message)?;
    check_len(payload.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Writes one frame and flushes it.
pub fn write_frame<W: Write>(writer: &mut W, message: &Message) -> Result<(), TransportError> {
    let frame = encode_frame(message)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Blocks until a whole frame has been read.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Message, TransportError> {
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(TransportError::from_read)?;
    let len = u32::from_be_bytes(header) as usize;
    check_len(len)?;

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .map_err(TransportError::from_read)?;
    Ok(decode(&payload)?)
}

fn check_len(len: usize) -> Result<(), ProtocolViolation> {
    if len > MAX_FRAME_LEN {
        return Err(ProtocolViolation::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    Ok(())
}
