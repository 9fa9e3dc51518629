//! Byte-accurate frame codec: `command code (1) + length (2, big-endian) +
//! payload (length bytes)`. Grounded on `net/frame.rs` and `net/buffer.rs`
//! (byteorder-driven header (de)serialization over a `Cursor`).

use crate::wire::{Code, HEADER_SIZE, MAX_PAYLOAD};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};

/// A decoded request frame borrowing its payload from the caller's buffer.
#[derive(Debug, Eq, PartialEq)]
pub struct Request<'a> {
    pub code: u8,
    pub payload: &'a [u8],
}

/// Reasons a raw buffer fails to decode as a well-formed frame. Both variants
/// map onto [`Code::Malformed`] at the dispatch layer (§4.3 step 1).
#[derive(Debug, Eq, PartialEq)]
pub enum DecodeError {
    TooShort,
    LengthMismatch { declared: usize, supplied: usize },
}

/// Split a raw buffer into its header fields and payload slice. Does not
/// look up the command code; that is the dispatcher's job (unknown codes are
/// `OP_NOT_SUPPORTED`, not a decode failure).
pub fn decode_request(buffer: &[u8]) -> Result<Request<'_>, DecodeError> {
    if buffer.len() < HEADER_SIZE {
        return Err(DecodeError::TooShort);
    }

    let mut cursor = Cursor::new(buffer);
    let code = cursor.read_u8().expect("length checked above");
    let declared = cursor.read_u16::<BigEndian>().expect("length checked above") as usize;

    let supplied = buffer.len() - HEADER_SIZE;
    if declared != supplied {
        return Err(DecodeError::LengthMismatch { declared, supplied });
    }

    Ok(Request {
        code,
        payload: &buffer[HEADER_SIZE..],
    })
}

/// Errors writing a response into the caller's output buffer.
#[derive(Debug, Eq, PartialEq)]
pub enum EncodeError {
    PayloadTooLarge,
    BufferTooSmall,
}

/// Encode `code` and `payload` into `out`, returning the number of bytes
/// written (`HEADER_SIZE + payload.len()`).
pub fn encode_response(out: &mut [u8], code: Code, payload: &[u8]) -> Result<usize, EncodeError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(EncodeError::PayloadTooLarge);
    }
    let total = HEADER_SIZE + payload.len();
    if out.len() < total {
        return Err(EncodeError::BufferTooSmall);
    }

    let mut cursor = Cursor::new(&mut out[..total]);
    cursor.write_u8(code.into()).expect("length checked above");
    cursor
        .write_u16::<BigEndian>(payload.len() as u16)
        .expect("length checked above");
    cursor.write_all(payload).expect("length checked above");

    Ok(total)
}

/// Encode a request frame. The wire shape is identical in both directions;
/// only which side is encoding differs, so this forwards to
/// [`encode_response`].
pub fn encode_request(out: &mut [u8], code: Code, payload: &[u8]) -> Result<usize, EncodeError> {
    encode_response(out, code, payload)
}
