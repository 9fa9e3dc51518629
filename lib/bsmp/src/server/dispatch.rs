//! Frame decode, command-code routing, response assembly (§4.3 algorithm).

use super::handlers;
use super::Server;
use crate::codec::{self, DecodeError};
use crate::wire::{Code, HEADER_SIZE};
use bsmp_support::logging::debug;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DispatchError {
    /// The embedder's response buffer is smaller than `MAX_MESSAGE`.
    ResponseBufferTooSmall,
}

/// The result of a single handler invocation: the response code to send
/// and how many payload bytes the handler wrote into `response[HEADER_SIZE..]`.
pub(crate) struct Outcome {
    pub code: Code,
    pub payload_len: usize,
}

impl Outcome {
    pub(crate) fn ok(payload_len: usize) -> Outcome {
        Outcome {
            code: Code::Ok,
            payload_len,
        }
    }

    pub(crate) fn err(code: Code) -> Outcome {
        Outcome {
            code,
            payload_len: 0,
        }
    }

    pub(crate) fn reply(code: Code, payload_len: usize) -> Outcome {
        Outcome { code, payload_len }
    }
}

/// Steps 1-2 of §4.3: decode the header and route by code; step 3 onward
/// (payload size/id/permission validation) happens inside each handler.
pub(crate) fn dispatch(server: &mut Server, request: &[u8], response: &mut [u8]) -> usize {
    let decoded = match codec::decode_request(request) {
        Ok(decoded) => decoded,
        Err(DecodeError::TooShort) | Err(DecodeError::LengthMismatch { .. }) => {
            return finish(response, Outcome::err(Code::Malformed));
        }
    };

    let outcome = route(server, decoded.code, decoded.payload, response);

    debug!(server.log(), "dispatched command"; "code" => decoded.code, "response" => u8::from(outcome.code));

    finish(response, outcome)
}

fn route(server: &mut Server, code: u8, payload: &[u8], response: &mut [u8]) -> Outcome {
    let body = &mut response[HEADER_SIZE..];

    match code {
        0x00 => handlers::system::query_version(server, payload, body),
        0x02 => handlers::variable::query_list(server, payload, body),
        0x04 => handlers::group::query_list(server, payload, body),
        0x06 => handlers::group::query(server, payload, body),
        0x08 => handlers::curve::query_list(server, payload, body),
        0x0A => handlers::curve::query_checksum(server, payload, body),
        0x0C => handlers::function::query_list(server, payload, body),
        0x10 => handlers::variable::read(server, payload, body),
        0x12 => handlers::group::read(server, payload, body),
        0x20 => handlers::variable::write(server, payload, body),
        0x22 => handlers::group::write(server, payload, body),
        0x24 => handlers::variable::bin_op(server, payload, body),
        0x26 => handlers::group::bin_op(server, payload, body),
        0x28 => handlers::variable::write_read(server, payload, body),
        0x30 => handlers::group::create(server, payload, body),
        0x32 => handlers::group::remove_all(server, payload, body),
        0x40 => handlers::curve::block_request(server, payload, body),
        0x41 => handlers::curve::block_write(server, payload, body),
        0x42 => handlers::curve::recalc_checksum(server, payload, body),
        0x50 => handlers::function::execute(server, payload, body),
        _ => Outcome::err(Code::OpNotSupported),
    }
}

/// Write the 3-byte header for a handler that has already placed its
/// payload bytes at `response[HEADER_SIZE..]` and return the frame length.
fn finish(response: &mut [u8], outcome: Outcome) -> usize {
    response[0] = outcome.code.into();
    let len = outcome.payload_len as u16;
    response[1] = (len >> 8) as u8;
    response[2] = (len & 0xFF) as u8;
    HEADER_SIZE + outcome.payload_len
}
