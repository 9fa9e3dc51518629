//! CURVE_* handlers (§4.5). The block-offset boundary follows the
//! corrected contract (§9 redesign flag): `offset >= nblocks` is rejected,
//! not just `offset > nblocks`.

use crate::catalogue::curve::CurveId;
use crate::server::dispatch::Outcome;
use crate::server::Server;
use crate::wire::{Code, CURVE_CSUM_SIZE, CURVE_LIST_RECORD_SIZE};

pub(crate) fn query_list(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let curves = server.catalogue().curves();
    let mut offset = 0;
    for curve in curves {
        body[offset..offset + CURVE_LIST_RECORD_SIZE].copy_from_slice(&curve.list_record());
        offset += CURVE_LIST_RECORD_SIZE;
    }
    Outcome::reply(Code::CurveList, offset)
}

pub(crate) fn query_checksum(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() != 1 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let Some(curve) = server.catalogue().curve(CurveId(payload[0])) else {
        return Outcome::err(Code::InvalidId);
    };
    body[..CURVE_CSUM_SIZE].copy_from_slice(&curve.checksum());
    Outcome::reply(Code::CurveCsum, CURVE_CSUM_SIZE)
}

pub(crate) fn block_request(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() != 3 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let id_byte = payload[0];
    let offset = u16::from_be_bytes([payload[1], payload[2]]) as u32;

    let Some(curve) = server.catalogue().curve(CurveId(id_byte)) else {
        return Outcome::err(Code::InvalidId);
    };
    if offset >= curve.nblocks() {
        return Outcome::err(Code::InvalidValue);
    }

    let block_size = curve.block_size();
    body[0] = id_byte;
    body[1..3].copy_from_slice(&(offset as u16).to_be_bytes());
    let n = curve.read_block(offset, &mut body[3..3 + block_size]);
    Outcome::reply(Code::CurveBlock, 3 + n)
}

pub(crate) fn block_write(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    if payload.len() < 3 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let id_byte = payload[0];
    let offset = u16::from_be_bytes([payload[1], payload[2]]) as u32;

    let Some(curve) = server.catalogue().curve(CurveId(id_byte)) else {
        return Outcome::err(Code::InvalidId);
    };
    if !curve.writable() {
        return Outcome::err(Code::ReadOnly);
    }
    if offset >= curve.nblocks() {
        return Outcome::err(Code::InvalidValue);
    }

    let bytes = &payload[3..];
    if bytes.len() > curve.block_size() {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    server
        .catalogue_mut()
        .curve_mut(CurveId(id_byte))
        .expect("checked above")
        .write_block(offset, bytes);

    Outcome::ok(0)
}

pub(crate) fn recalc_checksum(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() != 1 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let id = CurveId(payload[0]);
    let Some(curve) = server.catalogue_mut().curve_mut(id) else {
        return Outcome::err(Code::InvalidId);
    };
    let digest = curve.recalc_checksum();
    body[..CURVE_CSUM_SIZE].copy_from_slice(&digest);
    Outcome::reply(Code::CurveCsum, CURVE_CSUM_SIZE)
}
