//! VAR_* handlers (§4.4).

use crate::binops::BinOp;
use crate::catalogue::variable::VarId;
use crate::server::dispatch::Outcome;
use crate::server::Server;
use crate::wire::Code;

pub(crate) fn query_list(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let variables = server.catalogue().variables();
    for (i, variable) in variables.iter().enumerate() {
        body[i] = variable.list_byte();
    }
    Outcome::reply(Code::VarList, variables.len())
}

pub(crate) fn read(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    let Some(&id_byte) = payload.first() else {
        return Outcome::err(Code::InvalidPayloadSize);
    };
    if payload.len() != 1 {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    let id = VarId(id_byte);
    let Some(variable) = server.catalogue().variable(id) else {
        return Outcome::err(Code::InvalidId);
    };
    let size = variable.size();

    if let Some(hook) = server.hook_mut() {
        hook.pre_read(&[id]);
    }

    let variable = server.catalogue().variable(id).expect("checked above");
    body[..size].copy_from_slice(variable.bytes());
    Outcome::reply(Code::VarValue, size)
}

pub(crate) fn write(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    let Some(&id_byte) = payload.first() else {
        return Outcome::err(Code::InvalidPayloadSize);
    };

    let id = VarId(id_byte);
    let Some(variable) = server.catalogue().variable(id) else {
        return Outcome::err(Code::InvalidId);
    };

    let size = variable.size();
    if payload.len() != 1 + size {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    if !variable.writable() {
        return Outcome::err(Code::ReadOnly);
    }

    let bytes = &payload[1..];
    if !variable.accepts(bytes) {
        return Outcome::err(Code::InvalidValue);
    }

    let variable = server
        .catalogue_mut()
        .variable_mut(id)
        .expect("checked above");
    variable.set_bytes(bytes);

    if let Some(hook) = server.hook_mut() {
        hook.post_write(&[id]);
    }

    Outcome::ok(0)
}

pub(crate) fn bin_op(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    if payload.len() < 2 {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    let id = VarId(payload[0]);
    let Some(variable) = server.catalogue().variable(id) else {
        return Outcome::err(Code::InvalidId);
    };

    let Some(op) = BinOp::from_byte(payload[1]) else {
        return Outcome::err(Code::OpNotSupported);
    };

    let size = variable.size();
    if payload.len() != 2 + size {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    if !variable.writable() {
        return Outcome::err(Code::ReadOnly);
    }
    let mask = &payload[2..];

    let variable = server
        .catalogue_mut()
        .variable_mut(id)
        .expect("checked above");
    op.apply(variable.bytes_mut(), mask);

    if let Some(hook) = server.hook_mut() {
        hook.post_write(&[id]);
    }

    Outcome::ok(0)
}

pub(crate) fn write_read(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() < 2 {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    let w_id = VarId(payload[0]);
    let r_id = VarId(payload[1]);

    let Some(w_var) = server.catalogue().variable(w_id) else {
        return Outcome::err(Code::InvalidId);
    };
    if server.catalogue().variable(r_id).is_none() {
        return Outcome::err(Code::InvalidId);
    }
    if !w_var.writable() {
        return Outcome::err(Code::ReadOnly);
    }

    let w_size = w_var.size();
    if payload.len() != 2 + w_size {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let bytes = &payload[2..];
    if !w_var.accepts(bytes) {
        return Outcome::err(Code::InvalidValue);
    }

    server
        .catalogue_mut()
        .variable_mut(w_id)
        .expect("checked above")
        .set_bytes(bytes);

    if let Some(hook) = server.hook_mut() {
        hook.post_write(&[w_id]);
    }
    if let Some(hook) = server.hook_mut() {
        hook.pre_read(&[r_id]);
    }

    let r_var = server.catalogue().variable(r_id).expect("checked above");
    let r_size = r_var.size();
    body[..r_size].copy_from_slice(r_var.bytes());
    Outcome::reply(Code::VarValue, r_size)
}
