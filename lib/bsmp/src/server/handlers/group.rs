//! GROUP_* handlers (§4.4).

use crate::binops::BinOp;
use crate::catalogue::group::GroupId;
use crate::catalogue::variable::VarId;
use crate::catalogue::GroupCreateError;
use crate::server::dispatch::Outcome;
use crate::server::Server;
use crate::wire::Code;

pub(crate) fn query_list(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let groups = server.catalogue().groups();
    for (i, group) in groups.iter().enumerate() {
        body[i] = group.list_byte();
    }
    Outcome::reply(Code::GroupList, groups.len())
}

pub(crate) fn query(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() != 1 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let Some(group) = server.catalogue().group(GroupId(payload[0])) else {
        return Outcome::err(Code::InvalidId);
    };

    for (i, member) in group.members().iter().enumerate() {
        body[i] = member.0;
    }
    Outcome::reply(Code::Group, group.members().len())
}

pub(crate) fn read(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if payload.len() != 1 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let Some(group) = server.catalogue().group(GroupId(payload[0])) else {
        return Outcome::err(Code::InvalidId);
    };
    let members = group.members().to_vec();

    if let Some(hook) = server.hook_mut() {
        hook.pre_read(&members);
    }

    let catalogue = server.catalogue();
    let mut offset = 0;
    for &id in &members {
        let variable = catalogue.variable(id).expect("group member must exist");
        let size = variable.size();
        body[offset..offset + size].copy_from_slice(variable.bytes());
        offset += size;
    }
    Outcome::reply(Code::GroupValues, offset)
}

pub(crate) fn write(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    if payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let Some(group) = server.catalogue().group(GroupId(payload[0])) else {
        return Outcome::err(Code::InvalidId);
    };
    if payload.len() != 1 + group.size() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    if !group.writable() {
        return Outcome::err(Code::ReadOnly);
    }

    let members = group.members().to_vec();
    let mut any_rejected = false;
    let mut offset = 1;

    for &id in &members {
        let variable = server.catalogue().variable(id).expect("group member must exist");
        let size = variable.size();
        let slice = &payload[offset..offset + size];

        if variable.accepts(slice) {
            server
                .catalogue_mut()
                .variable_mut(id)
                .expect("group member must exist")
                .set_bytes(slice);
        } else {
            any_rejected = true;
        }
        offset += size;
    }

    if let Some(hook) = server.hook_mut() {
        hook.post_write(&members);
    }

    if any_rejected {
        Outcome::err(Code::InvalidValue)
    } else {
        Outcome::ok(0)
    }
}

pub(crate) fn bin_op(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    if payload.len() < 2 {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let Some(group) = server.catalogue().group(GroupId(payload[0])) else {
        return Outcome::err(Code::InvalidId);
    };
    let Some(op) = BinOp::from_byte(payload[1]) else {
        return Outcome::err(Code::OpNotSupported);
    };
    if payload.len() != 2 + group.size() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    if !group.writable() {
        return Outcome::err(Code::ReadOnly);
    }

    let members = group.members().to_vec();
    let mut offset = 2;
    for &id in &members {
        let size = server
            .catalogue()
            .variable(id)
            .expect("group member must exist")
            .size();
        let mask = &payload[offset..offset + size];
        op.apply(
            server
                .catalogue_mut()
                .variable_mut(id)
                .expect("group member must exist")
                .bytes_mut(),
            mask,
        );
        offset += size;
    }

    if let Some(hook) = server.hook_mut() {
        hook.post_write(&members);
    }
    Outcome::ok(0)
}

pub(crate) fn create(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    let ids: Vec<VarId> = payload.iter().map(|&b| VarId(b)).collect();
    match server.catalogue_mut().create_group(&ids) {
        Ok(_) => Outcome::ok(0),
        Err(GroupCreateError::InvalidPayloadSize) => Outcome::err(Code::InvalidPayloadSize),
        Err(GroupCreateError::OutOfMemory) => Outcome::err(Code::InsufficientMemory),
        Err(GroupCreateError::InvalidId) => Outcome::err(Code::InvalidId),
    }
}

pub(crate) fn remove_all(server: &mut Server, payload: &[u8], _body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    server.catalogue_mut().remove_all_groups();
    Outcome::ok(0)
}
