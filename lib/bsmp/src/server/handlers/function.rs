//! FUNC_* handlers (§4.6).

use crate::catalogue::function::FuncId;
use crate::server::dispatch::Outcome;
use crate::server::Server;
use crate::wire::Code;

pub(crate) fn query_list(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let functions = server.catalogue().functions();
    for (i, function) in functions.iter().enumerate() {
        body[i] = function.list_byte();
    }
    Outcome::reply(Code::FuncList, functions.len())
}

pub(crate) fn execute(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    let Some(&id_byte) = payload.first() else {
        return Outcome::err(Code::InvalidPayloadSize);
    };
    let id = FuncId(id_byte);

    let Some(function) = server.catalogue_mut().function_mut(id) else {
        return Outcome::err(Code::InvalidId);
    };
    let input_size = function.input_size();
    let output_size = function.output_size();

    if payload.len() != 1 + input_size {
        return Outcome::err(Code::InvalidPayloadSize);
    }

    let input = &payload[1..];
    let mut output = vec![0u8; output_size];
    let rc = function.call(input, &mut output);

    if rc == 0 {
        body[..output_size].copy_from_slice(&output);
        Outcome::reply(Code::FuncReturn, output_size)
    } else {
        body[0] = rc;
        Outcome::reply(Code::FuncError, 1)
    }
}
