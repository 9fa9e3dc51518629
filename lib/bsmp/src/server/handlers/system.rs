//! QUERY_VERSION (§4.3). Grounded on `client.c`'s `get_version`: the
//! success reply reuses the request's own code; only `OP_NOT_SUPPORTED`
//! is treated specially by callers.

use crate::server::dispatch::Outcome;
use crate::server::Server;
use crate::wire::Code;

pub(crate) fn query_version(server: &mut Server, payload: &[u8], body: &mut [u8]) -> Outcome {
    if !payload.is_empty() {
        return Outcome::err(Code::InvalidPayloadSize);
    }
    let version = server.version();
    body[0] = version.major;
    body[1] = version.minor;
    body[2] = version.revision;
    Outcome::reply(Code::QueryVersion, 3)
}
