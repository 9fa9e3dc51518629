//! Server- and registration-time error taxonomy. Grounded on
//! `flux::shared::NetworkError`/`ErrorType` (hand-rolled enum, `From` impls
//! at the transport boundary, no `thiserror`) and on the `sllp_err` taxonomy
//! of the original C source.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by registration and other embedder-facing, non-wire calls.
/// Wire-level rejections (malformed message, unknown id, ...) are reported
/// as ordinary [`crate::wire::Code`] responses, not as this enum — see §7.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A parameter was missing, out of range for its kind, or the target
    /// entity does not accept the requested mutation (read-only).
    ParamInvalid(&'static str),
    /// A parameter was syntactically fine but outside the acceptable range
    /// for its kind (variable size, function arity, curve block count).
    ParamOutOfRange(&'static str),
    /// The per-kind registration limit was reached.
    OutOfMemory,
    /// The same handle/pointer was already registered.
    Duplicate,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParamInvalid(what) => write!(f, "invalid parameter: {what}"),
            Error::ParamOutOfRange(what) => write!(f, "parameter out of range: {what}"),
            Error::OutOfMemory => write!(f, "registration limit reached"),
            Error::Duplicate => write!(f, "entry already registered"),
        }
    }
}

impl std::error::Error for Error {}
