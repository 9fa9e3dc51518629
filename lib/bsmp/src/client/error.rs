//! Client-facing error taxonomy (§7). `Uninitialized` and `UnknownDescriptor`
//! have no counterpart in the original `sllp_err`/`bsmp_err` enums — they are
//! engineering additions made explicit by typed handles (see DESIGN.md).

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A descriptor wasn't from this session, or an argument was malformed.
    ParamInvalid(&'static str),
    /// A locally-checked size or count fell outside the allowed range.
    ParamOutOfRange(&'static str),
    /// Transport send/recv failed, the response was truncated, or its code
    /// didn't match the expected success code for the request.
    Comm,
    /// A typed operation was attempted before `init` completed discovery.
    Uninitialized,
    /// A descriptor's id has no live entry in the cached list it claims to
    /// belong to (stale cache after a discovery refresh).
    UnknownDescriptor,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParamInvalid(what) => write!(f, "invalid parameter: {what}"),
            Error::ParamOutOfRange(what) => write!(f, "parameter out of range: {what}"),
            Error::Comm => write!(f, "transport or protocol error"),
            Error::Uninitialized => write!(f, "session not initialized"),
            Error::UnknownDescriptor => write!(f, "descriptor not from this session"),
        }
    }
}

impl std::error::Error for Error {}
