//! The client half of the protocol: a transport-backed session that
//! discovers a server's catalogue and issues typed commands against it
//! (§4.8).

mod descriptor;
mod error;
mod session;
mod transport;

pub use descriptor::{CurveDescriptor, FunctionDescriptor, GroupDescriptor, VariableDescriptor};
pub use error::{Error, Result};
pub use session::{FuncOutcome, Session};
pub use transport::Transport;
