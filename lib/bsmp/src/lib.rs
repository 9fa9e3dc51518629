//! Request/response control-and-telemetry protocol engine for embedded
//! instruments: a byte-accurate wire codec, a server-side catalogue and
//! dispatcher, and a client-side discovery session.

pub mod binops;
pub mod catalogue;
pub mod client;
pub mod codec;
pub mod error;
pub mod hook;
pub mod server;
pub mod wire;

pub use error::{Error, Result};
pub use server::{Server, Version};
