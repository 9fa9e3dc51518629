//! The server half of the protocol: catalogue ownership, registration, and
//! the single dispatch entry point (§4.2, §4.3, §6).

mod dispatch;
mod handlers;

use crate::catalogue::curve::Curve;
use crate::catalogue::function::Function;
use crate::catalogue::variable::Variable;
use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::hook::Hook;
use crate::wire::MAX_MESSAGE;
use bsmp_support::logging::{self, Logger};

pub use dispatch::DispatchError;

/// {major, minor, revision} plus a printable string, reported by
/// `QUERY_VERSION` and discovered once by the client at connect (§3).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    pub text: String,
}

impl Default for Version {
    fn default() -> Version {
        Version {
            major: 1,
            minor: 0,
            revision: 0,
            text: "1.0.0".into(),
        }
    }
}

/// Owns the catalogue for the server's lifetime. Single-threaded by
/// contract (§5): one [`Server::process_packet`] call runs to completion
/// before the next begins.
pub struct Server {
    catalogue: Catalogue,
    version: Version,
    hook: Option<Box<dyn Hook>>,
    log: Logger,
}

impl Server {
    /// Allocate a new server and initialize the three standard groups.
    pub fn new() -> Server {
        Server {
            catalogue: Catalogue::new(),
            version: Version::default(),
            hook: None,
            log: logging::discard(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Server {
        self.version = version;
        self
    }

    pub fn with_logger(mut self, log: Logger) -> Server {
        self.log = log;
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn register_variable(&mut self, variable: Variable) -> Result<()> {
        self.catalogue.register_variable(variable)?;
        Ok(())
    }

    pub fn register_curve(&mut self, curve: Curve) -> Result<()> {
        self.catalogue.register_curve(curve)?;
        Ok(())
    }

    pub fn register_function(&mut self, function: Function) -> Result<()> {
        self.catalogue.register_function(function)?;
        Ok(())
    }

    /// Install, replace or clear the server-wide hook.
    pub fn register_hook(&mut self, hook: Option<Box<dyn Hook>>) {
        self.hook = hook;
    }

    /// The single dispatch entry point (§4.3, §6). `response` must be at
    /// least [`crate::wire::MAX_MESSAGE`] bytes; decodes `request`, routes
    /// by command code, runs the matching handler, and writes the reply
    /// frame into `response`. Returns the number of bytes written.
    pub fn process_packet(&mut self, request: &[u8], response: &mut [u8]) -> std::result::Result<usize, DispatchError> {
        if response.len() < MAX_MESSAGE {
            return Err(DispatchError::ResponseBufferTooSmall);
        }
        Ok(dispatch::dispatch(self, request, response))
    }

    pub(crate) fn catalogue_mut(&mut self) -> &mut Catalogue {
        &mut self.catalogue
    }

    pub(crate) fn hook_mut(&mut self) -> Option<&mut Box<dyn Hook>> {
        self.hook.as_mut()
    }

    pub(crate) fn version(&self) -> &Version {
        &self.version
    }

    pub(crate) fn log(&self) -> &Logger {
        &self.log
    }
}

impl Default for Server {
    fn default() -> Server {
        Server::new()
    }
}
