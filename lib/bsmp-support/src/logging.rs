pub use slog::{debug, info, o, warn, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

/// Builds the default terminal logger used by the demo embedder and CLI tool
/// when no logger is supplied by the caller.
pub fn default_logger(level: Severity) -> Logger {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);
    builder.build().expect("failed to build terminal logger")
}

/// A logger that discards everything, used where the embedder did not
/// install one.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}
