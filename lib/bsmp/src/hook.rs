//! The server-wide pre-read / post-write callout (§3, §4.7).

use crate::catalogue::variable::VarId;

/// Observes reads before they commit a response and writes after they
/// commit a mutation. The original C source ignores the hook's boolean
/// return value in practice; per §9's open question this rewrite keeps the
/// same contract — the hook is an observation point, not a veto, and its
/// return value is not consulted by the dispatcher (see DESIGN.md).
pub trait Hook {
    /// Called once before any read-producing handler commits its response,
    /// with the list of variables about to be read.
    fn pre_read(&mut self, variables: &[VarId]) -> bool {
        let _ = variables;
        true
    }

    /// Called once after any write/bin-op handler commits its mutation,
    /// with the list of variables that were written.
    fn post_write(&mut self, variables: &[VarId]) -> bool {
        let _ = variables;
        true
    }
}
