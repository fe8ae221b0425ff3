//! The single internal diagnostic shape raised by the IR checker.
//!
//! Unlike a source-language compiler, this pipeline has no user-facing
//! error catalogue: every diagnostic here indicates a bug in an earlier
//! pass, not a mistake in the program being compiled. A diagnostic simply
//! names the phase that produced the bad IR, the offending node's source
//! position, and a human-readable message.

use crate::span::Span;
use std::fmt;

/// "Ill-typed intermediate code after `<phase>`: `<position>`: IR type error: `<text>`".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the pass that produced the IR being checked (e.g. `"tailcall"`, `"await"`).
    pub phase: &'static str,
    /// Source position of the offending node.
    pub at: Span,
    /// Human-readable description of the violated invariant.
    pub message: String,
}

impl Diagnostic {
    pub fn new(phase: &'static str, at: Span, message: impl Into<String>) -> Self {
        Self {
            phase,
            at,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ill-typed intermediate code after {}: {}: IR type error: {}",
            self.phase, self.at, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_reference_message() {
        let d = Diagnostic::new("tailcall", Span::new(4, 9), "expected mutable assignment target");
        assert_eq!(
            d.to_string(),
            "Ill-typed intermediate code after tailcall: 4..9: IR type error: expected mutable assignment target"
        );
    }
}
