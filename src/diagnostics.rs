//! Unified error type for the vyaka engine.
//!
//! Only programmer errors are represented here. A grammar that fails to match
//! its input is not an error: that outcome is [`crate::runtime::Outcome::Failed`],
//! carried silently because ordered choice discards failed alternatives as a
//! matter of routine. The two classes that *do* surface as errors are:
//!
//! - **Construction errors**: a functor was assembled with an invalid shape
//!   (empty sequence, empty capture tag, parameter that cannot satisfy a hook
//!   schema). These fire before or during grammar assembly, never because of
//!   the input text.
//! - **Dispatch errors**: a name bound late — rule, hook, reader, or capture
//!   tag — resolved to nothing at evaluation time.

use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of an error, for callers that branch on the class
/// rather than the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The grammar itself is malformed; no input was consulted.
    Construction,
    /// A late-bound name failed to resolve during evaluation.
    Dispatch,
}

/// Unified error type for all vyaka failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum VyakaError {
    #[error("malformed grammar: {message}")]
    #[diagnostic(code(vyaka::grammar::malformed))]
    MalformedGrammar { message: String },

    #[error("no rule named `{name}` is registered")]
    #[diagnostic(
        code(vyaka::runtime::unknown_rule),
        help("rules resolve by name at evaluation time; register `{name}` with `Parser::set_rule` before evaluation reaches it")
    )]
    UnknownRule { name: String },

    #[error("no hook named `{name}` is registered")]
    #[diagnostic(code(vyaka::runtime::unknown_hook))]
    UnknownHook { name: String },

    #[error("no reader named `{name}` is registered")]
    #[diagnostic(code(vyaka::runtime::unknown_reader))]
    UnknownReader { name: String },

    #[error("no capture tagged `{tag}` is live in the innermost frame")]
    #[diagnostic(
        code(vyaka::runtime::unknown_capture),
        help("a capture is visible only while its frame is open or after it published into the enclosing frame")
    )]
    UnknownCapture { tag: String },
}

impl VyakaError {
    /// Builds a construction error with a formatted message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedGrammar {
            message: message.into(),
        }
    }

    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule { name: name.into() }
    }

    pub fn unknown_hook(name: impl Into<String>) -> Self {
        Self::UnknownHook { name: name.into() }
    }

    pub fn unknown_reader(name: impl Into<String>) -> Self {
        Self::UnknownReader { name: name.into() }
    }

    pub fn unknown_capture(tag: impl Into<String>) -> Self {
        Self::UnknownCapture { tag: tag.into() }
    }

    /// Returns the coarse classification for this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            VyakaError::MalformedGrammar { .. } => ErrorClass::Construction,
            VyakaError::UnknownRule { .. }
            | VyakaError::UnknownHook { .. }
            | VyakaError::UnknownReader { .. }
            | VyakaError::UnknownCapture { .. } => ErrorClass::Dispatch,
        }
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    #[test]
    fn construction_errors_classify_as_construction() {
        let err = VyakaError::malformed("a sequence needs at least one child");
        assert_eq!(err.class(), ErrorClass::Construction);
        assert!(err.to_string().contains("malformed grammar"));
    }

    #[test]
    fn dispatch_errors_classify_as_dispatch() {
        for err in [
            VyakaError::unknown_rule("expr"),
            VyakaError::unknown_hook("check"),
            VyakaError::unknown_reader("vowel"),
            VyakaError::unknown_capture("n"),
        ] {
            assert_eq!(err.class(), ErrorClass::Dispatch);
        }
    }

    #[test]
    fn messages_name_the_missing_binding() {
        let err = VyakaError::unknown_rule("statement");
        assert!(err.to_string().contains("`statement`"));
    }
}
