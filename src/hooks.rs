//! # Vyaka Hook System
//!
//! Hooks are the semantic actions of a grammar: externally supplied callables
//! invoked mid-match with a parameter list fixed at grammar-construction
//! time. The engine imposes no contract on what a hook does beyond the
//! parameter protocol below; its outcome becomes the hook functor's outcome.
//!
//! ## Parameter protocol
//!
//! A hook is registered with a declared schema (an ordered list of
//! [`ParamKind`]s). The grammar side supplies [`HookParam`]s: either a
//! literal [`Value`] or a tag name. The tagged union makes a literal of the
//! wrong shape unrepresentable; arity and kind are checked against the
//! declared schema when the hook is dispatched, because hooks — like rules —
//! bind by name at evaluation time.
//!
//! ## Capture references
//!
//! A `Tag` parameter declared as [`ParamKind::Node`] is resolved to a
//! [`CaptureRef`]: an index into the parser's capture-frame stack, never a
//! second owner of the node. The hook reads or mutates the capture through
//! [`crate::runtime::Parser::capture`] / `capture_mut`, which re-validate the
//! index on every access; holding a reference past its frame's lifetime
//! therefore surfaces as an `UnknownCapture` error rather than undefined
//! behavior.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::value::Value;
use crate::diagnostics::VyakaError;
use crate::runtime::{Outcome, Parser};

// ============================================================================
// PARAMETER TYPES
// ============================================================================

/// Declared kind of one hook parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Int,
    Str,
    Bool,
    /// A by-reference view of the capture currently stored under a tag in
    /// the innermost frame.
    Node,
}

impl ParamKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Str => "str",
            ParamKind::Bool => "bool",
            ParamKind::Node => "node",
        }
    }
}

/// Grammar-side hook parameter: a literal value or a capture-tag name.
#[derive(Debug, Clone, PartialEq)]
pub enum HookParam {
    Literal(Value),
    Tag(String),
}

impl HookParam {
    pub fn literal(value: impl Into<Value>) -> Self {
        HookParam::Literal(value.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        HookParam::Tag(name.into())
    }

    /// The kind a literal parameter satisfies; `None` for tags and for
    /// `Value::Nil`, which satisfies no schema slot.
    pub fn literal_kind(&self) -> Option<ParamKind> {
        match self {
            HookParam::Literal(Value::Int(_)) => Some(ParamKind::Int),
            HookParam::Literal(Value::Str(_)) => Some(ParamKind::Str),
            HookParam::Literal(Value::Bool(_)) => Some(ParamKind::Bool),
            HookParam::Literal(Value::Nil) | HookParam::Tag(_) => None,
        }
    }
}

/// Indexed, non-owning reference to a captured node: a frame index into the
/// parser's capture-frame stack plus the tag name within that frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRef {
    pub(crate) frame: usize,
    pub(crate) tag: String,
}

impl CaptureRef {
    /// The tag this reference resolves within its frame.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Runtime argument as delivered to a hook callable.
#[derive(Debug, Clone, PartialEq)]
pub enum HookArg {
    /// A literal, passed by value.
    Value(Value),
    /// A capture reference, resolved against the parser on demand.
    Node(CaptureRef),
}

impl HookArg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            HookArg::Value(v) => Some(v),
            HookArg::Node(_) => None,
        }
    }

    pub fn as_capture(&self) -> Option<&CaptureRef> {
        match self {
            HookArg::Node(r) => Some(r),
            HookArg::Value(_) => None,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// The callable behind a registered hook.
pub type HookFn = dyn Fn(&mut Parser, &[HookArg]) -> Result<Outcome, VyakaError>;

/// One registered hook: its declared schema plus the callable.
#[derive(Clone)]
pub struct HookEntry {
    pub schema: Arc<[ParamKind]>,
    pub func: Arc<HookFn>,
}

/// Registry of named hooks, inspectable at runtime. Immutable once grammar
/// setup is done.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<String, HookEntry>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, schema: Vec<ParamKind>, func: F)
    where
        F: Fn(&mut Parser, &[HookArg]) -> Result<Outcome, VyakaError> + 'static,
    {
        self.hooks.insert(
            name.to_string(),
            HookEntry {
                schema: schema.into(),
                func: Arc::new(func),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&HookEntry> {
        self.hooks.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn list(&self) -> Vec<String> {
        self.hooks.keys().cloned().collect()
    }
}
