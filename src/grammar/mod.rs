//! The combinator tree.
//!
//! A grammar is an immutable, acyclic composition of [`ParseTree`] values,
//! built once and shared read-only across evaluations. Each variant answers
//! one question — "does the input at the current cursor match?" — and the
//! recursive evaluator in [`crate::runtime::eval`] gives each its semantics.
//!
//! Recursion between rules never appears in the tree itself: a
//! [`ParseTree::Rule`] node holds only a name, resolved against the parser's
//! rule table at evaluation time, which is what lets rules reference each
//! other (or themselves) regardless of registration order.

use crate::ast::value::Value;
use crate::diagnostics::VyakaError;
use crate::hooks::HookParam;
use crate::readers;

// ============================================================================
// FUNCTOR VARIANTS
// ============================================================================

/// One node of a grammar tree.
///
/// Built through the constructors below; the fallible ones enforce the
/// construction-time error class (a malformed shape is rejected before any
/// input is parsed).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    /// Matches children in order. No rollback on failure.
    Sequence(Vec<ParseTree>),
    /// First-match-wins alternation with transactional backtracking.
    Choice(Vec<ParseTree>),
    /// Greedy repetition, zero or more occurrences. Always matches.
    ZeroOrMore(Box<ParseTree>),
    /// Greedy repetition, at least one occurrence.
    OneOrMore(Box<ParseTree>),
    /// Zero or one occurrence. Always matches.
    Optional(Box<ParseTree>),
    /// Delimited body: `begin`, then `body`, then `end`. Yields the body's
    /// result.
    Bracket {
        begin: Box<ParseTree>,
        body: Box<ParseTree>,
        end: Box<ParseTree>,
    },
    /// Named sub-match: publishes the body's result into the enclosing
    /// capture frame under `tag`.
    Capture { tag: String, body: Box<ParseTree> },
    /// Indirect call through the parser's rule table.
    Rule(String),
    /// Invocation of a registered hook with parameters fixed at
    /// grammar-construction time.
    Hook {
        name: String,
        params: Vec<HookParam>,
    },
    /// Invocation of a registered token reader with bound literal parameters.
    Read { reader: String, params: Vec<Value> },
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl ParseTree {
    /// Builds a sequence. An empty child list is a construction error.
    pub fn sequence(children: Vec<ParseTree>) -> Result<Self, VyakaError> {
        if children.is_empty() {
            return Err(VyakaError::malformed(
                "a sequence needs at least one child",
            ));
        }
        Ok(ParseTree::Sequence(children))
    }

    /// Builds an ordered choice. An empty alternative list is legal and
    /// never matches.
    pub fn choice(alternatives: Vec<ParseTree>) -> Self {
        ParseTree::Choice(alternatives)
    }

    pub fn zero_or_more(body: ParseTree) -> Self {
        ParseTree::ZeroOrMore(Box::new(body))
    }

    pub fn one_or_more(body: ParseTree) -> Self {
        ParseTree::OneOrMore(Box::new(body))
    }

    pub fn optional(body: ParseTree) -> Self {
        ParseTree::Optional(Box::new(body))
    }

    pub fn bracket(begin: ParseTree, body: ParseTree, end: ParseTree) -> Self {
        ParseTree::Bracket {
            begin: Box::new(begin),
            body: Box::new(body),
            end: Box::new(end),
        }
    }

    /// Builds a named capture. An empty tag name is a construction error.
    pub fn capture(tag: impl Into<String>, body: ParseTree) -> Result<Self, VyakaError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(VyakaError::malformed("a capture needs a non-empty tag"));
        }
        Ok(ParseTree::Capture {
            tag,
            body: Box::new(body),
        })
    }

    pub fn rule(name: impl Into<String>) -> Self {
        ParseTree::Rule(name.into())
    }

    pub fn hook(name: impl Into<String>, params: Vec<HookParam>) -> Self {
        ParseTree::Hook {
            name: name.into(),
            params,
        }
    }

    pub fn read(reader: impl Into<String>, params: Vec<Value>) -> Self {
        ParseTree::Read {
            reader: reader.into(),
            params,
        }
    }

    // ------------------------------------------------------------------------
    // Built-in reader shorthands
    // ------------------------------------------------------------------------

    /// Matches exactly the character `c`.
    pub fn read_char(c: char) -> Self {
        Self::read(readers::READ_CHAR, vec![Value::Str(c.to_string())])
    }

    /// Matches any single character in the inclusive range `lo..=hi`.
    pub fn read_range(lo: char, hi: char) -> Self {
        Self::read(
            readers::READ_RANGE,
            vec![Value::Str(lo.to_string()), Value::Str(hi.to_string())],
        )
    }

    /// Matches the literal text `text`.
    pub fn read_text(text: impl Into<String>) -> Self {
        Self::read(readers::READ_TEXT, vec![Value::Str(text.into())])
    }

    /// Matches a decimal integer literal.
    pub fn read_integer() -> Self {
        Self::read(readers::READ_INTEGER, vec![])
    }

    /// Matches an identifier: a letter or underscore, then letters, digits
    /// or underscores.
    pub fn read_identifier() -> Self {
        Self::read(readers::READ_IDENTIFIER, vec![])
    }
}

// ============================================================================
// MODULE EXPORTS
// ============================================================================

pub mod dump;
