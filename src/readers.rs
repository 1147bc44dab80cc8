//! # Vyaka Token Readers
//!
//! Readers are the primitive matchers at the leaves of a grammar: small
//! procedures that inspect the stream directly instead of recursing into
//! further combinators. Five are built in — literal character, character
//! range, literal text, integer, identifier — and a grammar may register or
//! rebind arbitrary custom readers under any name.
//!
//! A reader receives the parser and the literal parameters bound into the
//! `Read` functor at construction time. Built-ins validate those parameters
//! on every call and report misuse as a malformed-grammar error; failure to
//! match the input is never an error, only a failed outcome.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::value::Value;
use crate::diagnostics::VyakaError;
use crate::runtime::{Outcome, Parser};

// ============================================================================
// CORE TYPES
// ============================================================================

/// The callable behind a registered reader.
pub type ReaderFn = dyn Fn(&mut Parser, &[Value]) -> Result<Outcome, VyakaError>;

/// Registry of named readers. Rebinding a name replaces the previous reader.
#[derive(Default, Clone)]
pub struct ReaderRegistry {
    readers: HashMap<String, Arc<ReaderFn>>,
}

impl ReaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Parser, &[Value]) -> Result<Outcome, VyakaError> + 'static,
    {
        self.readers.insert(name.to_string(), Arc::new(func));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ReaderFn>> {
        self.readers.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.readers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub fn list(&self) -> Vec<String> {
        self.readers.keys().cloned().collect()
    }
}

// ============================================================================
// BUILT-IN READER NAMES
// ============================================================================

pub const READ_CHAR: &str = "char";
pub const READ_RANGE: &str = "range";
pub const READ_TEXT: &str = "text";
pub const READ_INTEGER: &str = "integer";
pub const READ_IDENTIFIER: &str = "identifier";

// ============================================================================
// BUILT-IN READERS
// ============================================================================

/// Registers the five built-in readers with the given registry. Called once
/// during parser construction; grammars may rebind any of the names
/// afterwards.
pub fn register_builtin_readers(registry: &mut ReaderRegistry) {
    registry.register(READ_CHAR, read_char);
    registry.register(READ_RANGE, read_range);
    registry.register(READ_TEXT, read_text);
    registry.register(READ_INTEGER, read_integer);
    registry.register(READ_IDENTIFIER, read_identifier);
}

fn read_char(parser: &mut Parser, params: &[Value]) -> Result<Outcome, VyakaError> {
    let expected = expect_char(params, 0, 1, READ_CHAR)?;
    let stream = parser.stream_mut();
    if stream.peek() != Some(expected) {
        return Ok(Outcome::Failed);
    }
    stream.bump();
    Ok(Outcome::Matched(None))
}

fn read_range(parser: &mut Parser, params: &[Value]) -> Result<Outcome, VyakaError> {
    let lo = expect_char(params, 0, 2, READ_RANGE)?;
    let hi = expect_char(params, 1, 2, READ_RANGE)?;
    let stream = parser.stream_mut();
    let Some(c) = stream.peek() else {
        return Ok(Outcome::Failed);
    };
    if c < lo || c > hi {
        return Ok(Outcome::Failed);
    }
    stream.bump();
    Ok(Outcome::Matched(None))
}

fn read_text(parser: &mut Parser, params: &[Value]) -> Result<Outcome, VyakaError> {
    let text = expect_str(params, 0, 1, READ_TEXT)?.to_string();
    let stream = parser.stream_mut();
    if !stream.rest().starts_with(&text) {
        return Ok(Outcome::Failed);
    }
    stream.advance(text.len());
    Ok(Outcome::Matched(None))
}

fn read_integer(parser: &mut Parser, params: &[Value]) -> Result<Outcome, VyakaError> {
    expect_arity(params, 0, READ_INTEGER)?;
    let stream = parser.stream_mut();
    let digits = stream
        .rest()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return Ok(Outcome::Failed);
    }
    stream.advance(digits);
    Ok(Outcome::Matched(None))
}

fn read_identifier(parser: &mut Parser, params: &[Value]) -> Result<Outcome, VyakaError> {
    expect_arity(params, 0, READ_IDENTIFIER)?;
    let stream = parser.stream_mut();
    let Some(first) = stream.peek() else {
        return Ok(Outcome::Failed);
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Ok(Outcome::Failed);
    }
    let len = stream
        .rest()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.len_utf8())
        .sum();
    stream.advance(len);
    Ok(Outcome::Matched(None))
}

// ----------------------------------------------------------------------------
// Bound-parameter validation helpers
// ----------------------------------------------------------------------------

fn expect_arity(params: &[Value], want: usize, reader: &str) -> Result<(), VyakaError> {
    if params.len() != want {
        return Err(VyakaError::malformed(format!(
            "reader `{}` takes {} parameter(s), got {}",
            reader,
            want,
            params.len()
        )));
    }
    Ok(())
}

fn expect_str<'a>(
    params: &'a [Value],
    idx: usize,
    want: usize,
    reader: &str,
) -> Result<&'a str, VyakaError> {
    expect_arity(params, want, reader)?;
    let Some(Value::Str(s)) = params.get(idx) else {
        return Err(VyakaError::malformed(format!(
            "reader `{}` parameter {} must be a string",
            reader, idx
        )));
    };
    Ok(s)
}

fn expect_char(params: &[Value], idx: usize, want: usize, reader: &str) -> Result<char, VyakaError> {
    let s = expect_str(params, idx, want, reader)?;
    let mut chars = s.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(VyakaError::malformed(format!(
            "reader `{}` parameter {} must be a single character, got {:?}",
            reader, idx, s
        )));
    };
    Ok(c)
}
