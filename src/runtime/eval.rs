//! The recursive combinator evaluator.
//!
//! One exhaustive match over the functor variants, one helper per variant.
//! Every helper either returns immediately or recurses synchronously into
//! its children; recursion depth is bounded by grammar nesting and input
//! length, not by an engine limit, and left-recursive rules do not
//! terminate.
//!
//! ## Backtracking responsibilities
//!
//! Only ordered choice is transactional. Sequence, the repetitions, the
//! optional, and the bracket leave whatever a failing child consumed in
//! place; a grammar that needs those combinators to be atomic wraps them in
//! a choice. Capture and choice restore their bookkeeping (frames, tag
//! marks, transactions) on success, failure, and error paths alike.

use crate::ast::value::Value;
use crate::ast::Node;
use crate::diagnostics::VyakaError;
use crate::grammar::ParseTree;
use crate::runtime::{Outcome, Parser};

// ============================================================================
// PUBLIC API: tree evaluation
// ============================================================================

/// Attempts to match `tree` against the parser's current state.
pub fn eval(tree: &ParseTree, parser: &mut Parser) -> Result<Outcome, VyakaError> {
    match tree {
        ParseTree::Sequence(children) => evaluate_sequence(children, parser),
        ParseTree::Choice(alternatives) => evaluate_choice(alternatives, parser),
        ParseTree::ZeroOrMore(body) => evaluate_zero_or_more(body, parser),
        ParseTree::OneOrMore(body) => evaluate_one_or_more(body, parser),
        ParseTree::Optional(body) => evaluate_optional(body, parser),
        ParseTree::Bracket { begin, body, end } => evaluate_bracket(begin, body, end, parser),
        ParseTree::Capture { tag, body } => evaluate_capture(tag, body, parser),
        ParseTree::Rule(name) => parser.eval_rule(name),
        ParseTree::Hook { name, params } => parser.eval_hook(name, params),
        ParseTree::Read { reader, params } => parser.eval_reader(reader, params),
    }
}

// ============================================================================
// INTERNAL HELPERS: variant-specific evaluation
// ============================================================================

/// Children in order, ignorable input skipped before each. Fails on the
/// first failing child and performs no rollback of its own; the stream stays
/// wherever that child left it.
fn evaluate_sequence(children: &[ParseTree], parser: &mut Parser) -> Result<Outcome, VyakaError> {
    for child in children {
        parser.skip_ignore();
        if !eval(child, parser)?.is_matched() {
            return Ok(Outcome::Failed);
        }
    }
    Ok(Outcome::Matched(None))
}

/// First-match-wins alternation. Each alternative runs inside its own
/// transaction: committed on success, rewound on failure — and rewound on a
/// programmer error too, so the transaction stack stays balanced while the
/// error propagates.
fn evaluate_choice(alternatives: &[ParseTree], parser: &mut Parser) -> Result<Outcome, VyakaError> {
    for alternative in alternatives {
        let tx = parser.stream.save();
        parser.skip_ignore();
        match eval(alternative, parser) {
            Ok(outcome) if outcome.is_matched() => {
                parser.stream.validate(tx);
                return Ok(outcome);
            }
            Ok(_) => parser.stream.restore(tx),
            Err(err) => {
                parser.stream.restore(tx);
                return Err(err);
            }
        }
    }
    Ok(Outcome::Failed)
}

/// Greedy, zero or more occurrences; always matches. No transaction spans
/// the iterations, so nothing a later failure elsewhere might want undone is
/// undone here.
fn evaluate_zero_or_more(body: &ParseTree, parser: &mut Parser) -> Result<Outcome, VyakaError> {
    parser.skip_ignore();
    while eval(body, parser)?.is_matched() {
        parser.skip_ignore();
    }
    Ok(Outcome::Matched(None))
}

/// Greedy, at least one occurrence.
fn evaluate_one_or_more(body: &ParseTree, parser: &mut Parser) -> Result<Outcome, VyakaError> {
    parser.skip_ignore();
    if !eval(body, parser)?.is_matched() {
        return Ok(Outcome::Failed);
    }
    parser.skip_ignore();
    while eval(body, parser)?.is_matched() {
        parser.skip_ignore();
    }
    Ok(Outcome::Matched(None))
}

/// Zero or one occurrence; always matches. A failing attempt's partial
/// consumption stays consumed — the enclosing choice is the rollback
/// boundary.
fn evaluate_optional(body: &ParseTree, parser: &mut Parser) -> Result<Outcome, VyakaError> {
    parser.skip_ignore();
    eval(body, parser)?;
    Ok(Outcome::Matched(None))
}

/// `begin`, then `body`, then `end`; yields the body's result. A failing
/// `end` loses a matched body without rewinding its consumption — the
/// bracket is not atomic.
fn evaluate_bracket(
    begin: &ParseTree,
    body: &ParseTree,
    end: &ParseTree,
    parser: &mut Parser,
) -> Result<Outcome, VyakaError> {
    if !eval(begin, parser)?.is_matched() {
        return Ok(Outcome::Failed);
    }
    let result = eval(body, parser)?;
    if !eval(end, parser)?.is_matched() {
        return Ok(Outcome::Failed);
    }
    Ok(result)
}

/// Named capture: opens a tag boundary, runs the body inside a fresh frame
/// seeded with a placeholder node (so in-progress captures are observable to
/// the body's hooks), and on success publishes the finished node into the
/// enclosing frame. Frame and tag bookkeeping unwind on every exit path.
fn evaluate_capture(
    tag: &str,
    body: &ParseTree,
    parser: &mut Parser,
) -> Result<Outcome, VyakaError> {
    if !parser.stream.begin_tag(tag) {
        return Ok(Outcome::Failed);
    }
    parser.push_frame();
    parser.frame_insert(tag, Node::new());

    let result = eval(body, parser);
    parser.pop_frame();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            parser.stream.release_tag(tag);
            return Err(err);
        }
    };

    if !outcome.is_matched() || !parser.stream.end_tag(tag) {
        parser.stream.release_tag(tag);
        return Ok(Outcome::Failed);
    }

    let text = parser
        .stream
        .get_tag(tag)
        .unwrap_or_default()
        .to_string();
    parser.stream.release_tag(tag);

    let mut node = outcome.into_node().unwrap_or_default();
    if node.value.is_nil() {
        node.value = Value::Str(text);
    }
    parser.frame_insert(tag, node.clone());
    Ok(Outcome::Matched(Some(node)))
}
