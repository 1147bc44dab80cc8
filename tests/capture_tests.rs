// tests/capture_tests.rs
//
// The capture protocol: tag boundaries, frame balance, value propagation,
// and the indexed references hooks use to reach live captures.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vyaka::{HookParam, Outcome, ParamKind, ParseTree, Parser, Value};

fn seq(children: Vec<ParseTree>) -> ParseTree {
    ParseTree::sequence(children).expect("sequence should build")
}

fn capture(tag: &str, body: ParseTree) -> ParseTree {
    ParseTree::capture(tag, body).expect("capture should build")
}

// ---
// Value propagation
// ---

#[test]
fn test_capture_assigns_the_matched_text_as_value() {
    let mut p = Parser::new();
    p.set_rule("top", capture("n", ParseTree::read_integer()));

    let node = p.parse("42", "top").unwrap().expect("should match");
    assert_eq!(node.value.as_str(), Some("42"));
    assert_eq!(p.captures()["n"].value.as_str(), Some("42"));
}

#[test]
fn test_two_captures_publish_into_the_same_enclosing_frame() {
    let mut p = Parser::new();
    p.set_rule(
        "pair",
        seq(vec![
            capture("a", ParseTree::read_integer()),
            capture("b", ParseTree::read_integer()),
        ]),
    );

    let node = p.parse("12 34", "pair").unwrap().expect("should match");
    assert_eq!(p.captures()["a"].value.as_str(), Some("12"));
    assert_eq!(p.captures()["b"].value.as_str(), Some("34"));
    assert_eq!(node.get("a").unwrap().value.as_str(), Some("12"));
    assert_eq!(node.get("b").unwrap().value.as_str(), Some("34"));
}

#[test]
fn test_failed_capture_publishes_nothing() {
    let mut p = Parser::new();
    p.set_rule("top", capture("n", ParseTree::read_char('a')));

    let result = p.parse("b", "top").expect("no programmer error");
    assert!(result.is_none());
    assert!(p.captures().is_empty());
}

// ---
// Frame balance
// ---

#[test]
fn test_frame_stack_is_balanced_after_success_and_failure() {
    let mut p = Parser::new();
    p.set_rule(
        "top",
        capture("outer", seq(vec![capture("inner", ParseTree::read_integer())])),
    );

    assert!(p.parse("7", "top").unwrap().is_some());
    assert_eq!(p.frame_depth(), 1);

    assert!(p.parse("x", "top").unwrap().is_none());
    assert_eq!(p.frame_depth(), 1);
}

#[test]
fn test_nested_same_name_captures_keep_their_own_boundaries() {
    let mut p = Parser::new();
    p.set_rule(
        "top",
        capture(
            "x",
            seq(vec![
                ParseTree::read_text("ab"),
                capture("x", ParseTree::read_text("cd")),
            ]),
        ),
    );

    // The inner `x` closes its own mark at "cd"; the outer mark still spans
    // the whole match.
    assert!(p.parse("abcd", "top").unwrap().is_some());
    assert_eq!(p.captures()["x"].value.as_str(), Some("abcd"));
    assert_eq!(p.stream().open_tags(), 0);
}

// ---
// Hook access to live captures
// ---

#[test]
fn test_hook_mutation_is_observable_in_the_owning_frame() {
    let mut p = Parser::new();
    p.set_hook("rename", vec![ParamKind::Node], |parser, args| {
        let capture = args[0].as_capture().expect("declared as node").clone();
        parser.capture_mut(&capture)?.value = Value::Str("renamed".to_string());
        Ok(Outcome::Matched(None))
    });
    p.set_rule(
        "top",
        seq(vec![
            capture("n", ParseTree::read_integer()),
            ParseTree::hook("rename", vec![HookParam::tag("n")]),
        ]),
    );

    let node = p.parse("42", "top").unwrap().expect("should match");
    // The hook saw the frame's node itself, not a copy.
    assert_eq!(p.captures()["n"].value.as_str(), Some("renamed"));
    assert_eq!(node.get("n").unwrap().value.as_str(), Some("renamed"));
}

#[test]
fn test_in_progress_capture_is_observable_as_a_placeholder() {
    let saw_placeholder = Rc::new(Cell::new(false));
    let flag = Rc::clone(&saw_placeholder);

    let mut p = Parser::new();
    p.set_hook("peek", vec![ParamKind::Node], move |parser, args| {
        let capture = args[0].as_capture().expect("declared as node");
        let node = parser.capture(capture)?;
        flag.set(node.is_empty());
        Ok(Outcome::Matched(None))
    });
    p.set_rule(
        "top",
        capture(
            "n",
            seq(vec![
                ParseTree::read_integer(),
                ParseTree::hook("peek", vec![HookParam::tag("n")]),
            ]),
        ),
    );

    assert!(p.parse("7", "top").unwrap().is_some());
    assert!(saw_placeholder.get());
}

#[test]
fn test_hook_sees_a_sibling_capture_inside_an_enclosing_capture() {
    let seen = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&seen);

    let mut p = Parser::new();
    p.set_hook("grab", vec![ParamKind::Node], move |parser, args| {
        let capture = args[0].as_capture().expect("declared as node");
        if let Some(text) = parser.capture(capture)?.value.as_str() {
            sink.borrow_mut().push_str(text);
        }
        Ok(Outcome::Matched(None))
    });
    p.set_rule(
        "top",
        capture(
            "outer",
            seq(vec![
                capture("inner", ParseTree::read_integer()),
                ParseTree::hook("grab", vec![HookParam::tag("inner")]),
            ]),
        ),
    );

    assert!(p.parse("42", "top").unwrap().is_some());
    assert_eq!(seen.borrow().as_str(), "42");
    // The inner capture lived in the outer frame, which is gone; only the
    // outer capture published to the root.
    assert!(p.captures().contains_key("outer"));
    assert!(!p.captures().contains_key("inner"));
}

#[test]
fn test_capture_keeps_a_value_the_body_already_produced() {
    let mut p = Parser::new();
    // A reader that consumes one character and hands back a node that
    // already carries a payload.
    p.set_reader("tick", |parser, _params| {
        let stream = parser.stream_mut();
        if stream.bump().is_none() {
            return Ok(Outcome::Failed);
        }
        Ok(Outcome::Matched(Some(vyaka::Node::from(Value::Int(7)))))
    });
    p.set_rule("top", capture("n", ParseTree::read("tick", vec![])));

    // The matched text "x" must not overwrite the node's existing payload.
    assert!(p.parse("x", "top").unwrap().is_some());
    assert_eq!(p.captures()["n"].value.as_int(), Some(7));
}
