//! Debug pretty-printer for combinator trees.
//!
//! Rendering is a separate pass over the closed variant set — one exhaustive
//! match — so the functor types themselves stay free of secondary behavior.
//! The notation follows grammar-authoring conventions: `'a'` for a literal
//! character, `'0'..'9'` for a range, `"txt"` for literal text, `#num` /
//! `#id` for the numeric and identifier readers, `[ .. ]*` / `+` / `?` for
//! the repetitions, and `[ .. ] : tag` for a capture.

use std::fmt::Write;

use crate::ast::value::Value;
use crate::grammar::ParseTree;
use crate::hooks::HookParam;
use crate::readers;

/// Renders one combinator tree on a single line.
pub fn dump(tree: &ParseTree) -> String {
    match tree {
        ParseTree::Sequence(children) => join(children, " "),
        ParseTree::Choice(alternatives) => format!("( {} )", join(alternatives, " | ")),
        ParseTree::ZeroOrMore(body) => format!("[ {} ]*", dump(body)),
        ParseTree::OneOrMore(body) => format!("[ {} ]+", dump(body)),
        ParseTree::Optional(body) => format!("[ {} ]?", dump(body)),
        ParseTree::Bracket { begin, body, end } => {
            format!("[{} {} {}]", dump(begin), dump(body), dump(end))
        }
        ParseTree::Capture { tag, body } => format!("[ {} ] : {}", dump(body), tag),
        ParseTree::Rule(name) => name.clone(),
        ParseTree::Hook { name, params } => dump_hook(name, params),
        ParseTree::Read { reader, params } => dump_read(reader, params),
    }
}

fn join(trees: &[ParseTree], separator: &str) -> String {
    trees
        .iter()
        .map(dump)
        .collect::<Vec<_>>()
        .join(separator)
}

fn dump_hook(name: &str, params: &[HookParam]) -> String {
    if params.is_empty() {
        return format!("#{}", name);
    }
    let rendered = params
        .iter()
        .map(|p| match p {
            HookParam::Literal(v) => dump_value(v),
            HookParam::Tag(t) => t.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("#{}({})", name, rendered)
}

/// Built-in readers render in grammar notation; custom readers fall back to
/// an explicit call form.
fn dump_read(reader: &str, params: &[Value]) -> String {
    match (reader, params) {
        (readers::READ_CHAR, [Value::Str(c)]) => format!("'{}'", c),
        (readers::READ_RANGE, [Value::Str(lo), Value::Str(hi)]) => {
            format!("'{}'..'{}'", lo, hi)
        }
        (readers::READ_TEXT, [Value::Str(t)]) => format!("{:?}", t),
        (readers::READ_INTEGER, []) => "#num".to_string(),
        (readers::READ_IDENTIFIER, []) => "#id".to_string(),
        _ => {
            let mut out = String::new();
            let _ = write!(out, "#read: {} (", reader);
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&dump_value(p));
            }
            out.push(')');
            out
        }
    }
}

fn dump_value(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}
