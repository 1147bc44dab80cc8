//! The parser session.
//!
//! A [`Parser`] composes everything one evaluation needs: the transactional
//! [`Stream`], the rule table, the hook and reader registries, the pluggable
//! ignorable-input skipper, and the capture-frame stack. All of it is
//! exclusively owned: running two parses concurrently means two `Parser`
//! instances.
//!
//! ## Frame discipline
//!
//! `rulenodes` holds one frame per currently-open capture scope, with frame 0
//! as the root frame that outlives the whole parse. Every push is matched by
//! exactly one pop on success, failure, and error paths alike; after a
//! complete top-level evaluation only the root frame remains.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};
use once_cell::sync::Lazy;

use crate::ast::value::Value;
use crate::ast::Node;
use crate::diagnostics::VyakaError;
use crate::grammar::{dump, ParseTree};
use crate::hooks::{CaptureRef, HookArg, HookParam, HookRegistry, ParamKind};
use crate::readers::{register_builtin_readers, ReaderRegistry};
use crate::runtime::{eval, Outcome};
use crate::stream::Stream;

// ============================================================================
// IGNORABLE-INPUT SKIPPING
// ============================================================================

/// Procedure consulted by `skip_ignore`: advances the stream past input the
/// grammar treats as insignificant. Operates on the stream directly — never
/// a combinator tree — so it cannot re-enter the evaluator or open
/// transactions.
pub type IgnoreFn = Arc<dyn Fn(&mut Stream) + Send + Sync>;

/// Default skipper: ASCII whitespace.
pub fn skip_whitespace(stream: &mut Stream) {
    while stream.peek().is_some_and(|c| c.is_ascii_whitespace()) {
        stream.bump();
    }
}

static DEFAULT_IGNORE: Lazy<IgnoreFn> = Lazy::new(|| Arc::new(skip_whitespace));

// ============================================================================
// PARSER
// ============================================================================

/// One grammar-execution session: grammar, registries, stream, and capture
/// frames.
pub struct Parser {
    pub(crate) stream: Stream,
    rules: HashMap<String, Arc<ParseTree>>,
    hooks: HookRegistry,
    readers: ReaderRegistry,
    ignore: IgnoreFn,
    rulenodes: Vec<HashMap<String, Node>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Builds an empty parser with the built-in readers registered and
    /// whitespace skipping as the ignorable-input rule.
    pub fn new() -> Self {
        let mut readers = ReaderRegistry::new();
        register_builtin_readers(&mut readers);
        Self {
            stream: Stream::new(""),
            rules: HashMap::new(),
            hooks: HookRegistry::new(),
            readers,
            ignore: Arc::clone(&DEFAULT_IGNORE),
            rulenodes: vec![HashMap::new()],
        }
    }

    // ------------------------------------------------------------------------
    // Grammar assembly
    // ------------------------------------------------------------------------

    /// Associates `name` with a functor tree. Rules resolve by name at each
    /// evaluation, so a rule may be registered after others already
    /// reference it — it only has to exist by the time evaluation reaches
    /// it.
    pub fn set_rule(&mut self, name: &str, tree: ParseTree) {
        self.rules.insert(name.to_string(), Arc::new(tree));
    }

    /// Returns true if `name` is a registered rule.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registers a hook under `name` with its declared parameter schema.
    pub fn set_hook<F>(&mut self, name: &str, schema: Vec<ParamKind>, func: F)
    where
        F: Fn(&mut Parser, &[HookArg]) -> Result<Outcome, VyakaError> + 'static,
    {
        self.hooks.register(name, schema, func);
    }

    /// Registers or rebinds a token reader under `name`.
    pub fn set_reader<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Parser, &[Value]) -> Result<Outcome, VyakaError> + 'static,
    {
        self.readers.register(name, func);
    }

    /// Overrides the ignorable-input rule consulted by `skip_ignore`.
    pub fn set_ignore<F>(&mut self, func: F)
    where
        F: Fn(&mut Stream) + Send + Sync + 'static,
    {
        self.ignore = Arc::new(func);
    }

    // ------------------------------------------------------------------------
    // Top-level evaluation
    // ------------------------------------------------------------------------

    /// Starts evaluation of the named rule against `input`.
    ///
    /// Returns `Ok(Some(node))` on success, with the root frame's captures
    /// attached as the node's children; `Ok(None)` is the definite,
    /// diagnostic-free match failure. `Err` is reserved for programmer
    /// errors (malformed grammar, unresolved names).
    pub fn parse(&mut self, input: &str, rule: &str) -> Result<Option<Node>, VyakaError> {
        debug!("parse: rule `{}`, {} byte(s) of input", rule, input.len());
        self.stream.reset(input);
        self.rulenodes.clear();
        self.rulenodes.push(HashMap::new());

        let outcome = self.eval_rule(rule)?;

        debug_assert_eq!(
            self.stream.transaction_depth(),
            0,
            "transaction stack must be balanced after a top-level parse"
        );
        debug_assert_eq!(
            self.rulenodes.len(),
            1,
            "capture-frame stack must be balanced after a top-level parse"
        );

        let Outcome::Matched(node) = outcome else {
            debug!("parse: rule `{}` did not match", rule);
            return Ok(None);
        };

        let mut root = node.unwrap_or_else(|| Node::from(true));
        for (tag, captured) in self.captures() {
            root.children
                .entry(tag.clone())
                .or_insert_with(|| captured.clone());
        }
        debug!(
            "parse: rule `{}` matched, cursor at byte {}",
            rule,
            self.stream.pos()
        );
        Ok(Some(root))
    }

    /// Evaluates the functor tree currently registered under `name`. This is
    /// the indirection that makes recursive and mutually recursive grammars
    /// possible.
    pub fn eval_rule(&mut self, name: &str) -> Result<Outcome, VyakaError> {
        let Some(tree) = self.rules.get(name).cloned() else {
            return Err(VyakaError::unknown_rule(name));
        };
        trace!("rule `{}` at byte {}", name, self.stream.pos());
        let outcome = eval::eval(&tree, self)?;
        trace!(
            "rule `{}` {}",
            name,
            if outcome.is_matched() { "matched" } else { "failed" }
        );
        Ok(outcome)
    }

    /// Dispatches a hook invocation: resolves the entry, checks the supplied
    /// parameters against the declared schema, builds the runtime arguments,
    /// and calls the hook. A schema mismatch is a malformed-grammar error,
    /// never a match failure.
    pub fn eval_hook(&mut self, name: &str, params: &[HookParam]) -> Result<Outcome, VyakaError> {
        let Some(entry) = self.hooks.get(name).cloned() else {
            return Err(VyakaError::unknown_hook(name));
        };
        if entry.schema.len() != params.len() {
            return Err(VyakaError::malformed(format!(
                "hook `{}` declares {} parameter(s), grammar supplies {}",
                name,
                entry.schema.len(),
                params.len()
            )));
        }

        let mut args = Vec::with_capacity(params.len());
        for (idx, (param, kind)) in params.iter().zip(entry.schema.iter()).enumerate() {
            match (param, kind) {
                (HookParam::Tag(tag), ParamKind::Node) => {
                    args.push(HookArg::Node(self.resolve_capture(tag)?));
                }
                (HookParam::Tag(tag), other) => {
                    return Err(VyakaError::malformed(format!(
                        "hook `{}` parameter {}: tag `{}` bound to `{}` slot; tags satisfy only `node`",
                        name,
                        idx,
                        tag,
                        other.name()
                    )));
                }
                (HookParam::Literal(value), kind) => {
                    if param.literal_kind() != Some(*kind) {
                        return Err(VyakaError::malformed(format!(
                            "hook `{}` parameter {}: expected `{}`, got `{}`",
                            name,
                            idx,
                            kind.name(),
                            value.type_name()
                        )));
                    }
                    args.push(HookArg::Value(value.clone()));
                }
            }
        }

        trace!("hook `{}` with {} argument(s)", name, args.len());
        (entry.func)(self, &args)
    }

    /// Dispatches a reader invocation against the current stream state.
    pub fn eval_reader(&mut self, name: &str, params: &[Value]) -> Result<Outcome, VyakaError> {
        let Some(reader) = self.readers.get(name).cloned() else {
            return Err(VyakaError::unknown_reader(name));
        };
        reader(self, params)
    }

    /// Advances the stream past ignorable input.
    pub fn skip_ignore(&mut self) {
        let ignore = Arc::clone(&self.ignore);
        ignore(&mut self.stream);
    }

    // ------------------------------------------------------------------------
    // Capture frames
    // ------------------------------------------------------------------------

    /// The root frame: captures published by the outermost scope.
    pub fn captures(&self) -> &HashMap<String, Node> {
        self.rulenodes
            .first()
            .expect("capture-frame stack always holds the root frame")
    }

    /// Current frame-stack depth, root frame included.
    pub fn frame_depth(&self) -> usize {
        self.rulenodes.len()
    }

    pub(crate) fn push_frame(&mut self) {
        self.rulenodes.push(HashMap::new());
    }

    pub(crate) fn pop_frame(&mut self) {
        debug_assert!(
            self.rulenodes.len() > 1,
            "the root capture frame is never popped"
        );
        if self.rulenodes.len() > 1 {
            self.rulenodes.pop();
        }
    }

    /// Stores `node` under `tag` in the innermost frame.
    pub(crate) fn frame_insert(&mut self, tag: &str, node: Node) {
        self.rulenodes
            .last_mut()
            .expect("capture-frame stack always holds the root frame")
            .insert(tag.to_string(), node);
    }

    /// Resolves `tag` in the innermost frame to an indexed capture
    /// reference.
    pub(crate) fn resolve_capture(&self, tag: &str) -> Result<CaptureRef, VyakaError> {
        let frame = self.rulenodes.len() - 1;
        let innermost = self
            .rulenodes
            .last()
            .expect("capture-frame stack always holds the root frame");
        if !innermost.contains_key(tag) {
            return Err(VyakaError::unknown_capture(tag));
        }
        Ok(CaptureRef {
            frame,
            tag: tag.to_string(),
        })
    }

    /// Reads the capture a reference points at. Fails when the referenced
    /// frame is gone or no longer holds the tag.
    pub fn capture(&self, capture: &CaptureRef) -> Result<&Node, VyakaError> {
        self.rulenodes
            .get(capture.frame)
            .and_then(|frame| frame.get(&capture.tag))
            .ok_or_else(|| VyakaError::unknown_capture(&capture.tag))
    }

    /// Mutable access to the capture a reference points at. Mutations are
    /// observable through the owning frame — the reference is an index, not
    /// a copy.
    pub fn capture_mut(&mut self, capture: &CaptureRef) -> Result<&mut Node, VyakaError> {
        self.rulenodes
            .get_mut(capture.frame)
            .and_then(|frame| frame.get_mut(&capture.tag))
            .ok_or_else(|| VyakaError::unknown_capture(&capture.tag))
    }

    // ------------------------------------------------------------------------
    // Stream access
    // ------------------------------------------------------------------------

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Mutable stream access, for custom readers.
    pub fn stream_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    // ------------------------------------------------------------------------
    // Debug rendering
    // ------------------------------------------------------------------------

    /// Renders every registered rule with the debug pretty-printer, one
    /// `name : tree` line per rule, sorted by name.
    pub fn dump_rules(&self) -> String {
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        let mut out = String::new();
        for name in names {
            out.push_str(name);
            out.push_str(" : ");
            out.push_str(&dump::dump(&self.rules[name]));
            out.push('\n');
        }
        out
    }
}
