//! Transactional input stream.
//!
//! The stream owns the input text for the duration of one parse, a byte
//! cursor, a stack of saved cursor positions (transactions), and a stack of
//! named tag marks used by the capture protocol.
//!
//! Transactions nest and must be discarded in strict LIFO order: every
//! [`Stream::save`] is matched by exactly one [`Stream::validate`] (keep the
//! advanced position) or [`Stream::restore`] (rewind to the snapshot). The
//! [`Transaction`] token is consumed by either call, so committing or rewinding
//! the same snapshot twice is a move error, not a runtime surprise.

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// A saved cursor snapshot. Obtained from [`Stream::save`], spent by
/// [`Stream::validate`] or [`Stream::restore`].
#[derive(Debug)]
#[must_use = "a saved transaction must be validated or restored"]
pub struct Transaction {
    depth: usize,
}

/// One named tag boundary: where the tag opened and, once closed, where it
/// ended. Marks form a stack so identically named tags in nested capture
/// scopes resolve innermost-first.
#[derive(Debug)]
struct TagMark {
    name: String,
    begin: usize,
    end: Option<usize>,
}

// ============================================================================
// STREAM
// ============================================================================

/// The input buffer plus all cursor bookkeeping for one parse session.
#[derive(Debug, Default)]
pub struct Stream {
    input: String,
    pos: usize,
    saved: Vec<usize>,
    tags: Vec<TagMark>,
}

impl Stream {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            pos: 0,
            saved: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Reloads the stream with fresh input and clears all bookkeeping.
    pub fn reset(&mut self, input: impl Into<String>) {
        self.input = input.into();
        self.pos = 0;
        self.saved.clear();
        self.tags.clear();
    }

    // ------------------------------------------------------------------------
    // Cursor access
    // ------------------------------------------------------------------------

    /// Current cursor position, in bytes from the start of the input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the unconsumed remainder of the input.
    pub fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Returns the character under the cursor without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes and returns the character under the cursor.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advances the cursor by `len` bytes. Callers must pass a length that
    /// lands on a character boundary (e.g. the length of a matched prefix).
    pub fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.input.len());
    }

    /// Returns true when the whole input has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    /// Saves the current position and returns the snapshot token.
    pub fn save(&mut self) -> Transaction {
        self.saved.push(self.pos);
        Transaction {
            depth: self.saved.len(),
        }
    }

    /// Discards the snapshot, keeping the current (possibly advanced)
    /// position. The token must be the most recently saved one.
    pub fn validate(&mut self, tx: Transaction) {
        debug_assert_eq!(
            tx.depth,
            self.saved.len(),
            "transactions must be discarded in LIFO order"
        );
        self.saved.pop();
    }

    /// Discards the snapshot and rewinds the cursor back to it. The token
    /// must be the most recently saved one.
    pub fn restore(&mut self, tx: Transaction) {
        debug_assert_eq!(
            tx.depth,
            self.saved.len(),
            "transactions must be discarded in LIFO order"
        );
        if let Some(p) = self.saved.pop() {
            self.pos = p;
        }
    }

    /// Number of snapshots currently outstanding. Zero before and after a
    /// complete top-level evaluation.
    pub fn transaction_depth(&self) -> usize {
        self.saved.len()
    }

    // ------------------------------------------------------------------------
    // Tag boundaries
    // ------------------------------------------------------------------------

    /// Marks the current position as the start of the named tag.
    pub fn begin_tag(&mut self, name: &str) -> bool {
        self.tags.push(TagMark {
            name: name.to_string(),
            begin: self.pos,
            end: None,
        });
        true
    }

    /// Closes the innermost open mark for `name` at the current position.
    /// Returns false when no such mark is open.
    pub fn end_tag(&mut self, name: &str) -> bool {
        let pos = self.pos;
        let Some(mark) = self
            .tags
            .iter_mut()
            .rev()
            .find(|m| m.name == name && m.end.is_none())
        else {
            return false;
        };
        mark.end = Some(pos);
        true
    }

    /// Returns the exact substring between the innermost closed marks for
    /// `name`.
    pub fn get_tag(&self, name: &str) -> Option<&str> {
        let mark = self
            .tags
            .iter()
            .rev()
            .find(|m| m.name == name && m.end.is_some())?;
        let end = mark.end?;
        Some(&self.input[mark.begin..end])
    }

    /// Removes the innermost mark for `name`, open or closed. Each
    /// `begin_tag` is paired with exactly one `release_tag` on every exit
    /// path of the capture that opened it.
    pub fn release_tag(&mut self, name: &str) {
        if let Some(idx) = self.tags.iter().rposition(|m| m.name == name) {
            self.tags.remove(idx);
        }
    }

    /// Number of marks currently held, open or closed.
    pub fn open_tags(&self) -> usize {
        self.tags.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
