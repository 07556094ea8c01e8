//! Trivia-preserving syntax tree for nginx-style configuration.
//!
//! Every byte of the source except horizontal whitespace survives in
//! the tree: newline runs are kept verbatim on the entries they
//! surround, comments keep their `#` marker, and values keep their
//! quotes. Directives and blocks carry a process-unique [`NodeId`] so
//! higher layers can address them after the borrow that produced them
//! has ended.

use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a directive or block node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One parsed file.
#[derive(Debug, Default)]
pub struct Tree {
    pub entries: Vec<Entry>,
    /// Newline run at the end of a file that has no entry to carry it
    /// (for example a file containing only blank lines).
    pub trailing: Vec<String>,
}

/// One item of a container's ordered entry sequence, together with
/// the blank-line trivia captured around it.
#[derive(Debug)]
pub struct Entry {
    pub start_newlines: Vec<String>,
    pub kind: EntryKind,
    pub end_newlines: Vec<String>,
}

impl Entry {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            start_newlines: Vec::new(),
            kind,
            end_newlines: Vec::new(),
        }
    }

    /// Identifier of the directive or block, if this entry is one.
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Directive(directive) => Some(&directive.name),
            EntryKind::Block(block) => Some(&block.name),
            EntryKind::Comment(_) => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.kind {
            EntryKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match &self.kind {
            EntryKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match &self.kind {
            EntryKind::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Total number of line breaks in the trailing trivia.
    pub fn end_newline_count(&self) -> usize {
        self.end_newlines
            .iter()
            .map(|run| run.matches('\n').count())
            .sum()
    }

    /// Total number of line breaks in the leading trivia.
    pub fn start_newline_count(&self) -> usize {
        self.start_newlines
            .iter()
            .map(|run| run.matches('\n').count())
            .sum()
    }
}

/// Exactly one of comment, directive, or block.
#[derive(Debug)]
pub enum EntryKind {
    Comment(Comment),
    Directive(Directive),
    Block(Block),
}

/// A `# ...` comment, verbatim, including the marker and the
/// terminating newline when one was lexed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A terminated statement: `name value* ;`.
#[derive(Debug)]
pub struct Directive {
    id: NodeId,
    pub name: String,
    pub values: Vec<Value>,
}

impl Directive {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            values: values.into_iter().map(Value::new).collect(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(|value| value.expression.as_str())
    }

    /// The raw value expressions, in order.
    pub fn expressions(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|value| value.expression.clone())
            .collect()
    }

    pub fn set_values(&mut self, expressions: Vec<String>) {
        self.values = expressions.into_iter().map(Value::new).collect();
    }
}

/// A named, parameterized compound statement: `name value* { ... }`.
#[derive(Debug)]
pub struct Block {
    id: NodeId,
    pub name: String,
    pub parameters: Vec<Value>,
    /// `None` means the block was never given a body, which is
    /// distinct from an empty body.
    pub content: Option<BlockContent>,
}

impl Block {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            parameters: parameters.into_iter().map(Value::new).collect(),
            content: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parameter_expressions(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|value| value.expression.clone())
            .collect()
    }

    pub fn set_parameters(&mut self, expressions: Vec<String>) {
        self.parameters = expressions.into_iter().map(Value::new).collect();
    }
}

/// Body of a block.
#[derive(Debug, Default)]
pub struct BlockContent {
    pub entries: Vec<Entry>,
    /// Newline run inside a body that has no entry to carry it.
    pub trailing: Vec<String>,
}

/// Quoting style of a value, preserved for re-emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    Bare,
    Double,
    Single,
}

/// One value expression, raw, quotes included when quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub expression: String,
}

impl Value {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn quoting(&self) -> Quoting {
        match self.expression.as_bytes().first() {
            Some(b'"') => Quoting::Double,
            Some(b'\'') => Quoting::Single,
            _ => Quoting::Bare,
        }
    }

    /// The expression with surrounding quotes removed, if any. A
    /// caller-constructed expression shorter than a quote pair is
    /// returned as is.
    pub fn unquoted(&self) -> &str {
        match self.quoting() {
            Quoting::Double | Quoting::Single if self.expression.len() >= 2 => {
                &self.expression[1..self.expression.len() - 1]
            }
            _ => &self.expression,
        }
    }
}

/// Anything holding an ordered, replaceable entry sequence: a file
/// root or a block body. Traversal and mutation are written once
/// against this capability so nesting depth stays transparent.
pub trait EntryContainer {
    fn entries(&self) -> &[Entry];
    fn entries_mut(&mut self) -> &mut Vec<Entry>;
    fn set_entries(&mut self, entries: Vec<Entry>);
}

impl EntryContainer for Tree {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }
}

impl EntryContainer for Block {
    fn entries(&self) -> &[Entry] {
        self.content
            .as_ref()
            .map(|content| content.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Materializes an empty body when the block had none.
    fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.content.get_or_insert_with(BlockContent::default).entries
    }

    fn set_entries(&mut self, entries: Vec<Entry>) {
        self.content.get_or_insert_with(BlockContent::default).entries = entries;
    }
}
