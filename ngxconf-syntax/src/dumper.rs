//! Serializes a syntax tree back to configuration text.
//!
//! Trivia is emitted verbatim, so an unmodified tree reproduces its
//! source exactly (for canonically formatted input: four-space
//! indentation, single interior spaces). Entries produced by
//! mutation are rendered at the indentation of their nesting depth.

use crate::tree::{Entry, EntryKind, Tree};

const INDENT: &str = "    ";
const SPACE: &str = " ";

/// Tree-to-text serializer with an indentation counter.
#[derive(Debug, Default)]
pub struct Dumper {
    nesting: usize,
}

impl Dumper {
    pub fn dump(&mut self, tree: &Tree) -> String {
        let mut out = String::new();
        self.dump_entries(&tree.entries, &tree.trailing, &mut out);
        out
    }

    fn dump_entries(&mut self, entries: &[Entry], trailing: &[String], out: &mut String) {
        for entry in entries {
            for run in &entry.start_newlines {
                out.push_str(run);
            }

            self.dump_entry(entry, out);

            for run in &entry.end_newlines {
                out.push_str(run);
            }
        }

        for run in trailing {
            out.push_str(run);
        }
    }

    fn dump_entry(&mut self, entry: &Entry, out: &mut String) {
        self.separate(out);

        match &entry.kind {
            EntryKind::Comment(comment) => out.push_str(&comment.text),
            EntryKind::Directive(directive) => {
                out.push_str(&directive.name);

                let expressions = directive.expressions();
                if !expressions.is_empty() {
                    out.push_str(SPACE);
                    out.push_str(&expressions.join(SPACE));
                }

                out.push(';');
            }
            EntryKind::Block(block) => {
                out.push_str(&block.name);

                let parameters = block.parameter_expressions();
                if !parameters.is_empty() {
                    out.push_str(SPACE);
                    out.push_str(&parameters.join(SPACE));
                }

                out.push_str(" {");

                if let Some(content) = &block.content {
                    self.nesting += 1;
                    self.dump_entries(&content.entries, &content.trailing, out);
                    self.nesting -= 1;
                }

                self.pad(out);
                out.push('}');
            }
        }
    }

    /// Indent when at the start of a line; otherwise keep the entry on
    /// the current line with a single separating space (inline
    /// comments, entries following `{` without a newline).
    fn separate(&self, out: &mut String) {
        if out.is_empty() {
            return;
        }

        if out.ends_with('\n') {
            self.pad(out);
        } else {
            out.push_str(SPACE);
        }
    }

    /// Indent only when at the start of a line.
    fn pad(&self, out: &mut String) {
        if out.ends_with('\n') {
            for _ in 0..self.nesting {
                out.push_str(INDENT);
            }
        }
    }
}

/// Serialize a tree to configuration text.
pub fn dump(tree: &Tree) -> String {
    Dumper::default().dump(tree)
}
