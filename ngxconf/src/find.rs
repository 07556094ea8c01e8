//! Traversal engine: name-based find over a container, recursing into
//! nested blocks and into include-resolved files.
//!
//! While scanning a container, a running accumulator collects the
//! comments immediately preceding the current entry. On a match it
//! becomes the match's "Before" comments; a blank line or any
//! non-matching directive or block clears it. Recursing into a nested
//! block or an included file starts a fresh accumulator, so trivia
//! never leaks across container boundaries.

use crate::block::Block;
use crate::comment::{Comment, CommentPosition};
use crate::config::Config;
use crate::container::{self, ContainerRef};
use crate::directive::Directive;
use ngxconf_syntax::{
    Block as RawBlock, Directive as RawDirective, Entry, EntryContainer, EntryKind, Tree,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const INCLUDE: &str = "include";

/// One find pass over a subtree.
///
/// Tracks the files already expanded through `include` directives so
/// an include cycle terminates and no file contributes twice to the
/// same query.
pub(crate) struct Finder<'c> {
    config: &'c Config,
    visited: HashSet<PathBuf>,
}

impl<'c> Finder<'c> {
    pub(crate) fn new(config: &'c Config) -> Self {
        Self {
            config,
            visited: HashSet::new(),
        }
    }

    /// A finder scoped to one container. The file holding the
    /// container counts as already expanded, so an include chain that
    /// loops back to it does not report its entries a second time.
    pub(crate) fn scoped(config: &'c Config, scope: &ContainerRef) -> Self {
        let mut finder = Self::new(config);

        if let Some(path) = container::containing_file(config, scope) {
            finder.visit(&path);
        }

        finder
    }

    /// Marks a file as expanded. Returns false when it already was.
    pub(crate) fn visit(&mut self, path: &Path) -> bool {
        self.visited.insert(path.to_path_buf())
    }

    pub(crate) fn find_directives(
        &mut self,
        container: &ContainerRef,
        entries: &[Entry],
        name: &str,
    ) -> Vec<Directive> {
        let mut found = Vec::new();
        let mut pending: Vec<Comment> = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match &entry.kind {
                EntryKind::Comment(comment) => {
                    pending.push(Comment::from_raw(&comment.text, CommentPosition::Before));

                    // A blank line after the comment detaches it.
                    if entry.end_newline_count() > 0 {
                        pending.clear();
                    }
                }
                EntryKind::Directive(directive) => {
                    if directive.name == INCLUDE {
                        for (path, tree) in self.included_files(directive) {
                            found.extend(self.find_directives(
                                &ContainerRef::File(path),
                                &tree.entries,
                                name,
                            ));
                        }
                    }

                    if directive.name == name {
                        let mut comments = std::mem::take(&mut pending);

                        if let Some(inline) = directive_inline_comment(entries, index) {
                            comments.push(inline);
                        }

                        found.push(Directive {
                            id: directive.id(),
                            container: container.clone(),
                            name: directive.name.clone(),
                            values: directive.expressions(),
                            comments,
                        });
                    } else {
                        pending.clear();
                    }
                }
                EntryKind::Block(block) => {
                    found.extend(self.find_directives(
                        &ContainerRef::Block(block.id()),
                        block.entries(),
                        name,
                    ));
                    pending.clear();
                }
            }
        }

        found
    }

    pub(crate) fn find_blocks(
        &mut self,
        container: &ContainerRef,
        entries: &[Entry],
        name: &str,
    ) -> Vec<Block> {
        let mut found = Vec::new();
        let mut pending: Vec<Comment> = Vec::new();

        for entry in entries {
            match &entry.kind {
                EntryKind::Comment(comment) => {
                    pending.push(Comment::from_raw(&comment.text, CommentPosition::Before));

                    if entry.end_newline_count() > 0 {
                        pending.clear();
                    }
                }
                EntryKind::Directive(directive) => {
                    if directive.name == INCLUDE {
                        for (path, tree) in self.included_files(directive) {
                            found.extend(self.find_blocks(
                                &ContainerRef::File(path),
                                &tree.entries,
                                name,
                            ));
                        }
                    }

                    pending.clear();
                }
                EntryKind::Block(block) => {
                    if block.name == name {
                        let mut comments = std::mem::take(&mut pending);

                        if let Some(inline) = block_inline_comment(block) {
                            comments.push(inline);
                        }

                        found.push(Block {
                            id: block.id(),
                            container: container.clone(),
                            name: block.name.clone(),
                            parameters: block.parameter_expressions(),
                            comments,
                        });
                    } else {
                        // Matched blocks are not recursed into; blocks
                        // of the same name do not nest meaningfully.
                        found.extend(self.find_blocks(
                            &ContainerRef::Block(block.id()),
                            block.entries(),
                            name,
                        ));
                        pending.clear();
                    }
                }
            }
        }

        found
    }

    /// Loaded files denoted by an include directive's glob pattern,
    /// minus those already visited by this query. A malformed pattern
    /// or a not-yet-loaded target yields zero matches.
    fn included_files(&mut self, directive: &RawDirective) -> Vec<(PathBuf, &'c Tree)> {
        let Some(value) = directive.values.first() else {
            return Vec::new();
        };

        let pattern_path = self.config.abs_path(Path::new(value.unquoted()));
        let Ok(pattern) = glob::Pattern::new(&pattern_path.to_string_lossy()) else {
            return Vec::new();
        };

        // Mirror filesystem glob semantics: `*` never crosses a
        // path separator.
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::default()
        };

        let config = self.config;
        let mut files = Vec::new();

        for (path, tree) in &config.files {
            if pattern.matches_path_with(path, options) && self.visit(path) {
                tracing::trace!(path = %path.display(), "expanding include");
                files.push((path.clone(), tree));
            }
        }

        files
    }
}

/// A comment entry directly after a directive, with zero newlines on
/// both sides of the gap, is the directive's inline comment.
fn directive_inline_comment(entries: &[Entry], index: usize) -> Option<Comment> {
    let entry = &entries[index];
    let next = entries.get(index + 1)?;
    let comment = next.as_comment()?;

    if !entry.end_newlines.is_empty() || !next.start_newlines.is_empty() {
        return None;
    }

    Some(Comment::from_raw(&comment.text, CommentPosition::Inline))
}

/// A comment opening a block's body on the same line as the `{` is
/// the block's inline comment.
fn block_inline_comment(block: &RawBlock) -> Option<Comment> {
    let first = block.entries().first()?;
    let comment = first.as_comment()?;

    if !first.start_newlines.is_empty() {
        return None;
    }

    Some(Comment::from_raw(&comment.text, CommentPosition::Inline))
}
