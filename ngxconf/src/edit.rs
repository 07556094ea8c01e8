//! Mutation engine: insert, delete, and replace operations with
//! trivia bookkeeping.
//!
//! Every operation funnels through [`with_container`], which resolves
//! the target container by handle and restores the boundary invariant
//! afterwards. Targets are located by node identity, so an operation
//! against an entry that has since been deleted is a no-op.

use crate::config::Config;
use crate::container::{ContainerRef, with_container};
use ngxconf_syntax::{
    Block as RawBlock, BlockContent, Comment as RawComment, Directive as RawDirective, Entry,
    EntryContainer, EntryKind, NodeId,
};
use std::collections::HashSet;

pub(crate) fn add_directive(
    config: &mut Config,
    container: &ContainerRef,
    name: &str,
    values: Vec<String>,
    at_start: bool,
) -> Option<NodeId> {
    let directive = RawDirective::new(name, values);
    let id = directive.id();

    with_container(config, container, move |target| {
        let entries = target.entries_mut();
        let mut entry = Entry::new(EntryKind::Directive(directive));
        entry.end_newlines.push("\n".to_string());

        // A leading newline keeps the new directive off its
        // predecessor's line.
        let previous = if at_start { None } else { entries.last() };
        if previous.is_none_or(|prev| prev.end_newlines.is_empty()) {
            entry.start_newlines.push("\n".to_string());
        }

        if at_start {
            entries.insert(0, entry);
        } else {
            entries.push(entry);
        }
    })
    .map(|_| id)
}

/// Adds a block, placed next to same-named sibling blocks when any
/// exist: before the first one's comment run, or after the last one.
/// Otherwise the requested start or end position is honored.
pub(crate) fn add_block(
    config: &mut Config,
    container: &ContainerRef,
    name: &str,
    parameters: Vec<String>,
    at_start: bool,
) -> Option<NodeId> {
    let mut block = RawBlock::new(name, parameters);
    block.content = Some(BlockContent::default());
    let id = block.id();

    with_container(config, container, move |target| {
        let entries = target.entries_mut();

        let similar: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.as_block().is_some_and(|b| b.name == block.name))
            .map(|(index, _)| index)
            .collect();

        let mut insert_at = None;

        if let (Some(&first), Some(&last)) = (similar.first(), similar.last()) {
            if at_start {
                let mut index = first;

                for i in (0..first).rev() {
                    if entries[i].as_comment().is_none() {
                        break;
                    }
                    index = i;
                }

                insert_at = Some(index);
            } else if last + 1 < entries.len() {
                insert_at = Some(last + 1);
            }
        } else if at_start {
            insert_at = Some(0);
        }

        let mut entry = Entry::new(EntryKind::Block(block));
        entry.end_newlines.push("\n\n".to_string());

        match insert_at {
            Some(0) => {
                entry.start_newlines.push("\n".to_string());
                entries.insert(0, entry);
            }
            Some(index) => entries.insert(index, entry),
            None => entries.push(entry),
        }
    })
    .map(|_| id)
}

pub(crate) fn delete_directive(config: &mut Config, container: &ContainerRef, id: NodeId) {
    delete_matching(config, container, |entry| {
        entry.as_directive().is_some_and(|d| d.id() == id)
    });
}

pub(crate) fn delete_directives_by_name(config: &mut Config, container: &ContainerRef, name: &str) {
    delete_matching(config, container, |entry| {
        entry.as_directive().is_some_and(|d| d.name == name)
    });
}

pub(crate) fn delete_block(config: &mut Config, container: &ContainerRef, id: NodeId) {
    delete_matching(config, container, |entry| {
        entry.as_block().is_some_and(|b| b.id() == id)
    });
}

pub(crate) fn delete_blocks_by_name(config: &mut Config, container: &ContainerRef, name: &str) {
    delete_matching(config, container, |entry| {
        entry.as_block().is_some_and(|b| b.name == name)
    });
}

/// Removes every matching direct child of the container, each
/// together with its contiguous preceding comment run and its inline
/// comment.
fn delete_matching(
    config: &mut Config,
    container: &ContainerRef,
    matches: impl Fn(&Entry) -> bool,
) {
    with_container(config, container, move |target| {
        let entries = target.entries_mut();
        let mut doomed = HashSet::new();

        for index in 0..entries.len() {
            if matches(&entries[index]) {
                doomed.insert(index);
                attached_comment_indexes(entries, index, &mut doomed);
            }
        }

        if doomed.is_empty() {
            return;
        }

        let mut index = 0;
        entries.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
    });
}

/// Indexes of the comments attached to the entry at `index`: the
/// contiguous run of comments directly above it, and the comment on
/// its line with zero newlines on both sides of the gap.
fn attached_comment_indexes(entries: &[Entry], index: usize, doomed: &mut HashSet<usize>) {
    for i in (0..index).rev() {
        if entries[i].as_comment().is_none() {
            break;
        }
        doomed.insert(i);
    }

    if let Some(next) = entries.get(index + 1) {
        if next.as_comment().is_some()
            && entries[index].end_newlines.is_empty()
            && next.start_newlines.is_empty()
        {
            doomed.insert(index + 1);
        }
    }
}

pub(crate) fn set_directive_values(
    config: &mut Config,
    container: &ContainerRef,
    id: NodeId,
    expressions: Vec<String>,
) -> bool {
    with_container(config, container, move |target| {
        let directive = target.entries_mut().iter_mut().find_map(|entry| {
            match &mut entry.kind {
                EntryKind::Directive(directive) if directive.id() == id => Some(directive),
                _ => None,
            }
        });

        match directive {
            Some(directive) => {
                directive.set_values(expressions);
                true
            }
            None => false,
        }
    })
    .unwrap_or(false)
}

pub(crate) fn set_block_parameters(
    config: &mut Config,
    container: &ContainerRef,
    id: NodeId,
    expressions: Vec<String>,
) -> bool {
    with_container(config, container, move |target| {
        let block = target
            .entries_mut()
            .iter_mut()
            .find_map(|entry| match &mut entry.kind {
                EntryKind::Block(block) if block.id() == id => Some(block),
                _ => None,
            });

        match block {
            Some(block) => {
                block.set_parameters(expressions);
                true
            }
            None => false,
        }
    })
    .unwrap_or(false)
}

/// Replaces the contiguous "Before" comment run directly above the
/// entry with the given identity, one comment line per element.
pub(crate) fn set_comments(
    config: &mut Config,
    container: &ContainerRef,
    id: NodeId,
    comments: Vec<String>,
) -> bool {
    with_container(config, container, move |target| {
        let entries = target.entries_mut();

        let Some(position) = entries.iter().position(|entry| entry_id(entry) == Some(id)) else {
            return false;
        };

        let mut index = position;

        while index > 0 && entries[index - 1].as_comment().is_some() {
            entries.remove(index - 1);
            index -= 1;
        }

        for text in comments {
            let comment = RawComment::new(format!("# {text}\n"));
            entries.insert(index, Entry::new(EntryKind::Comment(comment)));
            index += 1;
        }

        true
    })
    .unwrap_or(false)
}

fn entry_id(entry: &Entry) -> Option<NodeId> {
    match &entry.kind {
        EntryKind::Directive(directive) => Some(directive.id()),
        EntryKind::Block(block) => Some(block.id()),
        EntryKind::Comment(_) => None,
    }
}
