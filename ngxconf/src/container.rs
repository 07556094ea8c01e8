//! Stable handles to entry containers.
//!
//! Query wrappers never borrow the tree they were found in. Instead
//! they carry a [`ContainerRef`] that is resolved against a `Config`
//! on every read or mutation, so a wrapper can outlive any number of
//! other edits. A handle whose target has since been deleted simply
//! resolves to nothing, which makes every mutation against it a
//! no-op.

use crate::config::Config;
use ngxconf_syntax::{Block as RawBlock, Entry, EntryContainer, EntryKind, NodeId};
use std::path::PathBuf;

/// Non-owning handle to a file root or a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    File(PathBuf),
    Block(NodeId),
}

/// Entries of the referenced container, or `None` when the handle is
/// stale.
pub(crate) fn container_entries<'a>(
    config: &'a Config,
    container: &ContainerRef,
) -> Option<&'a [Entry]> {
    match container {
        ContainerRef::File(path) => config.files.get(path).map(|tree| tree.entries.as_slice()),
        ContainerRef::Block(id) => {
            for tree in config.files.values() {
                if let Some(block) = block_by_id(&tree.entries, *id) {
                    return Some(block.entries());
                }
            }

            None
        }
    }
}

/// Runs an edit against the referenced container, then restores the
/// container boundary invariant. Returns `None` without touching
/// anything when the handle is stale.
pub(crate) fn with_container<R>(
    config: &mut Config,
    container: &ContainerRef,
    edit: impl FnOnce(&mut dyn EntryContainer) -> R,
) -> Option<R> {
    match container {
        ContainerRef::File(path) => {
            let tree = config.files.get_mut(path)?;
            let result = edit(tree);
            normalize(tree);
            Some(result)
        }
        ContainerRef::Block(id) => {
            for tree in config.files.values_mut() {
                if let Some(block) = block_by_id_mut(&mut tree.entries, *id) {
                    let result = edit(block);
                    normalize(block);
                    return Some(result);
                }
            }

            None
        }
    }
}

/// The single place the well-formedness invariant is enforced: after
/// any mutation the first entry of a container carries a leading
/// newline and the last entry carries a trailing one.
pub(crate) fn normalize(container: &mut dyn EntryContainer) {
    let entries = container.entries_mut();

    if let Some(first) = entries.first_mut() {
        if first.start_newlines.is_empty() {
            first.start_newlines.push("\n".to_string());
        }
    }

    if let Some(last) = entries.last_mut() {
        if last.end_newlines.is_empty() {
            last.end_newlines.push("\n".to_string());
        }
    }
}

/// The path of the file holding the referenced container, or `None`
/// when the handle is stale.
pub(crate) fn containing_file(config: &Config, container: &ContainerRef) -> Option<PathBuf> {
    match container {
        ContainerRef::File(path) => config.files.contains_key(path).then(|| path.clone()),
        ContainerRef::Block(id) => config
            .files
            .iter()
            .find(|(_, tree)| block_by_id(&tree.entries, *id).is_some())
            .map(|(path, _)| path.clone()),
    }
}

fn block_by_id(entries: &[Entry], id: NodeId) -> Option<&RawBlock> {
    for entry in entries {
        if let EntryKind::Block(block) = &entry.kind {
            if block.id() == id {
                return Some(block);
            }

            if let Some(found) = block_by_id(block.entries(), id) {
                return Some(found);
            }
        }
    }

    None
}

fn block_by_id_mut(entries: &mut [Entry], id: NodeId) -> Option<&mut RawBlock> {
    for entry in entries {
        if let EntryKind::Block(block) = &mut entry.kind {
            if block.id() == id {
                return Some(block);
            }

            if let Some(content) = &mut block.content {
                if let Some(found) = block_by_id_mut(&mut content.entries, id) {
                    return Some(found);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_resolve_file_container() {
        let config = Config::from_sources(&[("/etc/nginx/nginx.conf", "user nginx;\n")]);
        let container = ContainerRef::File("/etc/nginx/nginx.conf".into());

        let entries = container_entries(&config, &container).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_resolve_nested_block_container() {
        let config = Config::from_sources(&[(
            "/etc/nginx/nginx.conf",
            "http {\n    server {\n        listen 80;\n    }\n}\n",
        )]);

        let tree = config.files.values().next().unwrap();
        let http = tree.entries[0].as_block().unwrap();
        let server = http.entries()[0].as_block().unwrap();
        let container = ContainerRef::Block(server.id());

        let entries = container_entries(&config, &container).unwrap();
        assert_eq!(entries[0].as_directive().unwrap().name, "listen");
    }

    #[test]
    fn test_stale_handle_resolves_to_nothing() {
        let mut config = Config::from_sources(&[("/etc/nginx/nginx.conf", "user nginx;\n")]);
        let container = ContainerRef::File("/missing.conf".into());

        assert!(container_entries(&config, &container).is_none());
        assert!(with_container(&mut config, &container, |_| ()).is_none());
    }

    #[test]
    fn test_normalize_restores_boundary_newlines() {
        let mut config = Config::from_sources(&[("/etc/nginx/nginx.conf", "user nginx;")]);
        let container = ContainerRef::File("/etc/nginx/nginx.conf".into());

        with_container(&mut config, &container, |_| ()).unwrap();

        let tree = config.files.values().next().unwrap();
        assert_eq!(tree.entries[0].start_newlines, vec!["\n".to_string()]);
        assert_eq!(tree.entries[0].end_newlines, vec!["\n".to_string()]);
    }
}
