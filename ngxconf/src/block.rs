//! Query-result wrapper for a found block.

use crate::comment::Comment;
use crate::config::Config;
use crate::container::{self, ContainerRef};
use crate::directive::Directive;
use crate::edit;
use crate::find::Finder;
use ngxconf_syntax::NodeId;

/// A block found by a query.
///
/// Like [`Directive`], the wrapper owns a snapshot of the block head
/// plus the identity of the underlying node. The block's own body is
/// addressed as a [`ContainerRef::Block`], so finds and edits scoped
/// to this block go through the same machinery as file-scoped ones.
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) id: NodeId,
    pub(crate) container: ContainerRef,
    pub(crate) name: String,
    pub(crate) parameters: Vec<String>,
    pub(crate) comments: Vec<Comment>,
}

impl Block {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw parameter expressions in order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Comments attached when the block was found: the "Before" run
    /// in order, then the "Inline" comment when present.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The container holding this block.
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    /// Handle to this block's body, usable as a find or edit target.
    pub fn body(&self) -> ContainerRef {
        ContainerRef::Block(self.id)
    }

    /// Finds directives by name inside this block, in document order,
    /// recursing into nested blocks and include-resolved files.
    pub fn find_directives(&self, config: &Config, name: &str) -> Vec<Directive> {
        let Some(entries) = container::container_entries(config, &self.body()) else {
            return Vec::new();
        };

        let body = self.body();
        Finder::scoped(config, &body).find_directives(&body, entries, name)
    }

    /// Finds blocks by name inside this block.
    pub fn find_blocks(&self, config: &Config, name: &str) -> Vec<Block> {
        let Some(entries) = container::container_entries(config, &self.body()) else {
            return Vec::new();
        };

        let body = self.body();
        Finder::scoped(config, &body).find_blocks(&body, entries, name)
    }

    /// Adds a directive to this block's body. Returns a wrapper for
    /// the new directive, or `None` when the block has since been
    /// deleted.
    pub fn add_directive(
        &self,
        config: &mut Config,
        name: &str,
        values: Vec<String>,
        at_start: bool,
    ) -> Option<Directive> {
        let id = edit::add_directive(config, &self.body(), name, values.clone(), at_start)?;

        Some(Directive {
            id,
            container: self.body(),
            name: name.to_string(),
            values,
            comments: Vec::new(),
        })
    }

    /// Deletes one directive, located by identity, together with its
    /// attached comments. A stale wrapper is a no-op.
    pub fn delete_directive(&self, config: &mut Config, directive: &Directive) {
        edit::delete_directive(config, &self.body(), directive.id());
    }

    /// Deletes every direct child directive with the given name.
    pub fn delete_directives_by_name(&self, config: &mut Config, name: &str) {
        edit::delete_directives_by_name(config, &self.body(), name);
    }

    /// Adds a nested block, placed next to same-named sibling blocks
    /// when any exist.
    pub fn add_block(
        &self,
        config: &mut Config,
        name: &str,
        parameters: Vec<String>,
        at_start: bool,
    ) -> Option<Block> {
        let id = edit::add_block(config, &self.body(), name, parameters.clone(), at_start)?;

        Some(Block {
            id,
            container: self.body(),
            name: name.to_string(),
            parameters,
            comments: Vec::new(),
        })
    }

    /// Deletes one nested block, located by identity.
    pub fn delete_block(&self, config: &mut Config, block: &Block) {
        edit::delete_block(config, &self.body(), block.id());
    }

    /// Deletes every direct child block with the given name.
    pub fn delete_blocks_by_name(&self, config: &mut Config, name: &str) {
        edit::delete_blocks_by_name(config, &self.body(), name);
    }

    /// Replaces the block's parameters. A no-op when the block has
    /// since been deleted.
    pub fn set_parameters(&mut self, config: &mut Config, expressions: Vec<String>) {
        if edit::set_block_parameters(config, &self.container, self.id, expressions.clone()) {
            self.parameters = expressions;
        }
    }

    /// Replaces the "Before" comment run in front of this block, one
    /// comment line per element.
    pub fn set_comments(&self, config: &mut Config, comments: Vec<String>) {
        edit::set_comments(config, &self.container, self.id, comments);
    }
}
