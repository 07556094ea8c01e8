//! Query-result wrapper for a found directive.

use crate::comment::Comment;
use crate::config::Config;
use crate::container::ContainerRef;
use crate::edit;
use ngxconf_syntax::NodeId;

/// A directive found by a query.
///
/// The wrapper is an owned snapshot of what the directive looked like
/// when it was found, plus the identity needed to edit it in place
/// later. Mutating methods apply the change to the tree first and
/// update the snapshot only when the target was still there.
#[derive(Debug, Clone)]
pub struct Directive {
    pub(crate) id: NodeId,
    pub(crate) container: ContainerRef,
    pub(crate) name: String,
    pub(crate) values: Vec<String>,
    pub(crate) comments: Vec<Comment>,
}

impl Directive {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value expressions in order, quotes included when quoted.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Comments attached when the directive was found: the "Before"
    /// run in order, then the "Inline" comment when present.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The container holding this directive.
    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    /// Replaces all values. A no-op when the directive has since been
    /// deleted.
    pub fn set_values(&mut self, config: &mut Config, expressions: Vec<String>) {
        if edit::set_directive_values(config, &self.container, self.id, expressions.clone()) {
            self.values = expressions;
        }
    }

    /// Replaces all values with a single one.
    pub fn set_value(&mut self, config: &mut Config, expression: impl Into<String>) {
        self.set_values(config, vec![expression.into()]);
    }

    /// Appends one value after the existing ones.
    pub fn add_value(&mut self, config: &mut Config, expression: impl Into<String>) {
        let mut expressions = self.values.clone();
        expressions.push(expression.into());
        self.set_values(config, expressions);
    }

    /// Replaces the "Before" comment run in front of this directive,
    /// one comment line per element.
    pub fn set_comments(&self, config: &mut Config, comments: Vec<String>) {
        edit::set_comments(config, &self.container, self.id, comments);
    }
}
