//! Per-file handle into a loaded configuration.

use crate::block::Block;
use crate::config::Config;
use crate::container::{self, ContainerRef};
use crate::directive::Directive;
use crate::edit;
use crate::error::{Error, Result};
use crate::find::Finder;
use crate::typed::{self, HttpBlock, ServerBlock, UpstreamBlock};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle to one loaded file.
///
/// Like the query wrappers, the handle carries no tree memory of its
/// own; every operation resolves the path against the [`Config`] it
/// is given.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn as_container(&self) -> ContainerRef {
        ContainerRef::File(self.path.clone())
    }

    /// Finds directives by name within this file, recursing into
    /// nested blocks and include-resolved files.
    pub fn find_directives(&self, config: &Config, name: &str) -> Vec<Directive> {
        let Some(entries) = container::container_entries(config, &self.as_container()) else {
            return Vec::new();
        };

        let container = self.as_container();
        Finder::scoped(config, &container).find_directives(&container, entries, name)
    }

    /// Finds blocks by name within this file.
    pub fn find_blocks(&self, config: &Config, name: &str) -> Vec<Block> {
        let Some(entries) = container::container_entries(config, &self.as_container()) else {
            return Vec::new();
        };

        let container = self.as_container();
        Finder::scoped(config, &container).find_blocks(&container, entries, name)
    }

    pub fn find_http_blocks(&self, config: &Config) -> Vec<HttpBlock> {
        typed::wrap(self.find_blocks(config, typed::HTTP))
    }

    pub fn find_server_blocks(&self, config: &Config) -> Vec<ServerBlock> {
        typed::wrap(self.find_blocks(config, typed::SERVER))
    }

    pub fn find_server_blocks_by_server_name(
        &self,
        config: &Config,
        server_name: &str,
    ) -> Vec<ServerBlock> {
        typed::filter_by_server_name(config, self.find_server_blocks(config), server_name)
    }

    pub fn find_upstream_blocks(&self, config: &Config) -> Vec<UpstreamBlock> {
        typed::wrap(self.find_blocks(config, typed::UPSTREAM))
    }

    pub fn find_upstream_blocks_by_name(
        &self,
        config: &Config,
        upstream_name: &str,
    ) -> Vec<UpstreamBlock> {
        typed::filter_by_upstream_name(self.find_upstream_blocks(config), upstream_name)
    }

    /// Adds a directive at the start or end of this file.
    pub fn add_directive(
        &self,
        config: &mut Config,
        name: &str,
        values: Vec<String>,
        at_start: bool,
    ) -> Option<Directive> {
        let id = edit::add_directive(config, &self.as_container(), name, values.clone(), at_start)?;

        Some(Directive {
            id,
            container: self.as_container(),
            name: name.to_string(),
            values,
            comments: Vec::new(),
        })
    }

    /// Deletes one top-level directive, located by identity.
    pub fn delete_directive(&self, config: &mut Config, directive: &Directive) {
        edit::delete_directive(config, &self.as_container(), directive.id());
    }

    /// Deletes every top-level directive with the given name.
    pub fn delete_directives_by_name(&self, config: &mut Config, name: &str) {
        edit::delete_directives_by_name(config, &self.as_container(), name);
    }

    /// Adds a block at this file's top level.
    pub fn add_block(
        &self,
        config: &mut Config,
        name: &str,
        parameters: Vec<String>,
        at_start: bool,
    ) -> Option<Block> {
        let id = edit::add_block(config, &self.as_container(), name, parameters.clone(), at_start)?;

        Some(Block {
            id,
            container: self.as_container(),
            name: name.to_string(),
            parameters,
            comments: Vec::new(),
        })
    }

    pub fn add_http_block(&self, config: &mut Config) -> Option<HttpBlock> {
        self.add_block(config, typed::HTTP, Vec::new(), false)
            .map(HttpBlock::from)
    }

    /// Deletes one top-level block, located by identity.
    pub fn delete_block(&self, config: &mut Config, block: &Block) {
        edit::delete_block(config, &self.as_container(), block.id());
    }

    /// Deletes every top-level block with the given name.
    pub fn delete_blocks_by_name(&self, config: &mut Config, name: &str) {
        edit::delete_blocks_by_name(config, &self.as_container(), name);
    }

    /// Writes this file's tree back over the file.
    pub fn dump(&self, config: &Config) -> Result<()> {
        let tree = config
            .files
            .get(&self.path)
            .ok_or_else(|| Error::MissingFile(self.path.clone()))?;

        fs::write(&self.path, ngxconf_syntax::dump(tree))?;
        debug!(path = %self.path.display(), "wrote config file");

        Ok(())
    }
}
