//! File-set manager: owns the path-to-tree map, resolves includes
//! recursively at load time, and writes modified trees back.

use crate::block::Block;
use crate::config_file::ConfigFile;
use crate::container::ContainerRef;
use crate::directive::Directive;
use crate::error::{Error, Result};
use crate::find::Finder;
use crate::typed::{
    self, HttpBlock, LocationBlock, ServerBlock, UpstreamBlock,
};
use ngxconf_syntax::{Entry, EntryContainer, Tree};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "nginx.conf";
const INCLUDE: &str = "include";
const HTTP: &str = "http";
const SERVER: &str = "server";

/// A loaded nginx configuration file set.
///
/// Loading parses the root file and eagerly follows every reachable
/// `include` directive, so all queries afterwards run purely in
/// memory. Files are kept in lexical path order, which is also the
/// cross-file order of query results.
#[derive(Debug)]
pub struct Config {
    pub(crate) files: BTreeMap<PathBuf, Tree>,
    pub(crate) server_root: PathBuf,
    config_root: PathBuf,
    quiet: bool,
}

impl Config {
    /// Loads the configuration rooted at `server_root`.
    ///
    /// The config file defaults to `<server_root>/nginx.conf`. In
    /// quiet mode a missing or unreadable include target is skipped
    /// instead of failing the load; the root file itself must always
    /// exist.
    pub fn load(
        server_root: impl AsRef<Path>,
        config_file: Option<&Path>,
        quiet: bool,
    ) -> Result<Config> {
        let server_root = std::path::absolute(server_root.as_ref())?;

        let config_root = match config_file {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => server_root.join(path),
            None => server_root.join(DEFAULT_CONFIG_FILE),
        };

        if !config_root.is_file() {
            return Err(Error::MissingFile(config_root));
        }

        let mut config = Config {
            files: BTreeMap::new(),
            server_root,
            config_root: config_root.clone(),
            quiet,
        };

        config.parse_recursively(&config_root, false)?;
        debug!(files = config.files.len(), "configuration loaded");

        Ok(config)
    }

    /// The server root all relative include patterns resolve against.
    pub fn server_root(&self) -> &Path {
        &self.server_root
    }

    /// The root config file the load started from.
    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    /// Absolute paths of every loaded file, in lexical order.
    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Re-parses a file from disk, overriding any loaded copy, and
    /// follows the includes it declares.
    pub fn parse_file(&mut self, file_path: impl AsRef<Path>) -> Result<()> {
        self.parse_recursively(file_path.as_ref(), true)
    }

    /// Registers a new empty config file and returns its handle. The
    /// file is created on disk by the next dump. Registering an
    /// already-loaded path returns a handle to the loaded file.
    pub fn add_config_file(&mut self, file_path: impl AsRef<Path>) -> ConfigFile {
        let path = self.abs_path(file_path.as_ref());

        self.files.entry(path.clone()).or_default();

        ConfigFile::new(path)
    }

    /// Handle to a loaded file, matched by file name.
    pub fn get_config_file(&self, file_name: &str) -> Option<ConfigFile> {
        self.files
            .keys()
            .find(|path| path.file_name().is_some_and(|name| name == file_name))
            .map(|path| ConfigFile::new(path.clone()))
    }

    /// Finds directives by name across every loaded file, in document
    /// order, expanding includes depth-first. A file contributes at
    /// most once per query even when it is reachable both directly
    /// and through an include.
    pub fn find_directives(&self, name: &str) -> Vec<Directive> {
        let mut finder = Finder::new(self);
        let mut found = Vec::new();

        for (path, tree) in &self.files {
            if !finder.visit(path) {
                continue;
            }

            found.extend(finder.find_directives(
                &ContainerRef::File(path.clone()),
                &tree.entries,
                name,
            ));
        }

        found
    }

    /// Finds blocks by name across every loaded file.
    pub fn find_blocks(&self, name: &str) -> Vec<Block> {
        let mut finder = Finder::new(self);
        let mut found = Vec::new();

        for (path, tree) in &self.files {
            if !finder.visit(path) {
                continue;
            }

            found.extend(finder.find_blocks(
                &ContainerRef::File(path.clone()),
                &tree.entries,
                name,
            ));
        }

        found
    }

    pub fn find_http_blocks(&self) -> Vec<HttpBlock> {
        typed::wrap(self.find_blocks(typed::HTTP))
    }

    pub fn find_server_blocks(&self) -> Vec<ServerBlock> {
        typed::wrap(self.find_blocks(typed::SERVER))
    }

    pub fn find_server_blocks_by_server_name(&self, server_name: &str) -> Vec<ServerBlock> {
        typed::filter_by_server_name(self, self.find_server_blocks(), server_name)
    }

    pub fn find_location_blocks(&self) -> Vec<LocationBlock> {
        typed::wrap(self.find_blocks(typed::LOCATION))
    }

    pub fn find_upstream_blocks(&self) -> Vec<UpstreamBlock> {
        typed::wrap(self.find_blocks(typed::UPSTREAM))
    }

    pub fn find_upstream_blocks_by_name(&self, upstream_name: &str) -> Vec<UpstreamBlock> {
        typed::filter_by_upstream_name(self.find_upstream_blocks(), upstream_name)
    }

    /// Writes every loaded tree back over its file. Files are written
    /// independently; there is no cross-file transaction.
    pub fn dump(&self) -> Result<()> {
        for (path, tree) in &self.files {
            fs::write(path, ngxconf_syntax::dump(tree))?;
            debug!(path = %path.display(), "wrote config file");
        }

        Ok(())
    }

    pub(crate) fn abs_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.server_root.join(path)
        }
    }

    fn parse_recursively(&mut self, file_path: &Path, override_loaded: bool) -> Result<()> {
        let pattern = self.abs_path(file_path);
        let parsed = self.parse_files_by_path(&pattern, override_loaded)?;

        for path in parsed {
            for include in self.include_patterns(&path)? {
                self.parse_recursively(Path::new(&include), false)?;
            }
        }

        Ok(())
    }

    /// Reads and parses every file the pattern denotes, skipping
    /// already-loaded paths. Returns the newly parsed paths.
    fn parse_files_by_path(
        &mut self,
        pattern: &Path,
        override_loaded: bool,
    ) -> Result<Vec<PathBuf>> {
        let pattern_text = pattern.to_string_lossy();

        let candidates: Vec<PathBuf> = if pattern_text.contains(['*', '?', '[']) {
            let paths = glob::glob(&pattern_text).map_err(|source| Error::Pattern {
                pattern: pattern_text.into_owned(),
                source,
            })?;

            let mut files = Vec::new();

            for path in paths {
                match path {
                    Ok(path) => files.push(path),
                    Err(error) if self.quiet => {
                        debug!(%error, "skipping unreadable include match");
                    }
                    Err(error) => return Err(Error::Io(error.into_error())),
                }
            }

            files
        } else if pattern.is_file() {
            vec![pattern.to_path_buf()]
        } else if self.quiet {
            debug!(path = %pattern.display(), "skipping missing include target");
            Vec::new()
        } else {
            return Err(Error::MissingFile(pattern.to_path_buf()));
        };

        let mut parsed = Vec::new();

        for file in candidates {
            if !file.is_file() {
                continue;
            }

            if self.files.contains_key(&file) && !override_loaded {
                continue;
            }

            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(error) if self.quiet => {
                    debug!(path = %file.display(), %error, "skipping unreadable file");
                    continue;
                }
                Err(error) => return Err(Error::Io(error)),
            };

            let tree = ngxconf_syntax::parse(&content).map_err(|source| Error::Syntax {
                path: file.clone(),
                source,
            })?;

            debug!(path = %file.display(), entries = tree.entries.len(), "parsed config file");
            self.files.insert(file.clone(), tree);
            parsed.push(file);
        }

        Ok(parsed)
    }

    /// Include patterns declared by a loaded file, in source order:
    /// at the file top level, inside top-level `http`/`server`
    /// blocks, and inside `server` blocks nested in a top-level
    /// `http` block. Identifiers are compared case-insensitively only
    /// for this classification.
    fn include_patterns(&self, path: &Path) -> Result<Vec<String>> {
        let Some(tree) = self.files.get(path) else {
            return Ok(Vec::new());
        };

        let mut patterns = Vec::new();

        for entry in &tree.entries {
            let Some(identifier) = classify(entry) else {
                continue;
            };

            if identifier == INCLUDE {
                push_include(entry, &mut patterns)?;
                continue;
            }

            if identifier != HTTP && identifier != SERVER {
                continue;
            }

            let Some(block) = entry.as_block() else {
                continue;
            };

            for sub_entry in block.entries() {
                let Some(sub_identifier) = classify(sub_entry) else {
                    continue;
                };

                if sub_identifier == INCLUDE {
                    push_include(sub_entry, &mut patterns)?;
                    continue;
                }

                if identifier == HTTP && sub_identifier == SERVER {
                    let Some(server) = sub_entry.as_block() else {
                        continue;
                    };

                    for server_entry in server.entries() {
                        if classify(server_entry).as_deref() == Some(INCLUDE) {
                            push_include(server_entry, &mut patterns)?;
                        }
                    }
                }
            }
        }

        Ok(patterns)
    }

    /// Test fixture: a config built from in-memory sources, rooted at
    /// `/etc/nginx`.
    #[cfg(test)]
    pub(crate) fn from_sources(sources: &[(&str, &str)]) -> Config {
        let mut files = BTreeMap::new();

        for (path, source) in sources {
            files.insert(
                PathBuf::from(path),
                ngxconf_syntax::parse(source).expect("fixture source must parse"),
            );
        }

        Config {
            files,
            server_root: PathBuf::from("/etc/nginx"),
            config_root: PathBuf::from("/etc/nginx/nginx.conf"),
            quiet: false,
        }
    }
}

fn classify(entry: &Entry) -> Option<String> {
    entry.identifier().map(str::to_ascii_lowercase)
}

fn push_include(entry: &Entry, patterns: &mut Vec<String>) -> Result<()> {
    let Some(directive) = entry.as_directive() else {
        return Err(Error::InvalidDirective(
            entry.identifier().unwrap_or_default().to_string(),
        ));
    };

    if let Some(value) = directive.values.first() {
        let pattern = value.unquoted();

        if !pattern.is_empty() {
            patterns.push(pattern.to_string());
        }
    }

    Ok(())
}
