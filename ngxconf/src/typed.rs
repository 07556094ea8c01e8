//! Typed accessors for common block kinds, built purely on the
//! generic find and mutation API.

use crate::block::Block;
use crate::config::Config;
use crate::directive::Directive;
use std::ops::{Deref, DerefMut};

pub(crate) const HTTP: &str = "http";
pub(crate) const SERVER: &str = "server";
pub(crate) const LOCATION: &str = "location";
pub(crate) const UPSTREAM: &str = "upstream";

pub(crate) fn wrap<T: From<Block>>(blocks: Vec<Block>) -> Vec<T> {
    blocks.into_iter().map(T::from).collect()
}

pub(crate) fn filter_by_server_name(
    config: &Config,
    blocks: Vec<ServerBlock>,
    server_name: &str,
) -> Vec<ServerBlock> {
    blocks
        .into_iter()
        .filter(|block| {
            block
                .server_names(config)
                .iter()
                .any(|name| name == server_name)
        })
        .collect()
}

pub(crate) fn filter_by_upstream_name(
    blocks: Vec<UpstreamBlock>,
    upstream_name: &str,
) -> Vec<UpstreamBlock> {
    blocks
        .into_iter()
        .filter(|block| block.upstream_name() == Some(upstream_name))
        .collect()
}

macro_rules! block_wrapper {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            block: Block,
        }

        impl From<Block> for $name {
            fn from(block: Block) -> Self {
                Self { block }
            }
        }

        impl Deref for $name {
            type Target = Block;

            fn deref(&self) -> &Block {
                &self.block
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Block {
                &mut self.block
            }
        }
    };
}

block_wrapper! {
    /// An `http` block.
    HttpBlock
}

block_wrapper! {
    /// A `server` block.
    ServerBlock
}

block_wrapper! {
    /// A `location` block.
    LocationBlock
}

block_wrapper! {
    /// An `upstream` block.
    UpstreamBlock
}

impl HttpBlock {
    pub fn find_server_blocks(&self, config: &Config) -> Vec<ServerBlock> {
        wrap(self.find_blocks(config, SERVER))
    }

    pub fn find_server_blocks_by_server_name(
        &self,
        config: &Config,
        server_name: &str,
    ) -> Vec<ServerBlock> {
        filter_by_server_name(config, self.find_server_blocks(config), server_name)
    }

    pub fn find_location_blocks(&self, config: &Config) -> Vec<LocationBlock> {
        wrap(self.find_blocks(config, LOCATION))
    }

    pub fn find_upstream_blocks(&self, config: &Config) -> Vec<UpstreamBlock> {
        wrap(self.find_blocks(config, UPSTREAM))
    }

    pub fn find_upstream_blocks_by_name(
        &self,
        config: &Config,
        upstream_name: &str,
    ) -> Vec<UpstreamBlock> {
        filter_by_upstream_name(self.find_upstream_blocks(config), upstream_name)
    }

    pub fn add_server_block(&self, config: &mut Config) -> Option<ServerBlock> {
        self.add_block(config, SERVER, Vec::new(), false)
            .map(ServerBlock::from)
    }

    pub fn add_upstream_block(
        &self,
        config: &mut Config,
        upstream_name: &str,
    ) -> Option<UpstreamBlock> {
        self.add_block(config, UPSTREAM, vec![upstream_name.to_string()], false)
            .map(UpstreamBlock::from)
    }

    pub fn delete_server_block(&self, config: &mut Config, server_block: &ServerBlock) {
        self.delete_block(config, server_block);
    }

    pub fn delete_upstream_block(&self, config: &mut Config, upstream_block: &UpstreamBlock) {
        self.delete_block(config, upstream_block);
    }
}

impl ServerBlock {
    /// Values of the first `server_name` directive, whitespace
    /// trimmed.
    pub fn server_names(&self, config: &Config) -> Vec<String> {
        self.find_directives(config, "server_name")
            .first()
            .map(|directive| {
                directive
                    .values()
                    .iter()
                    .map(|value| value.trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First value of the first `root` directive.
    pub fn document_root(&self, config: &Config) -> Option<String> {
        self.find_directives(config, "root")
            .first()
            .and_then(|directive| directive.first_value().map(str::to_string))
    }

    pub fn find_location_blocks(&self, config: &Config) -> Vec<LocationBlock> {
        wrap(self.find_blocks(config, LOCATION))
    }

    pub fn add_location_block(
        &self,
        config: &mut Config,
        modifier: &str,
        location_match: &str,
        at_start: bool,
    ) -> Option<LocationBlock> {
        let mut parameters = Vec::new();

        if !modifier.is_empty() {
            parameters.push(modifier.to_string());
        }

        if !location_match.is_empty() {
            parameters.push(location_match.to_string());
        }

        self.add_block(config, LOCATION, parameters, at_start)
            .map(LocationBlock::from)
    }
}

impl LocationBlock {
    /// The location modifier (`=`, `~`, `~*`, `^~`), when one is
    /// present.
    pub fn modifier(&self) -> Option<&str> {
        let parameters = self.parameters();

        if parameters.len() > 1 {
            parameters.first().map(String::as_str)
        } else {
            None
        }
    }

    pub fn set_modifier(&mut self, config: &mut Config, modifier: &str) {
        let mut parameters = self.parameters().to_vec();

        if parameters.is_empty() {
            parameters.push(modifier.to_string());
        } else {
            parameters[0] = modifier.to_string();
        }

        self.set_parameters(config, parameters);
    }

    /// The location match expression.
    pub fn location_match(&self) -> Option<&str> {
        let parameters = self.parameters();

        match parameters.len() {
            0 => None,
            1 => parameters.first().map(String::as_str),
            _ => parameters.get(1).map(String::as_str),
        }
    }

    pub fn set_location_match(&mut self, config: &mut Config, location_match: &str) {
        let mut parameters = self.parameters().to_vec();

        match parameters.len() {
            0 => parameters.push(location_match.to_string()),
            1 => parameters[0] = location_match.to_string(),
            _ => parameters[1] = location_match.to_string(),
        }

        self.set_parameters(config, parameters);
    }
}

impl UpstreamBlock {
    /// The upstream's name, its first parameter.
    pub fn upstream_name(&self) -> Option<&str> {
        self.parameters().first().map(String::as_str)
    }

    /// The upstream's `server` directives.
    pub fn servers(&self, config: &Config) -> Vec<UpstreamServer> {
        self.find_directives(config, SERVER)
            .into_iter()
            .map(UpstreamServer::from)
            .collect()
    }

    /// Adds a `server` directive with the given address and flags.
    pub fn add_server(
        &self,
        config: &mut Config,
        address: &str,
        flags: Vec<String>,
    ) -> Option<UpstreamServer> {
        let mut values = vec![address.to_string()];
        values.extend(flags);

        self.add_directive(config, SERVER, values, false)
            .map(UpstreamServer::from)
    }
}

/// A `server` directive inside an `upstream` block: an address
/// followed by optional flags.
#[derive(Debug, Clone)]
pub struct UpstreamServer {
    directive: Directive,
}

impl From<Directive> for UpstreamServer {
    fn from(directive: Directive) -> Self {
        Self { directive }
    }
}

impl Deref for UpstreamServer {
    type Target = Directive;

    fn deref(&self) -> &Directive {
        &self.directive
    }
}

impl DerefMut for UpstreamServer {
    fn deref_mut(&mut self) -> &mut Directive {
        &mut self.directive
    }
}

impl UpstreamServer {
    pub fn address(&self) -> Option<&str> {
        self.first_value()
    }

    pub fn flags(&self) -> &[String] {
        self.values().get(1..).unwrap_or_default()
    }

    pub fn set_address(&mut self, config: &mut Config, address: &str) {
        let mut values = self.values().to_vec();

        if values.is_empty() {
            values.push(address.to_string());
        } else {
            values[0] = address.to_string();
        }

        self.directive.set_values(config, values);
    }

    /// Replaces the flags, keeping the address.
    pub fn set_flags(&mut self, config: &mut Config, flags: Vec<String>) {
        let mut values: Vec<String> = self.values().iter().take(1).cloned().collect();
        values.extend(flags);

        self.directive.set_values(config, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Config {
        Config::from_sources(&[(
            "/etc/nginx/nginx.conf",
            concat!(
                "http {\n",
                "    upstream backend {\n",
                "        server 127.0.0.1:8080 weight=5;\n",
                "        server 127.0.0.2:8080;\n",
                "    }\n",
                "    server {\n",
                "        server_name example.com www.example.com;\n",
                "        root /var/www/example;\n",
                "        location ~ /api {\n",
                "            proxy_pass http://backend;\n",
                "        }\n",
                "    }\n",
                "    server {\n",
                "        server_name other.example.com;\n",
                "        location / {\n",
                "            root /var/www/other;\n",
                "        }\n",
                "    }\n",
                "}\n",
            ),
        )])
    }

    #[test]
    fn test_server_block_accessors() {
        let config = fixture();

        let servers = config.find_server_blocks();
        assert_eq!(servers.len(), 2);
        assert_eq!(
            servers[0].server_names(&config),
            vec!["example.com", "www.example.com"]
        );
        assert_eq!(
            servers[0].document_root(&config),
            Some("/var/www/example".to_string())
        );
    }

    #[test]
    fn test_find_server_blocks_by_server_name() {
        let config = fixture();

        let matched = config.find_server_blocks_by_server_name("www.example.com");
        assert_eq!(matched.len(), 1);
        assert_eq!(
            matched[0].server_names(&config)[0],
            "example.com".to_string()
        );

        assert!(config.find_server_blocks_by_server_name("nope").is_empty());
    }

    #[test]
    fn test_location_block_accessors() {
        let config = fixture();

        let locations = config.find_location_blocks();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].modifier(), Some("~"));
        assert_eq!(locations[0].location_match(), Some("/api"));
        assert_eq!(locations[1].modifier(), None);
        assert_eq!(locations[1].location_match(), Some("/"));
    }

    #[test]
    fn test_set_location_match() {
        let config = &mut fixture();

        let mut location = config.find_location_blocks().remove(0);
        location.set_location_match(config, "/v2/api");

        let locations = config.find_location_blocks();
        assert_eq!(locations[0].location_match(), Some("/v2/api"));
        assert_eq!(locations[0].modifier(), Some("~"));
    }

    #[test]
    fn test_upstream_accessors() {
        let config = fixture();

        let upstreams = config.find_upstream_blocks_by_name("backend");
        assert_eq!(upstreams.len(), 1);

        let servers = upstreams[0].servers(&config);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].address(), Some("127.0.0.1:8080"));
        assert_eq!(servers[0].flags(), ["weight=5".to_string()]);
        assert!(servers[1].flags().is_empty());
    }

    #[test]
    fn test_upstream_server_mutation() {
        let config = &mut fixture();

        let upstream = config.find_upstream_blocks().remove(0);
        let mut server = upstream.servers(config).remove(0);

        server.set_address(config, "10.0.0.1:9000");
        server.set_flags(config, vec!["backup".to_string()]);

        let servers = upstream.servers(config);
        assert_eq!(servers[0].address(), Some("10.0.0.1:9000"));
        assert_eq!(servers[0].flags(), ["backup".to_string()]);
    }

    #[test]
    fn test_http_block_add_and_delete_server() {
        let config = &mut fixture();

        let http = config.find_http_blocks().remove(0);
        let added = http.add_server_block(config).unwrap();
        added.add_directive(config, "listen", vec!["8080".to_string()], false);

        assert_eq!(http.find_server_blocks(config).len(), 3);

        http.delete_server_block(config, &added);
        assert_eq!(http.find_server_blocks(config).len(), 2);
    }
}
