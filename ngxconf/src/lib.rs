//! Editable in-memory model of an nginx configuration file set.
//!
//! [`Config::load`] parses a root file and eagerly follows every
//! reachable `include` directive. The loaded trees preserve all
//! formatting trivia, so dumping an unmodified configuration
//! reproduces the original bytes; edited trees dump to well-formed,
//! idiomatically indented text.
//!
//! Queries return owned wrappers ([`Directive`], [`Block`]) that
//! carry nearby comments and the identity needed to edit the
//! underlying node in place later.
//!
//! # Example
//!
//! ```no_run
//! use ngxconf::Config;
//!
//! # fn main() -> ngxconf::Result<()> {
//! let mut config = Config::load("/etc/nginx", None, false)?;
//!
//! for server in config.find_server_blocks() {
//!     println!("{:?}", server.server_names(&config));
//! }
//!
//! if let Some(mut listen) = config.find_directives("listen").pop() {
//!     listen.set_value(&mut config, "8080");
//! }
//!
//! config.dump()?;
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod comment;
pub mod config;
pub mod config_file;
mod container;
pub mod directive;
mod edit;
pub mod error;
mod find;
pub mod typed;

pub use block::Block;
pub use comment::{Comment, CommentPosition};
pub use config::Config;
pub use config_file::ConfigFile;
pub use container::ContainerRef;
pub use directive::Directive;
pub use error::{Error, Result};
pub use typed::{HttpBlock, LocationBlock, ServerBlock, UpstreamBlock, UpstreamServer};
