//! Lossless syntax layer for nginx-style configuration files.
//!
//! This crate turns configuration text into a trivia-preserving
//! syntax tree and back. Newline runs, comments, and value quoting
//! survive the round trip, so a tree that has not been modified dumps
//! back to its original text.
//!
//! # Example
//!
//! ```
//! let source = "server {\n    listen 80;\n}\n";
//! let tree = ngxconf_syntax::parse(source).unwrap();
//! assert_eq!(ngxconf_syntax::dump(&tree), source);
//! ```

pub mod dumper;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use dumper::{Dumper, dump};
pub use lexer::{LexError, Location, Spanned, Token, tokenize};
pub use parser::{ParseError, Parser, parse};
pub use tree::{
    Block, BlockContent, Comment, Directive, Entry, EntryContainer, EntryKind, NodeId, Quoting,
    Tree, Value,
};
