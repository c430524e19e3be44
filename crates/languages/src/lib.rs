#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Language support: tree-sitter parsing, AST construction, and
//! per-language reference resolution.

pub mod adapter;
pub mod parser;
pub mod queries;
pub mod resolvers;

pub use adapter::{build_ast, build_ast_from_tree};
pub use resolvers::{LanguageResolver, ResolverRegistry};
