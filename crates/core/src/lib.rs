#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod ast;
pub mod config;
pub mod error;
pub mod language;
pub mod resolution;
pub mod symbols;

pub use ast::{Ast, AstNode, AstSet, FileId, NodeHandle, NodeId, NodeKind, SourceSpan};
pub use config::{LogLevel, ProjectConfig};
pub use error::{Error, ErrorKind, RecordedError, Result};
pub use language::Language;
pub use resolution::{RefKind, Resolution, ResolutionStats, ResolutionStatus};
pub use symbols::{SymbolEntry, SymbolIndex, SymbolScope};
