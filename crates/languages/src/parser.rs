//! The tree-sitter collaborator shim.
//!
//! This module is the only surface that touches grammar handles and parser
//! construction; everything else consumes the produced concrete trees.

use scopegraph_core::error::{Error, Result};
use scopegraph_core::language::Language;

/// Grammar handle for a language.
pub fn grammar(language: Language) -> Result<tree_sitter::Language> {
    match language {
        Language::C => Ok(tree_sitter_c::LANGUAGE.into()),
        Language::Cpp => Ok(tree_sitter_cpp::LANGUAGE.into()),
        Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
        Language::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
        Language::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Language::Unknown => Err(Error::unknown_language("no grammar available")),
    }
}

/// Construct a parser configured for the language.
pub fn parser(language: Language) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar(language)?)
        .map_err(|e| Error::config(format!("grammar rejected for {language}: {e}")))?;
    Ok(parser)
}

/// Parse a source buffer into a concrete tree.
///
/// `origin` names the buffer in error messages (usually the file path).
///
/// # Errors
/// `Parse` when the parser yields no tree or the root itself is an error
/// node; error nodes inside an otherwise-parsed tree are tolerated.
pub fn parse(language: Language, source: &str, origin: &str) -> Result<tree_sitter::Tree> {
    let tree = parser(language)?
        .parse(source, None)
        .ok_or_else(|| Error::parse(origin, "parser produced no tree"))?;
    if tree.root_node().is_error() {
        return Err(Error::parse(origin, "unparseable input"));
    }
    Ok(tree)
}
