//! Reference-site query definitions.
//!
//! Tree-sitter queries as Rust constants with associated metadata. These
//! locate call sites after the declaration walk has shaped the AST; the
//! adapter attaches each match to its innermost enclosing node.

/// Definition of a tree-sitter query with associated metadata
#[derive(Debug, Clone, Copy)]
pub struct QueryDef {
    /// Query name (e.g., "c::calls")
    pub name: &'static str,
    /// Capture holding the whole reference site
    pub site_capture: &'static str,
    /// Capture holding the referenced name
    pub name_capture: &'static str,
    /// The tree-sitter query string
    pub query: &'static str,
}

/// C and C++ call sites (both grammars share these node kinds)
pub mod c {
    use super::QueryDef;

    pub const CALLS: QueryDef = QueryDef {
        name: "c::calls",
        site_capture: "call",
        name_capture: "callee",
        query: r#"
            (call_expression
              function: (_) @callee
              arguments: (argument_list) @args
            ) @call
        "#,
    };
}

/// Python call sites
pub mod python {
    use super::QueryDef;

    pub const CALLS: QueryDef = QueryDef {
        name: "python::calls",
        site_capture: "call",
        name_capture: "callee",
        query: r#"
            (call
              function: (_) @callee
              arguments: (argument_list) @args
            ) @call
        "#,
    };
}

/// JavaScript and TypeScript call sites
pub mod javascript {
    use super::QueryDef;

    pub const CALLS: QueryDef = QueryDef {
        name: "javascript::calls",
        site_capture: "call",
        name_capture: "callee",
        query: r#"
            (call_expression
              function: (_) @callee
              arguments: (arguments) @args
            ) @call
        "#,
    };
}
