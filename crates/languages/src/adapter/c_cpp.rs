//! Shared declaration walk for the C family.
//!
//! C and C++ reduce to the same tree-sitter node kinds for everything but
//! namespaces, classes, and templates; those route through the `cpp`
//! module when the `cpp` flag is set.

use super::{cpp, BuildCtx};
use scopegraph_core::ast::{AstNode, ImportKind, ImportTarget, NodeId, NodeKind, SourceSpan};
use scopegraph_core::error::Result;
use scopegraph_core::resolution::RefKind;

pub(crate) fn build_file(ctx: &mut BuildCtx, root: tree_sitter::Node, cpp: bool) -> Result<()> {
    ctx.add_module_node()?;
    walk_items(ctx, root, cpp, false)
}

pub(crate) fn walk_items(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    cpp: bool,
    in_class: bool,
) -> Result<()> {
    let mut walker = node.walk();
    let children: Vec<_> = node.named_children(&mut walker).collect();
    for child in children {
        handle_item(ctx, child, cpp, in_class)?;
    }
    Ok(())
}

pub(crate) fn handle_item(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    cpp: bool,
    in_class: bool,
) -> Result<()> {
    match node.kind() {
        "function_definition" => {
            function(ctx, node, cpp, in_class, true)?;
        }
        "declaration" => declaration(ctx, node, cpp, in_class)?,
        "struct_specifier" => record(ctx, node, NodeKind::Struct, cpp)?,
        "union_specifier" => record(ctx, node, NodeKind::Union, cpp)?,
        "enum_specifier" => enumeration(ctx, node)?,
        "type_definition" => typedef(ctx, node, cpp)?,
        "preproc_include" => include(ctx, node)?,
        "preproc_def" | "preproc_function_def" => macro_definition(ctx, node)?,
        "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif" => {
            walk_items(ctx, node, cpp, in_class)?;
        }
        "field_declaration" if in_class => field(ctx, node, cpp)?,
        kind if cpp => cpp::handle_cpp_item(ctx, node, kind, in_class)?,
        _ => {}
    }
    Ok(())
}

/// A function definition or prototype.
///
/// Out-of-class C++ definitions (`void Ns::C::m()`) keep the written
/// scope path as the qualified name.
pub(crate) fn function(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    cpp: bool,
    in_class: bool,
    is_definition: bool,
) -> Result<Option<NodeId>> {
    let Some(outer) = node.child_by_field_name("declarator") else {
        return Ok(None);
    };
    let Some(declarator) = find_function_declarator(outer) else {
        return Ok(None);
    };
    let Some(name_node) = declarator.child_by_field_name("declarator") else {
        return Ok(None);
    };

    let written = ctx.text(name_node);
    if written.is_empty() {
        return Ok(None);
    }
    let (kind, name) = if let Some((_, simple)) = written.rsplit_once("::") {
        (NodeKind::Function, simple)
    } else if in_class {
        (NodeKind::Method, written)
    } else {
        (NodeKind::Function, written)
    };

    let mut ast_node = AstNode::new(kind, name, ctx.language());
    ast_node.qualified_name = ctx.qualify(written);
    ast_node.span = SourceSpan::from_ts_node(node);
    ast_node.is_definition = is_definition;
    let id = ctx.add_node(ast_node)?;

    if let Some(ty) = node.child_by_field_name("type") {
        type_reference(ctx, id, ty);
    }

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);

    if let Some(params) = declarator.child_by_field_name("parameters") {
        let mut walker = params.walk();
        let children: Vec<_> = params.named_children(&mut walker).collect();
        for param in children {
            if param.kind() != "parameter_declaration" {
                continue;
            }
            if let Some(decl) = param.child_by_field_name("declarator") {
                if let Some(name) = declarator_name(ctx, decl) {
                    ctx.add_declaration(NodeKind::Parameter, &name, param, true)?;
                }
            }
            if let Some(ty) = param.child_by_field_name("type") {
                type_reference(ctx, id, ty);
            }
        }
    }

    // Function-local declarations, so member access on locals can
    // resolve through their declared types.
    if let Some(body) = node.child_by_field_name("body") {
        let mut walker = body.walk();
        let statements: Vec<_> = body.named_children(&mut walker).collect();
        for statement in statements {
            if statement.kind() == "declaration" {
                declaration(ctx, statement, cpp, false)?;
            }
        }
    }

    ctx.pop_scope();
    Ok(Some(id))
}

/// A `declaration` statement: variables, prototypes, and
/// keyword-introduced type definitions.
fn declaration(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    cpp: bool,
    in_class: bool,
) -> Result<()> {
    let is_extern = has_storage_class(ctx, node, "extern");
    let ty = node.child_by_field_name("type");
    let mut created = Vec::new();

    let mut walker = node.walk();
    let children: Vec<_> = node.named_children(&mut walker).collect();
    for child in children {
        match child.kind() {
            "init_declarator" => {
                if let Some(decl) = child.child_by_field_name("declarator") {
                    if let Some(name) = declarator_name(ctx, decl) {
                        created.push(ctx.add_declaration(
                            NodeKind::Variable,
                            &name,
                            node,
                            true,
                        )?);
                    }
                }
            }
            "function_declarator" => {
                let kind = if in_class {
                    NodeKind::Method
                } else {
                    NodeKind::Function
                };
                if let Some(name_node) = child.child_by_field_name("declarator") {
                    let name = ctx.text(name_node);
                    if !name.is_empty() {
                        created.push(ctx.add_declaration(kind, name, node, false)?);
                    }
                }
            }
            "identifier" | "pointer_declarator" | "array_declarator" => {
                if let Some(name) = declarator_name(ctx, child) {
                    created.push(ctx.add_declaration(
                        NodeKind::Variable,
                        &name,
                        node,
                        !is_extern,
                    )?);
                }
            }
            _ => {}
        }
    }

    if let Some(ty) = ty {
        if created.is_empty() {
            // `struct Foo;` / `struct Foo { … };` without declarators.
            match ty.kind() {
                "struct_specifier" => record(ctx, ty, NodeKind::Struct, cpp)?,
                "union_specifier" => record(ctx, ty, NodeKind::Union, cpp)?,
                "enum_specifier" => enumeration(ctx, ty)?,
                "class_specifier" if cpp => record(ctx, ty, NodeKind::Class, cpp)?,
                _ => {}
            }
        } else {
            for id in created {
                type_reference(ctx, id, ty);
            }
        }
    }

    Ok(())
}

/// A named aggregate: struct, union, or (C++) class.
pub(crate) fn record(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    kind: NodeKind,
    cpp: bool,
) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node).to_string();
    let Some(body) = node.child_by_field_name("body") else {
        ctx.add_declaration(kind, &name, node, false)?;
        return Ok(());
    };

    let id = ctx.add_declaration(kind, &name, node, true)?;

    if cpp {
        let mut walker = node.walk();
        let bases: Vec<_> = node
            .children(&mut walker)
            .filter(|c| c.kind() == "base_class_clause")
            .collect();
        for clause in bases {
            let mut inner = clause.walk();
            let base_types: Vec<_> = clause.named_children(&mut inner).collect();
            for base in base_types {
                if matches!(
                    base.kind(),
                    "type_identifier" | "qualified_identifier" | "template_type"
                ) {
                    let text = ctx.text(base).to_string();
                    ctx.add_pending(id, RefKind::Inheritance, text, base);
                }
            }
        }
    }

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    let mut walker = body.walk();
    let members: Vec<_> = body.named_children(&mut walker).collect();
    for member in members {
        member_item(ctx, member, cpp)?;
    }
    ctx.pop_scope();
    Ok(())
}

fn member_item(ctx: &mut BuildCtx, node: tree_sitter::Node, cpp: bool) -> Result<()> {
    match node.kind() {
        "field_declaration" => field(ctx, node, cpp),
        "function_definition" => function(ctx, node, cpp, true, true).map(|_| ()),
        "declaration" => declaration(ctx, node, cpp, true),
        "struct_specifier" => record(ctx, node, NodeKind::Struct, cpp),
        "union_specifier" => record(ctx, node, NodeKind::Union, cpp),
        "enum_specifier" => enumeration(ctx, node),
        "class_specifier" if cpp => record(ctx, node, NodeKind::Class, cpp),
        "template_declaration" if cpp => cpp::handle_cpp_item(ctx, node, node.kind(), true),
        _ => Ok(()),
    }
}

/// A member field, or a C++ method prototype inside a class body.
fn field(ctx: &mut BuildCtx, node: tree_sitter::Node, _cpp: bool) -> Result<()> {
    let ty = node.child_by_field_name("type");
    let mut walker = node.walk();
    let children: Vec<_> = node.named_children(&mut walker).collect();
    for child in children {
        let created = match child.kind() {
            "function_declarator" => {
                if let Some(name_node) = child.child_by_field_name("declarator") {
                    let name = ctx.text(name_node).to_string();
                    if name.is_empty() {
                        None
                    } else {
                        Some(ctx.add_declaration(NodeKind::Method, &name, node, false)?)
                    }
                } else {
                    None
                }
            }
            "field_identifier" | "pointer_declarator" | "array_declarator" => {
                declarator_name(ctx, child)
                    .map(|name| ctx.add_declaration(NodeKind::Variable, &name, node, true))
                    .transpose()?
            }
            _ => None,
        };
        if let (Some(id), Some(ty)) = (created, ty) {
            type_reference(ctx, id, ty);
        }
    }
    Ok(())
}

/// An enum definition. Enumerators attach under the enum node but keep
/// the enclosing scope's qualified prefix, matching C visibility.
fn enumeration(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let name = node.child_by_field_name("name").map(|n| ctx.text(n).to_string());
    let body = node.child_by_field_name("body");

    match (name, body) {
        (Some(name), Some(body)) => {
            let id = ctx.add_declaration(NodeKind::Enum, &name, node, true)?;
            ctx.push_scope(id, "");
            enumerators(ctx, body)?;
            ctx.pop_scope();
        }
        (Some(name), None) => {
            ctx.add_declaration(NodeKind::Enum, &name, node, false)?;
        }
        (None, Some(body)) => enumerators(ctx, body)?,
        (None, None) => {}
    }
    Ok(())
}

fn enumerators(ctx: &mut BuildCtx, body: tree_sitter::Node) -> Result<()> {
    let mut walker = body.walk();
    let entries: Vec<_> = body.named_children(&mut walker).collect();
    for entry in entries {
        if entry.kind() != "enumerator" {
            continue;
        }
        if let Some(name_node) = entry.child_by_field_name("name") {
            let name = ctx.text(name_node).to_string();
            if !name.is_empty() {
                ctx.add_declaration(NodeKind::Variable, &name, entry, true)?;
            }
        }
    }
    Ok(())
}

/// A typedef. Anonymous aggregate bodies hang their members under the
/// typedef node so member access can resolve through the alias.
fn typedef(ctx: &mut BuildCtx, node: tree_sitter::Node, cpp: bool) -> Result<()> {
    let Some(decl) = node.child_by_field_name("declarator") else {
        return Ok(());
    };
    let name = ctx.text(decl).to_string();
    if name.is_empty() {
        return Ok(());
    }
    let id = ctx.add_declaration(NodeKind::Typedef, &name, node, true)?;

    if let Some(ty) = node.child_by_field_name("type") {
        let anonymous_body = ty.child_by_field_name("name").is_none();
        match ty.kind() {
            "struct_specifier" | "union_specifier" if anonymous_body => {
                if let Some(body) = ty.child_by_field_name("body") {
                    let qualified = ctx.qualified_name_of(id);
                    ctx.push_scope(id, qualified);
                    let mut walker = body.walk();
                    let members: Vec<_> = body.named_children(&mut walker).collect();
                    for member in members {
                        member_item(ctx, member, cpp)?;
                    }
                    ctx.pop_scope();
                }
            }
            _ => type_reference(ctx, id, ty),
        }
    }
    Ok(())
}

/// `#include` directive: keeps the verbatim statement and the extracted
/// structured path.
fn include(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(path_node) = node.child_by_field_name("path") else {
        return Ok(());
    };
    let (kind, path) = match path_node.kind() {
        "string_literal" => (
            ImportKind::LocalInclude,
            ctx.text(path_node).trim_matches('"').to_string(),
        ),
        "system_lib_string" => (
            ImportKind::SystemInclude,
            ctx.text(path_node)
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string(),
        ),
        _ => return Ok(()),
    };
    if path.is_empty() {
        return Ok(());
    }

    let mut ast_node = AstNode::new(NodeKind::Include, path.clone(), ctx.language());
    ast_node.span = SourceSpan::from_ts_node(node);
    ast_node.is_definition = false;
    ast_node.raw_content = Some(ctx.text(node).trim_end().to_string());
    ast_node.import_target = Some(ImportTarget {
        kind,
        path: path.clone(),
    });
    let id = ctx.add_node(ast_node)?;
    ctx.add_pending(id, RefKind::Import, path, path_node);
    Ok(())
}

/// Object-like and function-like macros register as file-scope names so
/// macro-style identifier uses can resolve.
fn macro_definition(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node).to_string();
    if name.is_empty() {
        return Ok(());
    }
    let id = ctx.add_declaration(NodeKind::Variable, &name, node, true)?;
    ctx.set_property(id, "macro", "true");
    Ok(())
}

/// Descend wrapper declarators until the function declarator, if any.
fn find_function_declarator(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    let mut current = node;
    loop {
        if current.kind() == "function_declarator" {
            return Some(current);
        }
        current = current.child_by_field_name("declarator")?;
    }
}

/// The identifier named by a (possibly wrapped) declarator.
fn declarator_name(ctx: &BuildCtx, node: tree_sitter::Node) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => {
            let text = ctx.text(node);
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => declarator_name(ctx, node.child_by_field_name("declarator")?),
    }
}

fn has_storage_class(ctx: &BuildCtx, node: tree_sitter::Node, keyword: &str) -> bool {
    let mut walker = node.walk();
    let result = node.children(&mut walker)
        .any(|c| c.kind() == "storage_class_specifier" && ctx.text(c) == keyword);
    result
}

/// Record a `Type` pending reference for a named type use; primitive and
/// sized types are not references.
pub(crate) fn type_reference(ctx: &mut BuildCtx, owner: NodeId, ty: tree_sitter::Node) {
    match ty.kind() {
        "type_identifier" | "qualified_identifier" | "template_type" => {
            let text = ctx.text(ty).to_string();
            ctx.add_pending(owner, RefKind::Type, text, ty);
        }
        "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => {
            if let Some(name) = ty.child_by_field_name("name") {
                let text = ctx.text(name).to_string();
                ctx.add_pending(owner, RefKind::Type, text, ty);
            }
        }
        _ => {}
    }
}
