//! Python declaration walk.
//!
//! The file's module stem prefixes every qualified name (`a.py` defining
//! `foo` yields `a.foo`), so sibling imports resolve through the index.

use super::BuildCtx;
use scopegraph_core::ast::{AstNode, ImportKind, ImportTarget, NodeId, NodeKind, SourceSpan};
use scopegraph_core::error::Result;
use scopegraph_core::resolution::RefKind;

pub(crate) fn build(ctx: &mut BuildCtx, root: tree_sitter::Node) -> Result<()> {
    let module = ctx.add_module_node()?;
    let qualified = ctx.qualified_name_of(module);
    ctx.push_scope(module, qualified);
    walk_block(ctx, root, false, true)?;
    ctx.pop_scope();
    Ok(())
}

/// Walk a suite of statements.
///
/// `in_class` marks functions as methods; `register_vars` is true only at
/// module and class level, so locals never become Variable nodes.
fn walk_block(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    in_class: bool,
    register_vars: bool,
) -> Result<()> {
    let mut walker = node.walk();
    let children: Vec<_> = node.named_children(&mut walker).collect();
    for child in children {
        handle_statement(ctx, child, in_class, register_vars)?;
    }
    Ok(())
}

fn handle_statement(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    in_class: bool,
    register_vars: bool,
) -> Result<()> {
    match node.kind() {
        "function_definition" => function(ctx, node, in_class),
        "class_definition" => class(ctx, node),
        "decorated_definition" => match node.child_by_field_name("definition") {
            Some(inner) => handle_statement(ctx, inner, in_class, register_vars),
            None => Ok(()),
        },
        "import_statement" => import(ctx, node),
        "import_from_statement" => import_from(ctx, node),
        "expression_statement" if register_vars => assignment(ctx, node),
        _ => Ok(()),
    }
}

fn function(ctx: &mut BuildCtx, node: tree_sitter::Node, in_class: bool) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let kind = if in_class {
        NodeKind::Method
    } else {
        NodeKind::Function
    };
    let id = ctx.add_declaration(kind, name, node, true)?;

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);

    if let Some(params) = node.child_by_field_name("parameters") {
        parameters(ctx, id, params)?;
    }
    if let Some(return_type) = node.child_by_field_name("return_type") {
        let text = ctx.text(return_type).to_string();
        ctx.add_pending(id, RefKind::Type, text, return_type);
    }
    if let Some(body) = node.child_by_field_name("body") {
        // Nested defs become scoped declarations; assignments stay local.
        walk_block(ctx, body, false, false)?;
    }

    ctx.pop_scope();
    Ok(())
}

fn parameters(ctx: &mut BuildCtx, owner: NodeId, params: tree_sitter::Node) -> Result<()> {
    let mut walker = params.walk();
    let children: Vec<_> = params.named_children(&mut walker).collect();
    for param in children {
        match param.kind() {
            "identifier" => {
                let name = ctx.text(param).to_string();
                ctx.add_declaration(NodeKind::Parameter, &name, param, true)?;
            }
            "typed_parameter" | "typed_default_parameter" | "default_parameter" => {
                let name_node = param
                    .child_by_field_name("name")
                    .or_else(|| param.named_child(0));
                if let Some(name_node) = name_node {
                    if name_node.kind() == "identifier" {
                        let name = ctx.text(name_node).to_string();
                        ctx.add_declaration(NodeKind::Parameter, &name, param, true)?;
                    }
                }
                if let Some(ty) = param.child_by_field_name("type") {
                    let text = ctx.text(ty).to_string();
                    ctx.add_pending(owner, RefKind::Type, text, ty);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn class(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Class, name, node, true)?;

    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut walker = superclasses.walk();
        let bases: Vec<_> = superclasses.named_children(&mut walker).collect();
        for base in bases {
            if matches!(base.kind(), "identifier" | "attribute") {
                let text = ctx.text(base).to_string();
                ctx.add_pending(id, RefKind::Inheritance, text, base);
            }
        }
    }

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(body) = node.child_by_field_name("body") {
        walk_block(ctx, body, true, true)?;
    }
    ctx.pop_scope();
    Ok(())
}

/// `import a`, `import a.b as c` — one Import node per imported module.
fn import(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let raw = ctx.text(node).trim_end().to_string();
    let mut walker = node.walk();
    let names: Vec<_> = node.named_children(&mut walker).collect();
    for entry in names {
        match entry.kind() {
            "dotted_name" => {
                let path = ctx.text(entry).to_string();
                import_node(ctx, node, &raw, &path, &path)?;
            }
            "aliased_import" => {
                if let Some(name) = entry.child_by_field_name("name") {
                    let path = ctx.text(name).to_string();
                    let alias = entry
                        .child_by_field_name("alias")
                        .map(|a| ctx.text(a).to_string());
                    let id = import_node(ctx, node, &raw, &path, &path)?;
                    if let (Some(id), Some(alias)) = (id, alias) {
                        ctx.set_property(id, "alias", &alias);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// `from X import Y, Z` — one Import node per imported name, each keeping
/// the source module in its structured target.
fn import_from(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let raw = ctx.text(node).trim_end().to_string();
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return Ok(());
    };
    let module = ctx.text(module_node).to_string();

    let mut imported_any = false;
    let mut walker = node.walk();
    let names: Vec<_> = node
        .children_by_field_name("name", &mut walker)
        .collect();
    for entry in names {
        let name_node = match entry.kind() {
            "dotted_name" => Some(entry),
            "aliased_import" => entry.child_by_field_name("name"),
            _ => None,
        };
        if let Some(name_node) = name_node {
            let name = ctx.text(name_node).to_string();
            import_node(ctx, node, &raw, &name, &module)?;
            imported_any = true;
        }
    }

    if !imported_any {
        // `from X import *` — reference the module itself.
        import_node(ctx, node, &raw, &module, &module)?;
    }
    Ok(())
}

fn import_node(
    ctx: &mut BuildCtx,
    statement: tree_sitter::Node,
    raw: &str,
    name: &str,
    module: &str,
) -> Result<Option<NodeId>> {
    if name.is_empty() {
        return Ok(None);
    }
    let mut node = AstNode::new(NodeKind::Import, name, ctx.language());
    node.span = SourceSpan::from_ts_node(statement);
    node.is_definition = false;
    node.raw_content = Some(raw.to_string());
    node.import_target = Some(ImportTarget {
        kind: ImportKind::Module,
        path: module.to_string(),
    });
    let id = ctx.add_node(node)?;
    ctx.add_pending(id, RefKind::Import, name, statement);
    Ok(Some(id))
}

/// Module- and class-level assignments introduce Variable nodes.
fn assignment(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(expr) = node.named_child(0) else {
        return Ok(());
    };
    if expr.kind() != "assignment" {
        return Ok(());
    }
    let Some(left) = expr.child_by_field_name("left") else {
        return Ok(());
    };
    if left.kind() != "identifier" {
        return Ok(());
    }
    let name = ctx.text(left).to_string();
    let id = ctx.add_declaration(NodeKind::Variable, &name, node, true)?;
    if let Some(ty) = expr.child_by_field_name("type") {
        let text = ctx.text(ty).to_string();
        ctx.add_pending(id, RefKind::Type, text, ty);
    }
    Ok(())
}
