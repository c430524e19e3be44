//! TypeScript extensions over the shared JS/TS walk: interfaces, enums,
//! type aliases, namespaces, and ambient declarations.

use super::{js_ts, BuildCtx};
use scopegraph_core::ast::NodeKind;
use scopegraph_core::error::Result;
use scopegraph_core::resolution::RefKind;

pub(crate) fn build(ctx: &mut BuildCtx, root: tree_sitter::Node) -> Result<()> {
    js_ts::build_program(ctx, root, true)
}

pub(crate) fn handle_ts_statement(
    ctx: &mut BuildCtx,
    node: tree_sitter::Node,
    kind: &str,
) -> Result<()> {
    match kind {
        "interface_declaration" => interface(ctx, node),
        "enum_declaration" => enumeration(ctx, node),
        "type_alias_declaration" => type_alias(ctx, node),
        "internal_module" => namespace(ctx, node),
        "abstract_class_declaration" => js_ts::class_decl(ctx, node, true),
        "ambient_declaration" => match node.named_child(0) {
            Some(inner) => js_ts::handle_statement(ctx, inner, true),
            None => Ok(()),
        },
        "function_signature" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    let id = ctx.add_declaration(NodeKind::Function, name, node, false)?;
                    js_ts::function_signature(ctx, id, node, true)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn interface(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Interface, name, node, true)?;

    let mut walker = node.walk();
    let clauses: Vec<_> = node
        .children(&mut walker)
        .filter(|c| matches!(c.kind(), "extends_type_clause" | "extends_clause"))
        .collect();
    for clause in clauses {
        let mut inner = clause.walk();
        let types: Vec<_> = clause.named_children(&mut inner).collect();
        for ty in types {
            if matches!(
                ty.kind(),
                "type_identifier" | "nested_type_identifier" | "generic_type"
            ) {
                let text = ctx.text(ty).to_string();
                ctx.add_pending(id, RefKind::Inheritance, text, ty);
            }
        }
    }

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(body) = node.child_by_field_name("body") {
        let mut walker = body.walk();
        let members: Vec<_> = body.named_children(&mut walker).collect();
        for member in members {
            interface_member(ctx, member)?;
        }
    }
    ctx.pop_scope();
    Ok(())
}

fn interface_member(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    match node.kind() {
        "property_signature" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    let id = ctx.add_declaration(NodeKind::Variable, name, node, true)?;
                    if let Some(annotation) = node.child_by_field_name("type") {
                        js_ts::type_annotation_ref(ctx, id, annotation);
                    }
                }
            }
            Ok(())
        }
        "method_signature" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = ctx.text(name_node);
                if !name.is_empty() {
                    ctx.add_declaration(NodeKind::Method, name, node, false)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// TS enum members are scoped (`E.A`), unlike C enumerators.
fn enumeration(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Enum, name, node, true)?;

    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(body) = node.child_by_field_name("body") {
        let mut walker = body.walk();
        let members: Vec<_> = body.named_children(&mut walker).collect();
        for member in members {
            let name_node = match member.kind() {
                "enum_assignment" => member.child_by_field_name("name"),
                "property_identifier" => Some(member),
                _ => None,
            };
            if let Some(name_node) = name_node {
                let member_name = ctx.text(name_node).to_string();
                if !member_name.is_empty() {
                    ctx.add_declaration(NodeKind::Variable, &member_name, member, true)?;
                }
            }
        }
    }
    ctx.pop_scope();
    Ok(())
}

fn type_alias(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node);
    let id = ctx.add_declaration(NodeKind::Typedef, name, node, true)?;
    if let Some(value) = node.child_by_field_name("value") {
        if matches!(
            value.kind(),
            "type_identifier" | "nested_type_identifier" | "generic_type"
        ) {
            let text = ctx.text(value).to_string();
            ctx.add_pending(id, RefKind::Type, text, value);
        }
    }
    Ok(())
}

fn namespace(ctx: &mut BuildCtx, node: tree_sitter::Node) -> Result<()> {
    let Some(name_node) = node.child_by_field_name("name") else {
        return Ok(());
    };
    let name = ctx.text(name_node).trim_matches('"').to_string();
    if name.is_empty() {
        return Ok(());
    }
    let id = ctx.add_declaration(NodeKind::Namespace, &name, node, true)?;
    let qualified = ctx.qualified_name_of(id);
    ctx.push_scope(id, qualified);
    if let Some(body) = node.child_by_field_name("body") {
        js_ts::walk_statements(ctx, body, true)?;
    }
    ctx.pop_scope();
    Ok(())
}
