//! Python reference resolution.

use super::LanguageResolver;
use scopegraph_core::ast::NodeKind;
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{RefKind, Resolution, ResolveContext, ResolveRequest};

pub struct PythonResolver;

impl LanguageResolver for PythonResolver {
    fn language(&self) -> Language {
        Language::Python
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        match req.ref_kind {
            RefKind::Import => resolve_import(req, ctx),
            _ => resolve_name(req, ctx),
        }
    }
}

/// Imports resolve to module entries; `from X import Y` (recognized from
/// the kept statement text) resolves the name inside its source module.
fn resolve_import(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    let node = ctx.asts.node(req.node);
    let raw = node.and_then(|n| n.raw_content.as_deref()).unwrap_or("");
    let module = node
        .and_then(|n| n.import_target.as_ref())
        .map(|t| t.path.as_str());

    if raw.contains("from ") {
        if let Some(module) = module {
            let qualified = format!("{module}.{}", req.name);
            if let Some(entry) = ctx.index.lookup(&qualified) {
                return check_circular(req, Resolution::Target(entry.node()));
            }
            if let Some(entry) = lookup_module(ctx, module) {
                return check_circular(req, entry);
            }
        }
    }

    if let Some(entry) = lookup_module(ctx, req.name) {
        return check_circular(req, entry);
    }
    // Dotted module paths fall back to their first segment.
    if let Some((head, _)) = req.name.split_once('.') {
        if let Some(entry) = lookup_module(ctx, head) {
            return check_circular(req, entry);
        }
    }

    if ctx.options.resolve_external_symbols {
        Resolution::NotFound
    } else {
        Resolution::Intrinsic
    }
}

fn lookup_module(ctx: &ResolveContext<'_>, name: &str) -> Option<Resolution> {
    ctx.index
        .lookup_all(name)
        .iter()
        .find(|e| e.kind() == NodeKind::Module)
        .map(|e| Resolution::Target(e.node()))
}

/// A module importing itself is a cycle, not a resolution.
fn check_circular(req: &ResolveRequest<'_>, resolution: Resolution) -> Resolution {
    match resolution {
        Resolution::Target(target) if target.file == req.node.file => Resolution::Circular,
        other => other,
    }
}

/// Names resolve directly, then as `module.attribute`, then up the scope
/// chain, and finally against `builtins`.
fn resolve_name(req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
    if let Some(entry) = ctx.index.lookup(req.name) {
        return Resolution::Target(entry.node());
    }

    if let Some((owner, _attribute)) = req.name.split_once('.') {
        // `a.b` where `a` is a module: the qualified name is the lookup key.
        if lookup_module(ctx, owner).is_some() {
            if let Some(entry) = ctx.index.lookup(req.name) {
                return Resolution::Target(entry.node());
            }
            return Resolution::NotFound;
        }
    }

    if let Some(entry) = ctx.index.scope_lookup(req.name, req.scope, req.language) {
        return Resolution::Target(entry.node());
    }

    let builtin = format!("builtins.{}", req.name);
    if let Some(entry) = ctx.index.lookup(&builtin) {
        return Resolution::Target(entry.node());
    }

    Resolution::NotFound
}
