//! TypeScript reference resolution: the JS core extended with primitive
//! types, namespaced types, generics, and kind-checked type lookups.

use super::{js_ts, LanguageResolver};
use scopegraph_core::ast::NodeKind;
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{RefKind, Resolution, ResolveContext, ResolveRequest};

/// Primitive type names resolve without producing a reference edge.
const PRIMITIVE_TYPES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "any",
    "void",
    "undefined",
    "null",
    "never",
    "object",
    "unknown",
];

/// Target kinds acceptable for a type-position reference.
const TYPE_KINDS: &[NodeKind] = &[
    NodeKind::Interface,
    NodeKind::Typedef,
    NodeKind::Enum,
    NodeKind::Class,
];

pub struct TypeScriptResolver;

impl LanguageResolver for TypeScriptResolver {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        let type_position = matches!(
            req.ref_kind,
            RefKind::Type | RefKind::Inheritance | RefKind::Implementation | RefKind::Template
        );

        if type_position && PRIMITIVE_TYPES.contains(&req.name) {
            return Resolution::Intrinsic;
        }

        // Generic `T<U>` strips to its head.
        let name = req.name.split('<').next().unwrap_or(req.name).trim();
        if name.is_empty() {
            return Resolution::NotFound;
        }

        if type_position {
            if let Some(resolution) = resolve_type(name, req, ctx) {
                return resolution;
            }
        }

        let stripped = ResolveRequest { name, ..*req };
        js_ts::resolve(&stripped, ctx)
    }
}

/// Type-position lookup with target-kind checking, including `Ns.Type`.
fn resolve_type(
    name: &str,
    req: &ResolveRequest<'_>,
    ctx: &ResolveContext<'_>,
) -> Option<Resolution> {
    if let Some(entry) = type_entry(ctx, name) {
        return Some(Resolution::Target(entry));
    }

    // `Ns.Type`: resolve the namespace, then the member inside it.
    if let Some((namespace, rest)) = name.split_once('.') {
        if let Some(ns_entry) = ctx.index.scope_lookup(namespace, req.scope, req.language) {
            let qualified = format!("{}.{rest}", ns_entry.qualified_name());
            if let Some(entry) = type_entry(ctx, &qualified) {
                return Some(Resolution::Target(entry));
            }
        }
        return None;
    }

    // Scope-aware retry, still kind-checked.
    let entry = ctx.index.scope_lookup(name, req.scope, req.language)?;
    TYPE_KINDS
        .contains(&entry.kind())
        .then(|| Resolution::Target(entry.node()))
}

/// First chain entry with an acceptable type kind.
fn type_entry(
    ctx: &ResolveContext<'_>,
    qualified: &str,
) -> Option<scopegraph_core::ast::NodeHandle> {
    ctx.index
        .lookup_all(qualified)
        .iter()
        .find(|e| TYPE_KINDS.contains(&e.kind()))
        .map(|e| e.node())
}
