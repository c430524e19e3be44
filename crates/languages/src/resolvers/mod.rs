//! Per-language reference resolvers, their registry, and the dispatcher.
//!
//! A resolver maps one pending reference to a [`Resolution`]. The registry
//! holds one boxed resolver per language; replacing or unregistering one
//! drops the previous box, which releases any resolver-owned state exactly
//! once. Dispatch falls back to generic scope-aware lookup when no
//! resolver claims a language.

mod c;
mod c_cpp;
mod cpp;
mod generic;
mod javascript;
mod js_ts;
mod python;
mod typescript;

pub use c::CResolver;
pub use cpp::CppResolver;
pub use generic::GenericResolver;
pub use javascript::JavaScriptResolver;
pub use python::PythonResolver;
pub use typescript::TypeScriptResolver;

use scopegraph_core::ast::{AstSet, FileId, NodeHandle, NodeId, Reference};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{
    Resolution, ResolutionStats, ResolutionStatus, ResolveContext, ResolveRequest,
    ResolverOptions,
};
use scopegraph_core::symbols::SymbolIndex;
use tracing::warn;

/// A reference resolver for one language.
pub trait LanguageResolver: Send {
    /// Language this resolver claims.
    fn language(&self) -> Language;

    /// Attempt to resolve one pending reference.
    fn resolve(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution;
}

/// Traversal clamp for a single file's resolution pass.
const MAX_RESOLVE_NODES: usize = 65_536;

/// Registry of per-language resolvers plus resolution statistics.
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn LanguageResolver>>,
    options: ResolverOptions,
    stats: ResolutionStats,
}

impl ResolverRegistry {
    /// An empty registry; every request falls back to generic resolution.
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            resolvers: Vec::new(),
            options,
            stats: ResolutionStats::new(),
        }
    }

    /// A registry with all five built-in resolvers installed.
    pub fn with_default_resolvers(options: ResolverOptions) -> Self {
        let mut registry = Self::new(options);
        registry.register(Box::new(CResolver));
        registry.register(Box::new(CppResolver));
        registry.register(Box::new(PythonResolver));
        registry.register(Box::new(JavaScriptResolver));
        registry.register(Box::new(TypeScriptResolver));
        registry
    }

    /// Install a resolver, replacing (and dropping) any previous one for
    /// the same language.
    pub fn register(&mut self, resolver: Box<dyn LanguageResolver>) {
        let language = resolver.language();
        if let Some(existing) = self
            .resolvers
            .iter_mut()
            .find(|r| r.language() == language)
        {
            *existing = resolver;
        } else {
            self.resolvers.push(resolver);
        }
    }

    /// Remove the resolver for a language, if present.
    pub fn unregister(&mut self, language: Language) -> bool {
        let before = self.resolvers.len();
        self.resolvers.retain(|r| r.language() != language);
        self.resolvers.len() != before
    }

    pub fn find(&self, language: Language) -> Option<&dyn LanguageResolver> {
        self.resolvers
            .iter()
            .find(|r| r.language() == language)
            .map(Box::as_ref)
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    /// Resolve one reference, counting the attempt.
    pub fn resolve_node(
        &mut self,
        req: &ResolveRequest<'_>,
        ctx: &ResolveContext<'_>,
    ) -> Resolution {
        let resolution = self.dispatch(req, ctx);
        self.stats.record(req.language, resolution.status());
        resolution
    }

    fn dispatch(&self, req: &ResolveRequest<'_>, ctx: &ResolveContext<'_>) -> Resolution {
        match self.find(req.language) {
            Some(resolver) => resolver.resolve(req, ctx),
            None => generic::resolve(req, ctx),
        }
    }

    /// Resolve every pending reference in one file.
    ///
    /// BFS over the AST; successful pendings become reference edges and
    /// are drained, failures stay pending for later passes. The overall
    /// status is `Success` iff every attempt succeeded, otherwise the
    /// first non-success observed.
    pub fn resolve_file(
        &mut self,
        asts: &mut AstSet,
        index: &SymbolIndex,
        file: FileId,
    ) -> ResolutionStatus {
        let Some(ast) = asts.ast(file) else {
            return ResolutionStatus::Error;
        };

        let mut order = ast.bfs();
        if order.len() > MAX_RESOLVE_NODES {
            warn!(
                file = %ast.file_path().display(),
                nodes = order.len(),
                clamp = MAX_RESOLVE_NODES,
                "resolution traversal clamped"
            );
            order.truncate(MAX_RESOLVE_NODES);
        }

        let mut overall = ResolutionStatus::Success;
        let mut attempts: Vec<(Language, ResolutionStatus)> = Vec::new();
        let mut planned: Vec<(NodeId, Vec<(usize, Resolution)>)> = Vec::new();

        {
            let ctx = ResolveContext {
                index,
                asts,
                options: self.options,
            };
            for id in order {
                let Some(node) = ast.get(id) else { continue };
                if node.pending_references.is_empty() {
                    continue;
                }
                let scope = enclosing_scope(ast, id);
                let mut results = Vec::with_capacity(node.pending_references.len());
                for (i, pending) in node.pending_references.iter().enumerate() {
                    let req = ResolveRequest {
                        node: NodeHandle { file, node: id },
                        ref_kind: pending.kind,
                        name: &pending.name,
                        language: node.language,
                        scope: scope.as_deref(),
                    };
                    let resolution = self.dispatch(&req, &ctx);
                    attempts.push((node.language, resolution.status()));
                    if overall.is_success() && !resolution.is_success() {
                        overall = resolution.status();
                    }
                    results.push((i, resolution));
                }
                planned.push((id, results));
            }
        }

        for (language, status) in attempts {
            self.stats.record(language, status);
        }

        if let Some(ast) = asts.ast_mut(file) {
            for (id, results) in planned {
                let Some(node) = ast.get_mut(id) else { continue };
                let mut drained = Vec::new();
                for (i, resolution) in &results {
                    match resolution {
                        Resolution::Target(target) => {
                            if let Some(pending) = node.pending_references.get(*i) {
                                node.references.push(Reference {
                                    kind: pending.kind,
                                    target: *target,
                                });
                            }
                            drained.push(*i);
                        }
                        Resolution::Intrinsic => drained.push(*i),
                        _ => {}
                    }
                }
                for i in drained.iter().rev() {
                    node.pending_references.remove(*i);
                }
            }
        }

        overall
    }

    /// Resolve every file in the store, in file order.
    pub fn resolve_all(&mut self, asts: &mut AstSet, index: &SymbolIndex) -> ResolutionStatus {
        let mut overall = ResolutionStatus::Success;
        for file in asts.file_ids() {
            let status = self.resolve_file(asts, index, file);
            if overall.is_success() && !status.is_success() {
                overall = status;
            }
        }
        overall
    }
}

/// Qualified name of the nearest enclosing node that has one, falling
/// back to the file's module scope for top-level sites.
fn enclosing_scope(ast: &scopegraph_core::ast::Ast, id: NodeId) -> Option<String> {
    use scopegraph_core::ast::NodeKind;

    let mut current = Some(id);
    while let Some(node_id) = current {
        let node = ast.get(node_id)?;
        if !node.qualified_name.is_empty() && node.kind != NodeKind::FunctionCall {
            return Some(node.qualified_name.clone());
        }
        current = node.parent();
    }

    ast.children(ast.root()).iter().find_map(|&child| {
        let node = ast.get(child)?;
        (node.kind == NodeKind::Module && !node.qualified_name.is_empty())
            .then(|| node.qualified_name.clone())
    })
}
