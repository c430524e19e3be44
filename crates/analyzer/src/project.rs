//! The project driver and host surface.

use crate::discovery;
use crate::includes::{self, IncludePlan};
use crate::symbols;
use scopegraph_core::ast::{Ast, AstSet, FileId, NodeHandle, NodeKind};
use scopegraph_core::config::ProjectConfig;
use scopegraph_core::error::{Error, RecordedError, Result};
use scopegraph_core::language::Language;
use scopegraph_core::resolution::{ResolutionStats, ResolutionStatus, ResolverOptions};
use scopegraph_core::symbols::{SymbolEntry, SymbolIndex};
use scopegraph_languages::{build_ast, ResolverRegistry};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use twox_hash::XxHash3_128;

/// A file queued for parsing.
#[derive(Debug, Clone)]
struct DiscoveredFile {
    path: PathBuf,
    language: Option<Language>,
    /// Distance from a caller-added file along include/import chains.
    depth: usize,
}

/// Outcome of a [`Project::parse_all_files`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub parsed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ParseSummary {
    /// True when no file raised a fatal error.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Aggregate project counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub files_discovered: usize,
    pub files_parsed: usize,
    pub symbols: usize,
    pub resolution: ResolutionStats,
}

/// A project: the set of files under analysis, their ASTs, the global
/// symbol index, and the resolver registry.
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    asts: AstSet,
    discovered: Vec<DiscoveredFile>,
    parsed: HashMap<PathBuf, FileId>,
    fingerprints: HashMap<PathBuf, u128>,
    index: SymbolIndex,
    registry: ResolverRegistry,
    dependencies: HashMap<PathBuf, Vec<PathBuf>>,
    last_error: Option<RecordedError>,
}

impl Project {
    /// Create a project rooted at `root` with the built-in resolvers.
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        let options = ResolverOptions {
            resolve_external_symbols: config.resolve_external_symbols,
        };
        Self {
            root: root.into(),
            config,
            asts: AstSet::new(),
            discovered: Vec::new(),
            parsed: HashMap::new(),
            fingerprints: HashMap::new(),
            index: SymbolIndex::new(),
            registry: ResolverRegistry::with_default_resolvers(options),
            dependencies: HashMap::new(),
            last_error: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The most recent failure, if any.
    pub fn last_error(&self) -> Option<&RecordedError> {
        self.last_error.as_ref()
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    /// Overwrite the cached failure, for embedding hosts that surface
    /// their own errors through the project.
    pub fn set_last_error(&mut self, error: RecordedError) {
        self.last_error = Some(error);
    }

    fn record_error(&mut self, error: &Error) {
        self.last_error = Some(RecordedError::from_error(error));
    }

    /// Add an outer namespace/module prefix consulted by scope-aware
    /// lookup (e.g. `std`).
    pub fn add_scope_prefix(&mut self, prefix: impl Into<String>) {
        self.index.add_scope_prefix(prefix);
    }

    /// Absolute iff leading `/`; otherwise joined to the project root.
    fn normalize(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_path("empty path"));
        }
        if path.to_str().is_none() {
            return Err(Error::invalid_path(path.to_string_lossy()));
        }
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.root.join(path))
        }
    }

    /// Queue a file for parsing. Deduplicates by normalized path; the
    /// parse itself is deferred to [`parse_all_files`](Self::parse_all_files).
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.add_file_at_depth(path.as_ref(), None, 0)
    }

    /// Queue a file with an explicit language.
    pub fn add_file_with_language(
        &mut self,
        path: impl AsRef<Path>,
        language: Language,
    ) -> Result<()> {
        self.add_file_at_depth(path.as_ref(), Some(language), 0)
    }

    fn add_file_at_depth(
        &mut self,
        path: &Path,
        language: Option<Language>,
        depth: usize,
    ) -> Result<()> {
        let normalized = match self.normalize(path) {
            Ok(p) => p,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };

        if depth > self.config.max_include_depth {
            let error = Error::IncludeDepth {
                limit: self.config.max_include_depth,
                path: normalized.to_string_lossy().into_owned(),
            };
            self.record_error(&error);
            return Err(error);
        }

        if self.discovered.iter().any(|f| f.path == normalized) {
            return Ok(());
        }

        if self.config.max_files > 0 && self.discovered.len() >= self.config.max_files {
            let error = Error::TooManyFiles {
                limit: self.config.max_files,
            };
            self.record_error(&error);
            return Err(error);
        }

        debug!(path = %normalized.display(), depth, "file discovered");
        self.discovered.push(DiscoveredFile {
            path: normalized,
            language,
            depth,
        });
        Ok(())
    }

    /// Walk a directory and queue every matching source file.
    ///
    /// Returns the number of files added.
    pub fn add_directory(
        &mut self,
        path: impl AsRef<Path>,
        recursive: bool,
        extensions: Option<&[&str]>,
    ) -> Result<usize> {
        let dir = self.normalize(path.as_ref())?;
        if !dir.is_dir() {
            let error = Error::invalid_path(format!("not a directory: {}", dir.display()));
            self.record_error(&error);
            return Err(error);
        }

        let mut added = 0;
        for (file, language) in discovery::walk_directory(&dir, recursive, extensions) {
            match self.add_file_at_depth(&file, Some(language), 0) {
                Ok(()) => added += 1,
                Err(Error::TooManyFiles { .. }) => break,
                Err(e) => warn!("skipping {}: {e}", file.display()),
            }
        }
        Ok(added)
    }

    /// Parse every queued file to a fixed point.
    ///
    /// Include chasing appends to the queue mid-pass, so the loop runs by
    /// index until no entries remain. Per-file failures are recorded and
    /// the pass continues.
    pub fn parse_all_files(&mut self) -> ParseSummary {
        let mut summary = ParseSummary::default();

        let mut i = 0;
        while i < self.discovered.len() {
            let entry = self.discovered[i].clone();
            i += 1;

            if self.parsed.contains_key(&entry.path) {
                summary.skipped += 1;
                continue;
            }

            match self.parse_one(&entry) {
                Ok(file) => {
                    summary.parsed += 1;
                    self.process_includes(file, entry.depth);
                    if let Some(ast) = self.asts.ast(file) {
                        let count = symbols::register_file_symbols(&mut self.index, ast, file);
                        debug!(
                            path = %entry.path.display(),
                            symbols = count,
                            "registered file symbols"
                        );
                    }
                }
                Err(e) => {
                    warn!("failed to parse {}: {e}", entry.path.display());
                    self.record_error(&e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            parsed = summary.parsed,
            skipped = summary.skipped,
            failed = summary.failed,
            "parse pass complete"
        );
        summary
    }

    fn parse_one(&mut self, entry: &DiscoveredFile) -> Result<FileId> {
        let source = fs::read_to_string(&entry.path)?;
        let language = entry
            .language
            .filter(|l| *l != Language::Unknown)
            .unwrap_or_else(|| Language::detect(&entry.path, &source));
        if language == Language::Unknown {
            return Err(Error::unknown_language(entry.path.to_string_lossy()));
        }

        let fingerprint = XxHash3_128::oneshot(source.as_bytes());
        let ast = build_ast(language, &entry.path, &source)?;
        let file = self.asts.insert(ast);
        self.parsed.insert(entry.path.clone(), file);
        self.fingerprints.insert(entry.path.clone(), fingerprint);
        Ok(file)
    }

    /// Chase a parsed file's include/import edges, queueing targets one
    /// level deeper. Missing targets are routine and only logged.
    fn process_includes(&mut self, file: FileId, depth: usize) {
        let plans: Vec<IncludePlan> = match self.asts.ast(file) {
            Some(ast) => includes::plan_includes(ast, &self.config),
            None => return,
        };
        let source_path = match self.asts.ast(file) {
            Some(ast) => ast.file_path().to_path_buf(),
            None => return,
        };

        for plan in plans {
            let Some(target) = plan.candidates.iter().find(|c| c.is_file()) else {
                debug!(
                    from = %source_path.display(),
                    written = %plan.written,
                    "include target not found"
                );
                continue;
            };

            match self.add_file_at_depth(target, plan.language, depth + 1) {
                Ok(()) => {
                    let targets = self.dependencies.entry(source_path.clone()).or_default();
                    if !targets.contains(target) {
                        targets.push(target.clone());
                    }
                }
                Err(Error::IncludeDepth { .. }) => {
                    warn!(
                        from = %source_path.display(),
                        target = %target.display(),
                        "include depth limit reached, dropping"
                    );
                }
                Err(e) => warn!("include chase failed for {}: {e}", target.display()),
            }
        }
    }

    /// Resolve references across every parsed file.
    pub fn resolve_references(&mut self) -> ResolutionStatus {
        self.registry.resolve_all(&mut self.asts, &self.index)
    }

    /// Remove a file: symbols first, then the AST (stale edges in other
    /// files are pruned), then discovery and dependency state.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let normalized = self.normalize(path.as_ref())?;
        let Some(file) = self.parsed.remove(&normalized) else {
            let error = Error::invalid_path(format!("not in project: {}", normalized.display()));
            self.record_error(&error);
            return Err(error);
        };

        self.index.remove_by_file(&normalized);
        self.asts.remove(file);
        self.discovered.retain(|f| f.path != normalized);
        self.fingerprints.remove(&normalized);
        self.dependencies.remove(&normalized);
        for targets in self.dependencies.values_mut() {
            targets.retain(|t| t != &normalized);
        }
        debug!(path = %normalized.display(), "file removed");
        Ok(())
    }

    /// Re-read a file and reparse it when its content changed.
    ///
    /// Returns true when a reparse happened.
    pub fn refresh_file(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let normalized = self.normalize(path.as_ref())?;
        let source = fs::read_to_string(&normalized)?;
        let fingerprint = XxHash3_128::oneshot(source.as_bytes());
        if self.fingerprints.get(&normalized) == Some(&fingerprint) {
            return Ok(false);
        }

        let language = self
            .parsed
            .get(&normalized)
            .and_then(|file| self.asts.ast(*file))
            .map(|ast| ast.language());
        if self.parsed.contains_key(&normalized) {
            self.remove_file(&normalized)?;
        }
        match language {
            Some(language) => self.add_file_with_language(&normalized, language)?,
            None => self.add_file(&normalized)?,
        }
        self.parse_all_files();
        Ok(true)
    }

    /// Record an explicit dependency edge between two project files,
    /// queueing either side if it is not yet known.
    pub fn add_dependency(
        &mut self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<()> {
        let source = self.normalize(source.as_ref())?;
        let target = self.normalize(target.as_ref())?;
        for path in [&source, &target] {
            if !self.discovered.iter().any(|f| &f.path == path) {
                self.add_file(path)?;
            }
        }
        let targets = self.dependencies.entry(source).or_default();
        if !targets.contains(&target) {
            targets.push(target);
        }
        Ok(())
    }

    /// Copied list of the files `path` depends on.
    pub fn get_dependencies(&self, path: impl AsRef<Path>) -> Vec<PathBuf> {
        self.normalize(path.as_ref())
            .ok()
            .and_then(|p| self.dependencies.get(&p).cloned())
            .unwrap_or_default()
    }

    // --- host surface ---

    /// Exact-match symbol lookup.
    pub fn lookup_symbol(&self, qualified_name: &str) -> Option<&SymbolEntry> {
        self.index.lookup(qualified_name)
    }

    /// Scope-aware symbol lookup.
    pub fn scope_lookup(
        &self,
        name: &str,
        current_scope: Option<&str>,
        language: Language,
    ) -> Option<&SymbolEntry> {
        self.index.scope_lookup(name, current_scope, language)
    }

    /// Every symbol of a kind.
    pub fn symbols_by_kind(&self, kind: NodeKind) -> Vec<&SymbolEntry> {
        self.index.get_by_kind(kind)
    }

    /// Every node holding a resolved reference to `target`.
    pub fn find_references(&self, target: NodeHandle) -> Vec<NodeHandle> {
        let mut found = Vec::new();
        for (file, ast) in self.asts.iter() {
            for (id, node) in ast.iter() {
                if node.references.iter().any(|r| r.target == target) {
                    found.push(NodeHandle { file, node: id });
                }
            }
        }
        found
    }

    pub fn ast(&self, path: impl AsRef<Path>) -> Option<&Ast> {
        let normalized = self.normalize(path.as_ref()).ok()?;
        let file = self.parsed.get(&normalized)?;
        self.asts.ast(*file)
    }

    pub fn file_id(&self, path: impl AsRef<Path>) -> Option<FileId> {
        let normalized = self.normalize(path.as_ref()).ok()?;
        self.parsed.get(&normalized).copied()
    }

    pub fn asts(&self) -> &AstSet {
        &self.asts
    }

    pub fn symbol_index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Mutable registry access, for custom resolver installation.
    pub fn registry_mut(&mut self) -> &mut ResolverRegistry {
        &mut self.registry
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats {
            files_discovered: self.discovered.len(),
            files_parsed: self.asts.len(),
            symbols: self.index.len(),
            resolution: self.registry.stats().clone(),
        }
    }
}
