//! Reference kinds, resolution outcomes, and resolver bookkeeping.

use crate::ast::{AstSet, NodeHandle};
use crate::language::Language;
use crate::symbols::SymbolIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Kind of reference from a use site to a definition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefKind {
    Call,
    Type,
    Inheritance,
    Import,
    Implementation,
    Override,
    Use,
    Extension,
    Template,
    Unknown,
}

/// Outcome classification of a resolution attempt
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStatus {
    Success,
    NotFound,
    Ambiguous,
    Circular,
    Error,
}

impl ResolutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionStatus::Success)
    }
}

/// What a resolver produced for one pending reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Target located; the dispatcher appends a reference edge.
    Target(NodeHandle),
    /// Considered resolved without an edge (primitive types, accepted
    /// external imports).
    Intrinsic,
    NotFound,
    Ambiguous,
    Circular,
}

impl Resolution {
    pub fn status(&self) -> ResolutionStatus {
        match self {
            Resolution::Target(_) | Resolution::Intrinsic => ResolutionStatus::Success,
            Resolution::NotFound => ResolutionStatus::NotFound,
            Resolution::Ambiguous => ResolutionStatus::Ambiguous,
            Resolution::Circular => ResolutionStatus::Circular,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }
}

/// Per-language resolution counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCounters {
    pub total: u64,
    pub resolved: u64,
}

impl LanguageCounters {
    pub fn unresolved(&self) -> u64 {
        self.total - self.resolved
    }
}

/// Aggregate resolution statistics.
///
/// `unresolved` is derived from `total - resolved`, so the accounting
/// invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total: u64,
    pub resolved: u64,
    pub by_language: BTreeMap<Language, LanguageCounters>,
}

impl ResolutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unresolved(&self) -> u64 {
        self.total - self.resolved
    }

    /// Record one resolution attempt.
    pub fn record(&mut self, language: Language, status: ResolutionStatus) {
        self.total += 1;
        let counters = self.by_language.entry(language).or_default();
        counters.total += 1;
        if status.is_success() {
            self.resolved += 1;
            counters.resolved += 1;
        }
    }
}

/// Behavioral switches handed to resolvers by the driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    /// When false, imports of modules outside the project are accepted
    /// without an edge instead of counting as unresolved.
    pub resolve_external_symbols: bool,
}

/// One pending reference presented to a resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Node carrying the pending reference.
    pub node: NodeHandle,
    pub ref_kind: RefKind,
    /// Name as written at the use site.
    pub name: &'a str,
    /// Language to resolve in.
    pub language: Language,
    /// Qualified name of the enclosing scope, if any.
    pub scope: Option<&'a str>,
}

/// Read-only project state available during resolution.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub index: &'a SymbolIndex,
    pub asts: &'a AstSet,
    pub options: ResolverOptions,
}
