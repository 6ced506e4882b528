//! Deferred alias resolution.
//!
//! While variables are being created, alias values (`{color.gray.50}`) may
//! point at variables that do not exist yet. The reconciler records each
//! one with [`AliasResolver::register_alias`] and writes a placeholder.
//! Once every collection has been created, [`AliasResolver::resolve_all`]
//! looks each expression up against the complete graph and returns the
//! assignments to apply.
//!
//! ## Lifecycle
//!
//! ```text
//! Collecting --resolve_all--> Resolving --> Drained
//!     ^                                       |
//!     +---------------- clear ----------------+
//! ```
//!
//! When the full name misses, up to two leading segments are dropped, but
//! only segments that name a collection or mode ([`Qualifiers`]).
//!
//! Registering outside `Collecting` or resolving twice is an error.
//! Cycles (A aliases B, B aliases A) are not detected; each alias is a
//! pointer and resolves independently.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use tokensync_host::{HostCollection, HostVariable};

/// Where the resolver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverState {
    Collecting,
    Resolving,
    Drained,
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverState::Collecting => write!(f, "collecting"),
            ResolverState::Resolving => write!(f, "resolving"),
            ResolverState::Drained => write!(f, "drained"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
    #[error("cannot register an alias while the resolver is {state}")]
    NotCollecting { state: ResolverState },

    #[error("aliases were already resolved for this pass; clear the resolver first")]
    AlreadyResolved,
}

/// A pending forward reference recorded during variable creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AliasReference {
    pub owner_variable_id: String,
    pub mode_id: String,
    pub target_expression: String,
}

/// Set `variable_id`'s value in `mode_id` to an alias of `target_id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AliasAssignment {
    pub variable_id: String,
    pub mode_id: String,
    pub target_id: String,
}

/// An alias whose target could not be found; its placeholder stays.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnresolvedAlias {
    pub variable_id: String,
    pub mode_id: String,
    pub expression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AliasResolution {
    pub resolved_count: usize,
    pub failed_count: usize,
    pub warnings: Vec<UnresolvedAlias>,
    pub assignments: Vec<AliasAssignment>,
}

/// Collection and mode names that may prefix an alias expression.
/// Compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers {
    names: HashSet<String>,
}

impl Qualifiers {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Qualifiers {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Every collection name and mode name in the graph.
    pub fn from_collections(collections: &[HostCollection]) -> Self {
        Self::new(
            collections
                .iter()
                .flat_map(|c| std::iter::once(&c.name).chain(c.modes.iter().map(|m| &m.name))),
        )
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.names.contains(&segment.to_lowercase())
    }
}

#[derive(Debug)]
pub struct AliasResolver {
    state: ResolverState,
    pending: Vec<AliasReference>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasResolver {
    pub fn new() -> Self {
        AliasResolver {
            state: ResolverState::Collecting,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Queue an alias for resolution once all variables exist.
    pub fn register_alias(
        &mut self,
        owner_variable_id: &str,
        mode_id: &str,
        target_expression: &str,
    ) -> Result<(), AliasError> {
        if self.state != ResolverState::Collecting {
            return Err(AliasError::NotCollecting { state: self.state });
        }
        self.pending.push(AliasReference {
            owner_variable_id: owner_variable_id.to_string(),
            mode_id: mode_id.to_string(),
            target_expression: target_expression.to_string(),
        });
        Ok(())
    }

    /// Resolve every queued alias against the complete post-creation graph.
    ///
    /// Pure with respect to the graph: the caller applies the returned
    /// assignments. Output is sorted, so registration order never affects it.
    pub fn resolve_all(
        &mut self,
        graph: &[HostVariable],
        qualifiers: &Qualifiers,
    ) -> Result<AliasResolution, AliasError> {
        match self.state {
            ResolverState::Collecting => {}
            ResolverState::Resolving | ResolverState::Drained => {
                return Err(AliasError::AlreadyResolved);
            }
        }
        self.state = ResolverState::Resolving;

        let lookup = NameLookup::new(graph, qualifiers);
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort();
        pending.dedup();

        let mut resolution = AliasResolution::default();
        for reference in pending {
            let owner_collection = lookup.collection_of(&reference.owner_variable_id);
            let target = normalize_expression(&reference.target_expression);
            match lookup.find(&target, owner_collection, &reference.owner_variable_id) {
                Some(target_id) => {
                    resolution.resolved_count += 1;
                    resolution.assignments.push(AliasAssignment {
                        variable_id: reference.owner_variable_id,
                        mode_id: reference.mode_id,
                        target_id: target_id.to_string(),
                    });
                }
                None => {
                    resolution.failed_count += 1;
                    resolution.warnings.push(UnresolvedAlias {
                        variable_id: reference.owner_variable_id,
                        mode_id: reference.mode_id,
                        expression: reference.target_expression,
                    });
                }
            }
        }

        self.state = ResolverState::Drained;
        Ok(resolution)
    }

    /// Drop any pending aliases and return to `Collecting`.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.state = ResolverState::Collecting;
    }
}

/// Strip the `{}` wrapper and convert dot notation to a slash-delimited name.
pub fn normalize_expression(expr: &str) -> String {
    let trimmed = expr.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    inner.trim().replace('.', "/")
}

/// Display name to variables, over the whole graph.
struct NameLookup<'g> {
    by_name: HashMap<&'g str, Vec<&'g HostVariable>>,
    collection_by_id: HashMap<&'g str, &'g str>,
    qualifiers: &'g Qualifiers,
}

impl<'g> NameLookup<'g> {
    fn new(graph: &'g [HostVariable], qualifiers: &'g Qualifiers) -> Self {
        let mut by_name: HashMap<&str, Vec<&HostVariable>> = HashMap::new();
        let mut collection_by_id = HashMap::new();
        for v in graph {
            by_name.entry(v.name.as_str()).or_default().push(v);
            collection_by_id.insert(v.id.as_str(), v.collection_id.as_str());
        }
        NameLookup {
            by_name,
            collection_by_id,
            qualifiers,
        }
    }

    fn collection_of(&self, variable_id: &str) -> Option<&'g str> {
        self.collection_by_id.get(variable_id).copied()
    }

    /// Full name first, then with one and two leading qualifiers stripped.
    fn find(&self, name: &str, owner_collection: Option<&str>, owner_id: &str) -> Option<&'g str> {
        let segments: Vec<&str> = name.split('/').collect();
        let mut skip = 0;
        loop {
            let candidate = segments[skip..].join("/");
            if let Some(id) = self.find_exact(&candidate, owner_collection, owner_id) {
                return Some(id);
            }
            let strippable = skip < 2
                && skip + 1 < segments.len()
                && self.qualifiers.contains(segments[skip]);
            if !strippable {
                return None;
            }
            skip += 1;
        }
    }

    fn find_exact(
        &self,
        name: &str,
        owner_collection: Option<&str>,
        owner_id: &str,
    ) -> Option<&'g str> {
        let candidates: Vec<&HostVariable> = self
            .by_name
            .get(name)?
            .iter()
            .copied()
            .filter(|v| v.id != owner_id)
            .collect();
        candidates
            .iter()
            .copied()
            .find(|v| Some(v.collection_id.as_str()) == owner_collection)
            .or_else(|| candidates.first().copied())
            .map(|v| v.id.as_str())
    }
}
