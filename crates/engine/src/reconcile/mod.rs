//! Import a baseline snapshot into a live host graph.
//!
//! Collections, then modes, then variables are matched against what the
//! host already holds (recorded origin first, display name second) and
//! created only when nothing matches. Alias values are deferred to an
//! [`AliasResolver`] and resolved once every collection has been created.
//!
//! Collections are reconciled one after another; every host call is
//! awaited before the matching logic that depends on it.

pub mod coerce;
pub mod matching;
pub mod naming;

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tokensync_host::{HostCollection, HostGraph, HostMode, HostValue, HostVariable, ValueKind};
use tokensync_interchange::{BaselineSnapshot, TokenEntry};

use crate::alias::{AliasResolver, Qualifiers};
use crate::error::EngineError;
use coerce::{coerce, kind_for_type, placeholder};
use matching::{default_strategies, find_match, Candidate, EntityIndex, MatchStrategy, MatchedBy};
use naming::variable_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Match incoming entities against existing ones. When false every
    /// collection, mode, and variable is created fresh.
    pub match_existing: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            match_existing: true,
        }
    }
}

/// A non-fatal problem found during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileWarning {
    /// The snapshot came from a different source file than the one the
    /// graph was last imported from; everything was created fresh.
    IdentityMismatch { recorded: String, incoming: String },
    /// A value did not fit its kind and the kind's default was written.
    ValueCoercion {
        collection: String,
        variable: String,
        mode: String,
        message: String,
    },
    /// An alias target was not found; the placeholder value stays.
    UnresolvedAlias {
        variable_id: String,
        mode_id: String,
        expression: String,
    },
}

impl fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileWarning::IdentityMismatch { recorded, incoming } => write!(
                f,
                "source identity mismatch (graph: '{}', snapshot: '{}'); created new entities",
                recorded, incoming
            ),
            ReconcileWarning::ValueCoercion {
                collection,
                variable,
                mode,
                message,
            } => write!(
                f,
                "{}/{} [{}]: {}; default substituted",
                collection, variable, mode, message
            ),
            ReconcileWarning::UnresolvedAlias {
                variable_id,
                mode_id,
                expression,
            } => write!(
                f,
                "unresolved alias {} on {} [{}]",
                expression, variable_id, mode_id
            ),
        }
    }
}

/// Counts and warnings from one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub collections_created: usize,
    pub collections_updated: usize,
    pub modes_created: usize,
    pub modes_updated: usize,
    pub variables_created: usize,
    pub variables_updated: usize,
    pub aliases_resolved: usize,
    pub aliases_failed: usize,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReconcileResult {
    /// True when the pass created no collection, mode, or variable.
    pub fn created_nothing(&self) -> bool {
        self.collections_created == 0 && self.modes_created == 0 && self.variables_created == 0
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!(
                "Collections: {} created, {} updated",
                self.collections_created, self.collections_updated
            ),
            format!(
                "Modes: {} created, {} updated",
                self.modes_created, self.modes_updated
            ),
            format!(
                "Variables: {} created, {} updated",
                self.variables_created, self.variables_updated
            ),
            format!(
                "Aliases: {} resolved, {} unresolved",
                self.aliases_resolved, self.aliases_failed
            ),
        ];
        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!("Warnings ({}):", self.warnings.len()));
            for w in &self.warnings {
                lines.push(format!("  - {}", w));
            }
        }
        lines.join("\n")
    }
}

/// Reconcile `incoming` into `host`.
///
/// Fails only on host errors. Identity mismatches, coercion fallbacks,
/// and unresolved aliases are reported as warnings. Dropping the returned
/// future before it completes abandons the pass; entities created so far
/// are left in place and no aliases are applied.
pub async fn reconcile<H>(
    host: &H,
    incoming: &BaselineSnapshot,
    options: ReconcileOptions,
) -> Result<ReconcileResult, EngineError>
where
    H: HostGraph + ?Sized,
{
    let mut result = ReconcileResult::default();
    let mut match_existing = options.match_existing;

    let recorded = host.source_identity().await?;
    if let (Some(recorded), Some(snapshot_identity)) = (
        recorded.as_deref(),
        incoming.metadata.source_identity.as_deref(),
    ) {
        if match_existing && recorded != snapshot_identity {
            tracing::warn!(
                "Source identity mismatch: graph '{}', snapshot '{}'; creating new entities",
                recorded,
                snapshot_identity
            );
            result.warnings.push(ReconcileWarning::IdentityMismatch {
                recorded: recorded.to_string(),
                incoming: snapshot_identity.to_string(),
            });
            match_existing = false;
        }
    }

    let (mut existing_collections, existing_variables) = if match_existing {
        (host.list_collections().await?, host.list_variables().await?)
    } else {
        (Vec::new(), Vec::new())
    };

    // Collections imported from another source file are never matched,
    // not even by name.
    if let Some(identity) = incoming.metadata.source_identity.as_deref() {
        let before = existing_collections.len();
        existing_collections.retain(|c| {
            c.original_id
                .as_deref()
                .and_then(origin_scope)
                .map_or(true, |scope| scope == identity)
        });
        let foreign = before - existing_collections.len();
        if foreign > 0 {
            tracing::debug!(
                "Skipping {} collection(s) imported from other sources",
                foreign
            );
        }
    }

    let plan = plan_collections(incoming);
    tracing::info!(
        "Reconciling {} collection(s), {} entries (match existing: {})",
        plan.len(),
        incoming.len(),
        match_existing
    );

    let mut collection_index = EntityIndex::new(
        existing_collections,
        |c: &HostCollection| c.original_id.clone(),
        |c: &HostCollection| c.name.clone(),
    );
    let mut pass = Pass {
        host,
        result,
        resolver: AliasResolver::new(),
        existing_variables,
    };
    for collection in &plan {
        pass.collection(collection, &mut collection_index).await?;
    }

    // Aliases resolve only after every collection exists.
    let graph = host.list_variables().await?;
    let qualifiers = Qualifiers::from_collections(&host.list_collections().await?);
    let resolution = pass.resolver.resolve_all(&graph, &qualifiers)?;
    for assignment in &resolution.assignments {
        host.set_value_for_mode(
            &assignment.variable_id,
            &assignment.mode_id,
            HostValue::Alias {
                variable_id: assignment.target_id.clone(),
            },
        )
        .await?;
    }
    pass.resolver.clear();

    let mut result = pass.result;
    result.aliases_resolved = resolution.resolved_count;
    result.aliases_failed = resolution.failed_count;
    for unresolved in resolution.warnings {
        tracing::warn!(
            "Unresolved alias {} on variable {}",
            unresolved.expression,
            unresolved.variable_id
        );
        result.warnings.push(ReconcileWarning::UnresolvedAlias {
            variable_id: unresolved.variable_id,
            mode_id: unresolved.mode_id,
            expression: unresolved.expression,
        });
    }

    if let Some(identity) = incoming.metadata.source_identity.as_deref() {
        host.set_source_identity(identity).await?;
    }

    tracing::info!(
        "Reconciled: {} collection(s) created, {} variable(s) created, {} updated, {} warning(s)",
        result.collections_created,
        result.variables_created,
        result.variables_updated,
        result.warnings.len()
    );
    Ok(result)
}

// ── Incoming plan ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct IncomingMode {
    name: String,
    original_id: String,
}

/// Entries sharing a computed name within one collection: one variable
/// with a value per mode.
#[derive(Debug)]
struct IncomingVariable<'a> {
    name: String,
    original_id: String,
    kind: ValueKind,
    entries: Vec<&'a TokenEntry>,
}

#[derive(Debug)]
struct IncomingCollection<'a> {
    name: String,
    original_id: String,
    modes: Vec<IncomingMode>,
    variables: Vec<IncomingVariable<'a>>,
}

/// Separates the source identity from the raw id in a recorded
/// collection origin.
const ORIGIN_SCOPE: &str = "::";

/// The origin recorded for a collection: the raw collection id, prefixed
/// with the source identity when the snapshot carries one.
fn scoped_origin(source: Option<&str>, raw: &str) -> String {
    match source {
        Some(identity) => format!("{}{}{}", identity, ORIGIN_SCOPE, raw),
        None => raw.to_string(),
    }
}

/// The source identity a recorded origin is scoped to, if any.
fn origin_scope(origin: &str) -> Option<&str> {
    origin.rsplit_once(ORIGIN_SCOPE).map(|(scope, _)| scope)
}

fn plan_collections(snapshot: &BaselineSnapshot) -> Vec<IncomingCollection<'_>> {
    let source = snapshot.metadata.source_identity.as_deref();
    snapshot
        .collection_names()
        .into_iter()
        .map(|collection| {
            let entries: Vec<&TokenEntry> = snapshot
                .iter()
                .filter(|e| e.collection == collection)
                .collect();

            let raw_id = entries
                .iter()
                .find_map(|e| e.collection_id.as_deref())
                .unwrap_or(collection);
            let original_id = scoped_origin(source, raw_id);

            let mut modes: Vec<IncomingMode> = Vec::new();
            for e in &entries {
                if !modes.iter().any(|m| m.name == e.mode) {
                    modes.push(IncomingMode {
                        name: e.mode.clone(),
                        original_id: e.mode_id.clone().unwrap_or_else(|| e.mode.clone()),
                    });
                }
            }

            let mut grouped: BTreeMap<String, IncomingVariable> = BTreeMap::new();
            for e in entries {
                let name = variable_name(e);
                grouped
                    .entry(name.clone())
                    .or_insert_with(|| IncomingVariable {
                        name,
                        original_id: e.variable_id.to_string(),
                        kind: kind_for_type(&e.token_type),
                        entries: Vec::new(),
                    })
                    .entries
                    .push(e);
            }

            IncomingCollection {
                name: collection.to_string(),
                original_id,
                modes,
                variables: grouped.into_values().collect(),
            }
        })
        .collect()
}

// ── Pass state ───────────────────────────────────────────────────────────────

struct Pass<'h, H: ?Sized> {
    host: &'h H,
    result: ReconcileResult,
    resolver: AliasResolver,
    existing_variables: Vec<HostVariable>,
}

impl<H> Pass<'_, H>
where
    H: HostGraph + ?Sized,
{
    async fn collection(
        &mut self,
        incoming: &IncomingCollection<'_>,
        index: &mut EntityIndex<HostCollection>,
    ) -> Result<(), EngineError> {
        let candidate = Candidate {
            original_id: incoming.original_id.clone(),
            name_key: incoming.name.clone(),
        };
        let (collection, created) = match find_match(&candidate, index, &default_strategies()) {
            Some((existing, by)) => {
                tracing::debug!("Matched collection '{}' by {:?}", incoming.name, by);
                self.result.collections_updated += 1;
                (existing, false)
            }
            None => {
                tracing::debug!("Creating collection '{}'", incoming.name);
                self.result.collections_created += 1;
                (self.host.create_collection(&incoming.name).await?, true)
            }
        };
        self.host
            .set_collection_origin(&collection.id, &incoming.original_id)
            .await?;

        let mode_ids = self.modes(&collection, &incoming.modes, created).await?;
        self.variables(&collection, incoming, &mode_ids, created)
            .await
    }

    /// Returns incoming mode name to host mode id.
    async fn modes(
        &mut self,
        collection: &HostCollection,
        incoming: &[IncomingMode],
        created: bool,
    ) -> Result<HashMap<String, String>, EngineError> {
        let mut mode_ids = HashMap::new();
        let mut index = if created {
            EntityIndex::empty()
        } else {
            EntityIndex::new(
                collection.modes.clone(),
                |m: &HostMode| m.original_id.clone(),
                |m: &HostMode| m.name.clone(),
            )
        };
        let strategies = default_strategies();

        for (position, mode) in incoming.iter().enumerate() {
            let candidate = Candidate {
                original_id: mode.original_id.clone(),
                name_key: mode.name.clone(),
            };
            let mode_id = match find_match(&candidate, &mut index, &strategies) {
                Some((existing, by)) => {
                    if existing.name != mode.name {
                        tracing::debug!("Renaming mode '{}' to '{}'", existing.name, mode.name);
                        self.host
                            .rename_mode(&collection.id, &existing.mode_id, &mode.name)
                            .await?;
                    } else {
                        tracing::debug!("Matched mode '{}' by {:?}", mode.name, by);
                    }
                    self.result.modes_updated += 1;
                    existing.mode_id
                }
                None if created && position == 0 => {
                    // New collections come with one implicit mode; take it over.
                    self.host
                        .rename_mode(&collection.id, &collection.default_mode_id, &mode.name)
                        .await?;
                    self.result.modes_created += 1;
                    collection.default_mode_id.clone()
                }
                None => {
                    tracing::debug!("Adding mode '{}' to '{}'", mode.name, collection.name);
                    self.result.modes_created += 1;
                    self.host.add_mode(&collection.id, &mode.name).await?.mode_id
                }
            };
            self.host
                .set_mode_origin(&collection.id, &mode_id, &mode.original_id)
                .await?;
            mode_ids.insert(mode.name.clone(), mode_id);
        }
        Ok(mode_ids)
    }

    async fn variables(
        &mut self,
        collection: &HostCollection,
        incoming: &IncomingCollection<'_>,
        mode_ids: &HashMap<String, String>,
        created: bool,
    ) -> Result<(), EngineError> {
        let mut index = if created {
            EntityIndex::empty()
        } else {
            let scoped: Vec<HostVariable> = self
                .existing_variables
                .iter()
                .filter(|v| v.collection_id == collection.id)
                .cloned()
                .collect();
            EntityIndex::new(
                scoped,
                |v: &HostVariable| v.original_id.clone(),
                |v: &HostVariable| format!("{}:{}", incoming.name, v.name),
            )
        };
        let strategies: Vec<(MatchedBy, MatchStrategy<HostVariable>)> = default_strategies();

        for variable in &incoming.variables {
            let candidate = Candidate {
                original_id: variable.original_id.clone(),
                name_key: format!("{}:{}", incoming.name, variable.name),
            };
            let host_variable = match find_match(&candidate, &mut index, &strategies) {
                Some((existing, by)) => {
                    if existing.name != variable.name {
                        tracing::debug!(
                            "Renaming variable '{}' to '{}'",
                            existing.name,
                            variable.name
                        );
                        self.host
                            .rename_variable(&existing.id, &variable.name)
                            .await?;
                    } else {
                        tracing::debug!("Matched variable '{}' by {:?}", variable.name, by);
                    }
                    self.result.variables_updated += 1;
                    existing
                }
                None => {
                    tracing::debug!("Creating variable '{}'", variable.name);
                    self.result.variables_created += 1;
                    self.host
                        .create_variable(&variable.name, &collection.id, variable.kind)
                        .await?
                }
            };
            self.host
                .set_variable_origin(&host_variable.id, &variable.original_id)
                .await?;

            for entry in &variable.entries {
                let Some(mode_id) = mode_ids.get(&entry.mode) else {
                    continue;
                };
                let value = self.value_for(&host_variable, entry, mode_id, &incoming.name)?;
                self.host
                    .set_value_for_mode(&host_variable.id, mode_id, value)
                    .await?;
            }
        }
        Ok(())
    }

    /// The value to write now: the coerced value, or a placeholder for an
    /// alias that is queued for resolution.
    fn value_for(
        &mut self,
        variable: &HostVariable,
        entry: &TokenEntry,
        mode_id: &str,
        collection: &str,
    ) -> Result<HostValue, EngineError> {
        if let Some(expr) = entry.value.as_str().filter(|_| entry.is_alias()) {
            self.resolver.register_alias(&variable.id, mode_id, expr)?;
            return Ok(placeholder(variable.kind));
        }
        let coerced = coerce(variable.kind, &entry.value);
        if let Some(message) = coerced.problem {
            tracing::warn!(
                "Coercing {}/{} [{}]: {}",
                collection,
                variable.name,
                entry.mode,
                message
            );
            self.result.warnings.push(ReconcileWarning::ValueCoercion {
                collection: collection.to_string(),
                variable: variable.name.clone(),
                mode: entry.mode.clone(),
                message,
            });
        }
        Ok(coerced.value)
    }
}
