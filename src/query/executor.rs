//! Execution delegation
//!
//! The criteria builder does no engine work itself. On execute it hands a
//! fully resolved, immutable [`FinalizedQuery`] to a [`SearchExecutor`],
//! which owns indexing, scoring, and result materialization.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::clause::ClauseGroup;
use super::sort::ResolvedSortField;
use crate::config::QueryOptions;
use crate::error::Result;
use crate::schema::FieldRegistry;

/// Result projection selection
///
/// Selection states are mutually exclusive; later fluent calls overwrite
/// earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelection {
    /// Load every stored field (the default)
    #[default]
    All,
    /// Load only the named fields
    Fields(BTreeSet<String>),
}

impl FieldSelection {
    /// Select an explicit set of fields
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSelection::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Select a single field
    pub fn single(name: impl Into<String>) -> Self {
        FieldSelection::Fields(BTreeSet::from([name.into()]))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FieldSelection::All)
    }
}

/// The finished query handed to the execution engine
///
/// All clauses are concrete; deferred nodes were evaluated during
/// finalization. Category scoping, when requested, is already applied as the
/// leading must clause of `root`.
#[derive(Clone, Debug)]
pub struct FinalizedQuery {
    pub root: ClauseGroup,
    pub sort_fields: Vec<ResolvedSortField>,
    pub fields_to_load: FieldSelection,
}

impl fmt::Display for FinalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

/// A single matching document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: u64,
    pub score: f32,
    /// Stored fields loaded per the query's field selection
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl SearchHit {
    pub fn new(doc_id: u64, score: f32) -> Self {
        Self {
            doc_id,
            score,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, serde_json::Value>) -> Self {
        self.fields = fields;
        self
    }
}

/// Materialized results returned by the execution engine
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub total_hits: u64,
}

static EMPTY_RESULTS: Lazy<Arc<SearchResults>> = Lazy::new(|| Arc::new(SearchResults::default()));

impl SearchResults {
    /// Canonical empty results: zero matches, zero cost
    ///
    /// One shared instance for the whole process; every caller receives a
    /// clone of the same `Arc`.
    pub fn empty() -> Arc<SearchResults> {
        Arc::clone(&EMPTY_RESULTS)
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Execution engine boundary
///
/// Receives the finalized query, the registry the query was built against,
/// and result-shaping options; returns materialized results.
pub trait SearchExecutor: Send + Sync {
    fn execute(
        &self,
        query: &FinalizedQuery,
        registry: &FieldRegistry,
        options: &QueryOptions,
    ) -> Result<Arc<SearchResults>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::clause::{Clause, Occurrence};
    use crate::query::fragment::Fragment;

    #[test]
    fn test_empty_results_shared_instance() {
        let first = SearchResults::empty();
        let second = SearchResults::empty();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_empty());
        assert_eq!(first.total_hits, 0);
    }

    #[test]
    fn test_field_selection_states() {
        assert!(FieldSelection::All.is_all());
        assert_eq!(
            FieldSelection::single("title"),
            FieldSelection::fields(["title"])
        );
        assert!(!FieldSelection::single("title").is_all());
    }

    #[test]
    fn test_finalized_query_display() {
        let mut root = ClauseGroup::new();
        root.push(Clause::concrete(
            Fragment::term("__category", "Article"),
            Occurrence::Must,
        ));
        root.push(Clause::concrete(
            Fragment::term("status", "published"),
            Occurrence::Must,
        ));

        let query = FinalizedQuery {
            root,
            sort_fields: Vec::new(),
            fields_to_load: FieldSelection::All,
        };

        assert_eq!(query.to_string(), "+__category:Article +status:published");
    }

    #[test]
    fn test_search_hit_serialization() {
        let hit = SearchHit::new(42, 0.9)
            .with_fields(BTreeMap::from([(
                "title".to_string(),
                serde_json::json!("Hello"),
            )]));

        let json = serde_json::to_string(&hit).unwrap();
        let parsed: SearchHit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.doc_id, 42);
        assert_eq!(parsed.fields["title"], serde_json::json!("Hello"));
    }
}
