//! Clause accumulation for boolean groups
//!
//! Fluent calls append `(fragment, occurrence)` pairs to an ordered group
//! without touching engine internals. Fragments may be deferred: their
//! concrete form is produced lazily at finalize time, when the field registry
//! is in its final state.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::fragment::Fragment;
use crate::error::Result;

/// Boolean-logic requirement of a clause within its group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occurrence {
    /// The clause must match (AND)
    Must,
    /// The clause should match (OR)
    Should,
    /// The clause must not match (NOT)
    MustNot,
}

impl Occurrence {
    /// Rendering prefix: `+` for must, `-` for must-not, nothing for should
    pub fn prefix(&self) -> &'static str {
        match self {
            Occurrence::Must => "+",
            Occurrence::Should => "",
            Occurrence::MustNot => "-",
        }
    }
}

/// A query fragment whose concrete form is computed lazily, once
///
/// The production function consults live state (the field registry) and runs
/// no earlier than the first finalize. The first successful result is cached;
/// failures are not cached and surface again on re-evaluation.
#[derive(Clone)]
pub struct DeferredQuery {
    producer: Arc<dyn Fn() -> Result<Option<Fragment>> + Send + Sync>,
    resolved: OnceCell<Option<Fragment>>,
}

impl DeferredQuery {
    pub fn new(producer: impl Fn() -> Result<Option<Fragment>> + Send + Sync + 'static) -> Self {
        Self {
            producer: Arc::new(producer),
            resolved: OnceCell::new(),
        }
    }

    /// Evaluate the production function
    ///
    /// `Ok(None)` means the node contributes nothing to the query.
    pub fn produce(&self) -> Result<Option<Fragment>> {
        if let Some(fragment) = self.resolved.get() {
            return Ok(fragment.clone());
        }
        let fragment = (self.producer)()?;
        Ok(self.resolved.get_or_init(|| fragment).clone())
    }
}

impl fmt::Debug for DeferredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQuery")
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

/// Concrete or deferred query fragment
#[derive(Clone, Debug)]
pub enum QueryFragment {
    Concrete(Fragment),
    Deferred(DeferredQuery),
}

impl QueryFragment {
    /// Resolve to a concrete fragment, evaluating a deferred node if needed
    pub fn resolve(&self) -> Result<Option<Fragment>> {
        match self {
            QueryFragment::Concrete(fragment) => Ok(Some(fragment.clone())),
            QueryFragment::Deferred(deferred) => deferred.produce(),
        }
    }
}

impl fmt::Display for QueryFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryFragment::Concrete(fragment) => fragment.fmt(f),
            // Display never forces evaluation
            QueryFragment::Deferred(deferred) => match deferred.resolved.get() {
                Some(Some(fragment)) => fragment.fmt(f),
                Some(None) => f.write_str("<empty>"),
                None => f.write_str("<deferred>"),
            },
        }
    }
}

/// One clause of a boolean group
///
/// Immutable once appended: the occurrence recorded at creation is never
/// changed.
#[derive(Clone, Debug)]
pub struct Clause {
    fragment: QueryFragment,
    occurrence: Occurrence,
}

impl Clause {
    pub fn concrete(fragment: Fragment, occurrence: Occurrence) -> Self {
        Self {
            fragment: QueryFragment::Concrete(fragment),
            occurrence,
        }
    }

    pub fn deferred(deferred: DeferredQuery, occurrence: Occurrence) -> Self {
        Self {
            fragment: QueryFragment::Deferred(deferred),
            occurrence,
        }
    }

    pub fn fragment(&self) -> &QueryFragment {
        &self.fragment
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }
}

/// Ordered, append-only container of clauses forming one boolean group
///
/// Clause order is irrelevant for must/should combination but preserved for
/// determinism. Groups nest through [`Fragment::Group`] with no depth limit.
#[derive(Clone, Debug, Default)]
pub struct ClauseGroup {
    clauses: Vec<Clause>,
}

impl ClauseGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Resolve every clause to its concrete form
    ///
    /// Deferred nodes producing no fragment are dropped, as are sub-groups
    /// left empty by such drops; everything else keeps its order and
    /// occurrence. Evaluation errors abort the resolution.
    pub fn resolve(&self) -> Result<ClauseGroup> {
        let mut resolved = ClauseGroup::new();
        for clause in &self.clauses {
            let fragment = match clause.fragment().resolve()? {
                None => continue,
                Some(Fragment::Group(inner)) => {
                    let inner = inner.resolve()?;
                    if inner.is_empty() {
                        continue;
                    }
                    Fragment::Group(inner)
                }
                Some(fragment) => fragment,
            };
            resolved.push(Clause::concrete(fragment, clause.occurrence()));
        }
        Ok(resolved)
    }
}

impl fmt::Display for ClauseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", clause.occurrence().prefix(), clause.fragment())?;
        }
        Ok(())
    }
}
