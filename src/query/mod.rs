//! Deferred boolean query composition
//!
//! This module provides the fluent criteria surface for building search
//! requests:
//! - Field, range, and managed (type-dispatched free-text) clauses
//! - Must / should / must-not occurrence chaining with nested groups
//! - Sort and field-selection state threaded through to execution
//! - Category scoping applied at finalize time
//!
//! Clauses are captured without touching engine internals; fragments that
//! depend on the field registry are deferred and evaluated once, when the
//! query is finalized.

pub mod builder;
pub mod clause;
pub mod executor;
pub mod fragment;
pub mod sort;

pub use builder::{BooleanOperation, FluentQuery, GroupBuilder, SearchQuery, CATEGORY_FIELD};
pub use clause::{Clause, ClauseGroup, DeferredQuery, Occurrence, QueryFragment};
pub use executor::{FieldSelection, FinalizedQuery, SearchExecutor, SearchHit, SearchResults};
pub use fragment::Fragment;
pub use sort::{
    resolve_sort_fields, ResolvedSortField, SortFieldKind, SortType, SortableField,
};
