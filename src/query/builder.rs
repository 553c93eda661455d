//! Fluent query criteria builder
//!
//! `SearchQuery` accumulates boolean clauses through chained field, range,
//! managed-text, sort, and field-selection calls, then hands the finished
//! query to the execution engine. Clause fragments that need the field
//! registry are captured as deferred nodes and evaluated at finalize time.
//!
//! Every continuation handle returned by a fluent call holds an exclusive
//! borrow of the originating builder: chained calls mutate one shared
//! accumulator, never an independent copy.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::clause::{Clause, ClauseGroup, DeferredQuery, Occurrence};
use super::executor::{FieldSelection, FinalizedQuery, SearchExecutor, SearchResults};
use super::fragment::Fragment;
use super::sort::{resolve_sort_fields, ResolvedSortField, SortableField};
use crate::config::QueryOptions;
use crate::error::{Result, SearchcraftError};
use crate::schema::{FieldRegistry, RangeBounds, RangeValue};

/// Field name under which a document's category is indexed
pub const CATEGORY_FIELD: &str = "__category";

/// Fluent criteria builder for one logical search request
///
/// Created once per request and mutated monotonically: clauses are only ever
/// added. Calling [`execute`](SearchQuery::execute) is terminal for the
/// request's intent; mutating afterwards is not guarded against.
pub struct SearchQuery {
    registry: Arc<FieldRegistry>,
    executor: Arc<dyn SearchExecutor>,
    category: Option<String>,
    root: ClauseGroup,
    sort_fields: Vec<ResolvedSortField>,
    fields_to_load: FieldSelection,
    occurrence: Occurrence,
}

impl SearchQuery {
    /// Create a builder over the given registry and execution engine
    ///
    /// Both collaborators are injected here; the builder never reaches for
    /// ambient state.
    pub fn new(registry: Arc<FieldRegistry>, executor: Arc<dyn SearchExecutor>) -> Self {
        Self {
            registry,
            executor,
            category: None,
            root: ClauseGroup::new(),
            sort_fields: Vec::new(),
            fields_to_load: FieldSelection::All,
            occurrence: Occurrence::Must,
        }
    }

    /// Scope the whole query to a category
    ///
    /// The category filter is injected at execution time as the leading must
    /// clause; during building the accumulated clause list does not contain
    /// it, so the built list and the final rendered query intentionally
    /// differ.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Occurrence applied to clauses before the first `and`/`or`/`not`
    pub fn with_default_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.occurrence = occurrence;
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Accumulated top-level clauses
    pub fn clauses(&self) -> &ClauseGroup {
        &self.root
    }

    pub fn sort_fields(&self) -> &[ResolvedSortField] {
        &self.sort_fields
    }

    pub fn fields_to_load(&self) -> &FieldSelection {
        &self.fields_to_load
    }

    /// Match a field against an exact value
    ///
    /// Equivalent to an inclusive range query with min = max = value.
    pub fn field(&mut self, field: &str, value: impl Into<RangeValue>) -> BooleanOperation<'_> {
        let occurrence = self.occurrence;
        self.root
            .push(make_range_clause(&self.registry, &[field], RangeBounds::point(value), occurrence));
        BooleanOperation { query: self }
    }

    /// Match any of `fields` within `[min, max]`, both bounds inclusive
    pub fn range(
        &mut self,
        fields: &[&str],
        min: impl Into<RangeValue>,
        max: impl Into<RangeValue>,
    ) -> BooleanOperation<'_> {
        self.range_query(fields, Some(min.into()), Some(max.into()), true, true)
    }

    /// Match any of `fields` within the given bounds
    ///
    /// Field dispatch runs inside a deferred node: a field whose value type
    /// has no ranged-query capability for the bounds' kind fails the
    /// `execute` call with [`SearchcraftError::UnsupportedFieldType`].
    pub fn range_query(
        &mut self,
        fields: &[&str],
        min: Option<RangeValue>,
        max: Option<RangeValue>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> BooleanOperation<'_> {
        let occurrence = self.occurrence;
        let bounds = RangeBounds::new(min, max, min_inclusive, max_inclusive);
        self.root
            .push(make_range_clause(&self.registry, fields, bounds, occurrence));
        BooleanOperation { query: self }
    }

    /// Type-dispatched free-text query
    ///
    /// `fields` of `None` means the registry's full field set, captured at
    /// evaluation time. Fields whose value type has no free-text capability
    /// are skipped without error.
    pub fn managed_query(&mut self, text: &str, fields: Option<&[&str]>) -> BooleanOperation<'_> {
        let occurrence = self.occurrence;
        self.root
            .push(make_managed_clause(&self.registry, fields, text, occurrence));
        BooleanOperation { query: self }
    }

    /// Add a nested must sub-group
    pub fn and_group(&mut self, build: impl FnOnce(&mut GroupBuilder)) -> BooleanOperation<'_> {
        self.push_group(Occurrence::Must, build)
    }

    /// Add a nested should sub-group
    pub fn or_group(&mut self, build: impl FnOnce(&mut GroupBuilder)) -> BooleanOperation<'_> {
        self.push_group(Occurrence::Should, build)
    }

    /// Add a nested must-not sub-group
    pub fn not_group(&mut self, build: impl FnOnce(&mut GroupBuilder)) -> BooleanOperation<'_> {
        self.push_group(Occurrence::MustNot, build)
    }

    /// Append ascending sort keys, in priority order
    pub fn order_by(&mut self, fields: &[SortableField]) -> Result<BooleanOperation<'_>> {
        self.order_by_internal(fields, false)?;
        Ok(BooleanOperation { query: self })
    }

    /// Append descending sort keys, in priority order
    pub fn order_by_descending(&mut self, fields: &[SortableField]) -> Result<BooleanOperation<'_>> {
        self.order_by_internal(fields, true)?;
        Ok(BooleanOperation { query: self })
    }

    /// Load only the named stored fields (overwrites earlier selections)
    pub fn select_fields<I, S>(&mut self, names: I) -> BooleanOperation<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_load = FieldSelection::fields(names);
        BooleanOperation { query: self }
    }

    /// Load only one stored field (overwrites earlier selections)
    pub fn select_field(&mut self, name: impl Into<String>) -> BooleanOperation<'_> {
        self.fields_to_load = FieldSelection::single(name);
        BooleanOperation { query: self }
    }

    /// Load every stored field (overwrites earlier selections)
    pub fn select_all_fields(&mut self) -> BooleanOperation<'_> {
        self.fields_to_load = FieldSelection::All;
        BooleanOperation { query: self }
    }

    /// Finalize the accumulated tree and run it on the execution engine
    ///
    /// An empty accumulated clause list short-circuits to the canonical empty
    /// results without invoking the engine.
    pub fn execute(&self, options: &QueryOptions) -> Result<Arc<SearchResults>> {
        let Some(finalized) = self.finalize()? else {
            debug!("no clauses accumulated, returning canonical empty results");
            return Ok(SearchResults::empty());
        };
        debug!(query = %finalized, "executing search query");
        self.executor.execute(&finalized, &self.registry, options)
    }

    /// Evaluate deferred nodes and apply category scoping
    ///
    /// Returns `None` when there is nothing to search: an empty accumulated
    /// list signals that upstream produced no clauses (an analyzer may have
    /// stripped every term), not a request for an unscoped or category-only
    /// search.
    pub fn finalize(&self) -> Result<Option<FinalizedQuery>> {
        if self.root.is_empty() {
            return Ok(None);
        }

        let resolved = self.root.resolve()?;
        let root = match &self.category {
            Some(category) => {
                trace!(category = %category, clauses = resolved.len(), "applying category scope");
                let mut scoped = ClauseGroup::new();
                scoped.push(Clause::concrete(
                    Fragment::term(CATEGORY_FIELD, category),
                    Occurrence::Must,
                ));
                for clause in resolved.clauses() {
                    scoped.push(clause.clone());
                }
                scoped
            }
            None => resolved,
        };

        Ok(Some(FinalizedQuery {
            root,
            sort_fields: self.sort_fields.clone(),
            fields_to_load: self.fields_to_load.clone(),
        }))
    }

    fn order_by_internal(&mut self, fields: &[SortableField], descending: bool) -> Result<()> {
        let resolved = resolve_sort_fields(&self.registry, fields, descending)?;
        self.sort_fields.extend(resolved);
        Ok(())
    }

    fn push_group(
        &mut self,
        occurrence: Occurrence,
        build: impl FnOnce(&mut GroupBuilder),
    ) -> BooleanOperation<'_> {
        let mut builder = GroupBuilder {
            registry: Arc::clone(&self.registry),
            group: ClauseGroup::new(),
            occurrence: Occurrence::Must,
        };
        build(&mut builder);
        self.root
            .push(Clause::concrete(Fragment::Group(builder.group), occurrence));
        BooleanOperation { query: self }
    }
}

impl fmt::Debug for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery")
            .field("category", &self.category)
            .field("clauses", &self.root.len())
            .field("sort_fields", &self.sort_fields.len())
            .finish()
    }
}

/// Boolean-operation continuation returned by every clause-producing call
///
/// Borrows the originating [`SearchQuery`] exclusively; chaining continues on
/// the same underlying builder.
#[derive(Debug)]
pub struct BooleanOperation<'q> {
    query: &'q mut SearchQuery,
}

impl<'q> BooleanOperation<'q> {
    /// Continue with clauses required to match
    pub fn and(self) -> FluentQuery<'q> {
        self.query.occurrence = Occurrence::Must;
        FluentQuery { query: self.query }
    }

    /// Continue with optional clauses
    pub fn or(self) -> FluentQuery<'q> {
        self.query.occurrence = Occurrence::Should;
        FluentQuery { query: self.query }
    }

    /// Continue with clauses that must not match
    pub fn not(self) -> FluentQuery<'q> {
        self.query.occurrence = Occurrence::MustNot;
        FluentQuery { query: self.query }
    }

    pub fn order_by(self, fields: &[SortableField]) -> Result<BooleanOperation<'q>> {
        self.query.order_by_internal(fields, false)?;
        Ok(self)
    }

    pub fn order_by_descending(self, fields: &[SortableField]) -> Result<BooleanOperation<'q>> {
        self.query.order_by_internal(fields, true)?;
        Ok(self)
    }

    pub fn select_fields<I, S>(self, names: I) -> BooleanOperation<'q>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.fields_to_load = FieldSelection::fields(names);
        self
    }

    pub fn select_field(self, name: impl Into<String>) -> BooleanOperation<'q> {
        self.query.fields_to_load = FieldSelection::single(name);
        self
    }

    pub fn select_all_fields(self) -> BooleanOperation<'q> {
        self.query.fields_to_load = FieldSelection::All;
        self
    }

    pub fn execute(self, options: &QueryOptions) -> Result<Arc<SearchResults>> {
        self.query.execute(options)
    }
}

/// Clause-entry continuation produced by `and()` / `or()` / `not()`
pub struct FluentQuery<'q> {
    query: &'q mut SearchQuery,
}

impl<'q> FluentQuery<'q> {
    pub fn field(self, field: &str, value: impl Into<RangeValue>) -> BooleanOperation<'q> {
        self.query.field(field, value);
        BooleanOperation { query: self.query }
    }

    pub fn range(
        self,
        fields: &[&str],
        min: impl Into<RangeValue>,
        max: impl Into<RangeValue>,
    ) -> BooleanOperation<'q> {
        self.query.range(fields, min, max);
        BooleanOperation { query: self.query }
    }

    pub fn range_query(
        self,
        fields: &[&str],
        min: Option<RangeValue>,
        max: Option<RangeValue>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> BooleanOperation<'q> {
        self.query
            .range_query(fields, min, max, min_inclusive, max_inclusive);
        BooleanOperation { query: self.query }
    }

    pub fn managed_query(self, text: &str, fields: Option<&[&str]>) -> BooleanOperation<'q> {
        self.query.managed_query(text, fields);
        BooleanOperation { query: self.query }
    }

    pub fn group(self, build: impl FnOnce(&mut GroupBuilder)) -> BooleanOperation<'q> {
        let occurrence = self.query.occurrence;
        self.query.push_group(occurrence, build);
        BooleanOperation { query: self.query }
    }
}

/// Collects clauses for an explicit nested sub-group
pub struct GroupBuilder {
    registry: Arc<FieldRegistry>,
    group: ClauseGroup,
    occurrence: Occurrence,
}

impl GroupBuilder {
    pub fn and(&mut self) -> &mut Self {
        self.occurrence = Occurrence::Must;
        self
    }

    pub fn or(&mut self) -> &mut Self {
        self.occurrence = Occurrence::Should;
        self
    }

    pub fn not(&mut self) -> &mut Self {
        self.occurrence = Occurrence::MustNot;
        self
    }

    pub fn field(&mut self, field: &str, value: impl Into<RangeValue>) -> &mut Self {
        let clause = make_range_clause(
            &self.registry,
            &[field],
            RangeBounds::point(value),
            self.occurrence,
        );
        self.group.push(clause);
        self
    }

    pub fn range(
        &mut self,
        fields: &[&str],
        min: impl Into<RangeValue>,
        max: impl Into<RangeValue>,
    ) -> &mut Self {
        let bounds = RangeBounds::inclusive(min, max);
        let clause = make_range_clause(&self.registry, fields, bounds, self.occurrence);
        self.group.push(clause);
        self
    }

    pub fn managed_query(&mut self, text: &str, fields: Option<&[&str]>) -> &mut Self {
        let clause = make_managed_clause(&self.registry, fields, text, self.occurrence);
        self.group.push(clause);
        self
    }
}

fn make_range_clause(
    registry: &Arc<FieldRegistry>,
    fields: &[&str],
    bounds: RangeBounds,
    occurrence: Occurrence,
) -> Clause {
    let registry = Arc::clone(registry);
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    Clause::deferred(
        DeferredQuery::new(move || range_fragment(&registry, &fields, &bounds)),
        occurrence,
    )
}

fn make_managed_clause(
    registry: &Arc<FieldRegistry>,
    fields: Option<&[&str]>,
    text: &str,
    occurrence: Occurrence,
) -> Clause {
    let registry = Arc::clone(registry);
    let fields: Option<Vec<String>> =
        fields.map(|fields| fields.iter().map(|f| f.to_string()).collect());
    let text = text.to_string();
    Clause::deferred(
        DeferredQuery::new(move || managed_fragment(&registry, fields.as_deref(), &text)),
        occurrence,
    )
}

/// Per-field range dispatch
///
/// The multi-field result must later sit as one opaque sub-group at an
/// arbitrary occurrence in the surrounding tree, so the inner should-combined
/// group is wrapped in an outer group of its own. Collapsing the two levels
/// changes boolean precedence against must/must-not siblings.
fn range_fragment(
    registry: &FieldRegistry,
    fields: &[String],
    bounds: &RangeBounds,
) -> Result<Option<Fragment>> {
    if fields.is_empty() {
        return Err(SearchcraftError::InvalidArgument(
            "range query requires at least one field".to_string(),
        ));
    }
    let kind = bounds.kind().ok_or_else(|| {
        SearchcraftError::InvalidArgument("range query requires at least one bound".to_string())
    })?;

    let mut inner = ClauseGroup::new();
    for field in fields {
        match registry.resolve(field) {
            Some(value_type) if value_type.supports_range_kind(kind) => {
                if let Some(fragment) = value_type.range_query(field, bounds) {
                    inner.push(Clause::concrete(fragment, Occurrence::Should));
                }
            }
            resolved => {
                return Err(SearchcraftError::UnsupportedFieldType {
                    field: field.clone(),
                    value_type: resolved
                        .map(|value_type| value_type.name())
                        .unwrap_or("none")
                        .to_string(),
                    kind,
                });
            }
        }
    }

    let mut outer = ClauseGroup::new();
    outer.push(Clause::concrete(Fragment::Group(inner), Occurrence::Should));
    Ok(Some(Fragment::Group(outer)))
}

/// Per-field managed text dispatch
///
/// Fields with no free-text capability contribute nothing; when no field
/// contributes, the node itself produces no fragment. Same double-wrapping as
/// the range dispatch.
fn managed_fragment(
    registry: &FieldRegistry,
    fields: Option<&[String]>,
    text: &str,
) -> Result<Option<Fragment>> {
    let all_fields;
    let fields: &[String] = match fields {
        Some(fields) => fields,
        None => {
            all_fields = registry.field_names();
            &all_fields
        }
    };

    let mut inner = ClauseGroup::new();
    for field in fields {
        let Some(value_type) = registry.resolve(field) else {
            continue;
        };
        if let Some(fragment) = value_type.text_query(field, text) {
            inner.push(Clause::concrete(fragment, Occurrence::Should));
        }
    }

    if inner.is_empty() {
        return Ok(None);
    }
    let mut outer = ClauseGroup::new();
    outer.push(Clause::concrete(Fragment::Group(inner), Occurrence::Should));
    Ok(Some(Fragment::Group(outer)))
}
