//! Integration tests for the fluent criteria builder
//!
//! Drives the full path from fluent calls through finalization to an
//! execution engine. The engine here is a small in-memory evaluator that
//! interprets finalized boolean trees against a fixed document set.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use searchcraft::query::{Clause, ClauseGroup, Occurrence};
use searchcraft::{
    FieldRegistry, FieldSelection, FinalizedQuery, Fragment, FullTextType, Int64Type, KeywordType,
    QueryOptions, Result, SearchExecutor, SearchHit, SearchQuery, SearchResults, SearchcraftError,
    SortType, SortableField, CATEGORY_FIELD,
};

#[derive(Clone)]
struct Doc {
    id: u64,
    fields: BTreeMap<String, Value>,
}

fn doc(id: u64, category: &str, status: &str, title: &str, year: i64) -> Doc {
    let mut fields = BTreeMap::new();
    fields.insert(CATEGORY_FIELD.to_string(), json!(category));
    fields.insert("status".to_string(), json!(status));
    fields.insert("title".to_string(), json!(title));
    fields.insert("year".to_string(), json!(year));
    Doc { id, fields }
}

/// In-memory execution engine interpreting finalized clause trees
struct MemoryExecutor {
    docs: Vec<Doc>,
}

impl MemoryExecutor {
    fn new(docs: Vec<Doc>) -> Self {
        Self { docs }
    }

    fn matches_fragment(doc: &Doc, fragment: &Fragment) -> bool {
        match fragment {
            Fragment::Term { field, value } => doc
                .fields
                .get(field)
                .map(|v| match v {
                    // Analyzed text matches per-term
                    Value::String(s) => s
                        .to_lowercase()
                        .split_whitespace()
                        .any(|term| term == value.to_lowercase()),
                    other => other.to_string() == *value,
                })
                .unwrap_or(false),
            Fragment::LongRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => doc
                .fields
                .get(field)
                .and_then(Value::as_i64)
                .map(|v| {
                    let lower = min.map_or(true, |m| if *min_inclusive { v >= m } else { v > m });
                    let upper = max.map_or(true, |m| if *max_inclusive { v <= m } else { v < m });
                    lower && upper
                })
                .unwrap_or(false),
            Fragment::DoubleRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => doc
                .fields
                .get(field)
                .and_then(Value::as_f64)
                .map(|v| {
                    let lower = min.map_or(true, |m| if *min_inclusive { v >= m } else { v > m });
                    let upper = max.map_or(true, |m| if *max_inclusive { v <= m } else { v < m });
                    lower && upper
                })
                .unwrap_or(false),
            Fragment::TermRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => doc
                .fields
                .get(field)
                .and_then(Value::as_str)
                .map(|v| {
                    let lower = min.as_deref().map_or(true, |m| {
                        if *min_inclusive {
                            v >= m
                        } else {
                            v > m
                        }
                    });
                    let upper = max.as_deref().map_or(true, |m| {
                        if *max_inclusive {
                            v <= m
                        } else {
                            v < m
                        }
                    });
                    lower && upper
                })
                .unwrap_or(false),
            Fragment::Group(group) => Self::matches_group(doc, group),
        }
    }

    fn matches_group(doc: &Doc, group: &ClauseGroup) -> bool {
        let resolve = |clause: &Clause| {
            clause
                .fragment()
                .resolve()
                .expect("finalized clauses are concrete")
                .expect("finalized clauses are non-empty")
        };

        let mut has_must = false;
        let mut has_should = false;
        let mut any_should = false;

        for clause in group.clauses() {
            match clause.occurrence() {
                Occurrence::Must => {
                    has_must = true;
                    if !Self::matches_fragment(doc, &resolve(clause)) {
                        return false;
                    }
                }
                Occurrence::MustNot => {
                    if Self::matches_fragment(doc, &resolve(clause)) {
                        return false;
                    }
                }
                Occurrence::Should => {
                    has_should = true;
                    if Self::matches_fragment(doc, &resolve(clause)) {
                        any_should = true;
                    }
                }
            }
        }

        // With no must clauses, at least one should clause has to match
        if has_should && !has_must && !any_should {
            return false;
        }
        true
    }

    fn project(doc: &Doc, selection: &FieldSelection) -> BTreeMap<String, Value> {
        match selection {
            FieldSelection::All => doc.fields.clone(),
            FieldSelection::Fields(names) => doc
                .fields
                .iter()
                .filter(|(name, _)| names.contains(*name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

impl SearchExecutor for MemoryExecutor {
    fn execute(
        &self,
        query: &FinalizedQuery,
        _registry: &FieldRegistry,
        options: &QueryOptions,
    ) -> Result<Arc<SearchResults>> {
        let mut matched: Vec<&Doc> = self
            .docs
            .iter()
            .filter(|doc| Self::matches_group(doc, &query.root))
            .collect();

        if let Some(sort) = query.sort_fields.first() {
            matched.sort_by(|a, b| {
                let left = a.fields.get(&sort.field_name);
                let right = b.fields.get(&sort.field_name);
                let ordering = match (left.and_then(Value::as_i64), right.and_then(Value::as_i64)) {
                    (Some(l), Some(r)) => l.cmp(&r),
                    _ => left
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .cmp(right.and_then(Value::as_str).unwrap_or("")),
                };
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let total_hits = matched.len() as u64;
        let hits = matched
            .into_iter()
            .skip(options.skip)
            .take(options.take)
            .map(|doc| {
                SearchHit::new(doc.id, 1.0).with_fields(Self::project(doc, &query.fields_to_load))
            })
            .collect();

        Ok(Arc::new(SearchResults { hits, total_hits }))
    }
}

fn registry() -> Arc<FieldRegistry> {
    Arc::new(
        FieldRegistry::builder()
            .field("status", KeywordType)
            .field("title", FullTextType::default().sortable())
            .field("year", Int64Type)
            .field("age", FullTextType::default())
            .build(),
    )
}

fn engine() -> Arc<MemoryExecutor> {
    Arc::new(MemoryExecutor::new(vec![
        doc(1, "Article", "published", "Rust systems programming", 2022),
        doc(2, "Article", "draft", "Search engine internals", 2023),
        doc(3, "Article", "published", "Query builders in practice", 2024),
        doc(4, "Product", "published", "Rust plush toy", 2024),
        doc(5, "Article", "archived", "Legacy rust notes", 2019),
    ]))
}

fn query_for(category: Option<&str>) -> SearchQuery {
    let query = SearchQuery::new(registry(), engine() as Arc<dyn SearchExecutor>);
    match category {
        Some(category) => query.with_category(category),
        None => query,
    }
}

#[test]
fn test_empty_builder_returns_canonical_empty_results() {
    let query = query_for(None);
    let results = query.execute(&QueryOptions::default()).unwrap();

    assert!(Arc::ptr_eq(&results, &SearchResults::empty()));
}

#[test]
fn test_field_clause_with_category_scope() {
    let mut query = query_for(Some("Article"));
    query.field("status", "published");

    let finalized = query.finalize().unwrap().unwrap();
    assert_eq!(
        finalized.to_string(),
        "+__category:Article +((status:published))"
    );

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    // Doc 4 is published but a Product, not an Article
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_category_without_clauses_short_circuits() {
    let query = query_for(Some("Article"));
    let results = query.execute(&QueryOptions::default()).unwrap();

    assert!(Arc::ptr_eq(&results, &SearchResults::empty()));
}

#[test]
fn test_range_query_on_rangeless_field_fails() {
    let mut query = query_for(None);
    query.range(&["age"], 18i64, 65i64);

    let err = query.execute(&QueryOptions::default()).unwrap_err();
    match err {
        SearchcraftError::UnsupportedFieldType { field, value_type, .. } => {
            assert_eq!(field, "age");
            assert_eq!(value_type, "full_text");
        }
        other => panic!("expected UnsupportedFieldType, got {other}"),
    }
}

#[test]
fn test_year_range_matches() {
    let mut query = query_for(Some("Article"));
    query.range(&["year"], 2023i64, 2024i64);

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_managed_query_over_all_fields() {
    let mut query = query_for(None);
    query.managed_query("rust", None);

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![1, 4, 5]);
}

#[test]
fn test_must_not_excludes() {
    let mut query = query_for(Some("Article"));
    query
        .managed_query("rust", Some(&["title"]))
        .not()
        .field("status", "archived");

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_or_group_within_category() {
    // The category filter is a must clause, so loose should-siblings would
    // stop constraining the match set; an explicit sub-group keeps the OR
    let mut query = query_for(Some("Article"));
    query.and_group(|g| {
        g.or()
            .field("status", "draft")
            .field("status", "archived");
    });

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![2, 5]);
}

#[test]
fn test_order_by_descending_year() {
    let mut query = query_for(Some("Article"));
    query
        .and_group(|g| {
            g.or()
                .field("status", "published")
                .field("status", "draft");
        })
        .order_by_descending(&[SortableField::new("year", SortType::Int64)])
        .unwrap();

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_order_by_score_resolution() {
    let mut query = query_for(None);
    query
        .field("status", "published")
        .order_by_descending(&[SortableField::new("score", SortType::Score)])
        .unwrap();

    let sorts = query.sort_fields();
    assert_eq!(sorts.len(), 1);
    assert_eq!(sorts[0].field_name, "score");
    assert!(sorts[0].descending);
}

#[test]
fn test_sortable_alias_substitution() {
    let mut query = query_for(None);
    query
        .field("status", "published")
        .order_by(&[SortableField::new("title", SortType::String)])
        .unwrap();

    // The full-text type declared a sortable copy of the field
    assert_eq!(query.sort_fields()[0].field_name, "__sort_title");
}

#[test]
fn test_field_selection_projects_hits() {
    let mut query = query_for(Some("Article"));
    let results = query
        .field("status", "published")
        .select_field("title")
        .execute(&QueryOptions::default())
        .unwrap();

    for hit in &results.hits {
        assert_eq!(hit.fields.len(), 1);
        assert!(hit.fields.contains_key("title"));
    }
}

#[test]
fn test_query_options_shape_results() {
    let mut query = query_for(Some("Article"));
    query.and_group(|g| {
        g.or()
            .field("status", "published")
            .field("status", "draft")
            .field("status", "archived");
    });

    let results = query.execute(&QueryOptions::new(1, 2)).unwrap();
    assert_eq!(results.total_hits, 4);
    assert_eq!(results.hits.len(), 2);
}

#[test]
fn test_nested_group_precedence() {
    // published AND (year 2022 OR year 2024): without the group wrapping the
    // two year clauses would be loose should-siblings of a must clause and
    // stop constraining the match set
    let mut query = query_for(Some("Article"));
    query.field("status", "published").and().group(|g| {
        g.or().field("year", 2022i64).field("year", 2024i64);
    });

    let results = query.execute(&QueryOptions::default()).unwrap();
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_managed_query_stripped_terms_do_not_fault() {
    let mut query = query_for(Some("Article"));
    // Stopwords only: analysis consumes every term
    query.managed_query("the an of", Some(&["title"]));

    let results = query.execute(&QueryOptions::default()).unwrap();
    // The clause resolved to nothing; only the category filter remains
    let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
}
