//! Built-in field value types
//!
//! Cover the common index shapes: analyzed full text, raw keywords, integers,
//! floats, and date-times. The registry stays pluggable; anything here can be
//! replaced by a caller-provided [`FieldValueType`](super::FieldValueType)
//! implementation.

use std::sync::Arc;

use chrono::DateTime;

use super::field_type::{FieldValueType, RangeBounds, ValueKind};
use crate::analyzer::Analyzer;
use crate::query::{Clause, ClauseGroup, Fragment, Occurrence};

/// Prefix under which sortable copies of analyzed fields are indexed
pub const SORTABLE_FIELD_PREFIX: &str = "__sort_";

/// Raw keyword field: exact-match terms, lexicographic ranges
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordType;

impl FieldValueType for KeywordType {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn supports_range_kind(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Keyword)
    }

    fn range_query(&self, field: &str, bounds: &RangeBounds) -> Option<Fragment> {
        if bounds.is_point() {
            let value = bounds.min.as_ref()?.as_keyword()?;
            return Some(Fragment::term(field, value));
        }
        Some(Fragment::TermRange {
            field: field.to_string(),
            min: bounds
                .min
                .as_ref()
                .and_then(|v| v.as_keyword().map(str::to_string)),
            max: bounds
                .max
                .as_ref()
                .and_then(|v| v.as_keyword().map(str::to_string)),
            min_inclusive: bounds.min_inclusive,
            max_inclusive: bounds.max_inclusive,
        })
    }

    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Fragment::term(field, text))
    }
}

/// 64-bit integer field
#[derive(Clone, Copy, Debug, Default)]
pub struct Int64Type;

impl FieldValueType for Int64Type {
    fn name(&self) -> &'static str {
        "int64"
    }

    fn supports_range_kind(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Long)
    }

    fn range_query(&self, field: &str, bounds: &RangeBounds) -> Option<Fragment> {
        Some(Fragment::LongRange {
            field: field.to_string(),
            min: bounds.min.as_ref().and_then(|v| v.as_i64()),
            max: bounds.max.as_ref().and_then(|v| v.as_i64()),
            min_inclusive: bounds.min_inclusive,
            max_inclusive: bounds.max_inclusive,
        })
    }

    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let value: i64 = text.trim().parse().ok()?;
        Some(Fragment::LongRange {
            field: field.to_string(),
            min: Some(value),
            max: Some(value),
            min_inclusive: true,
            max_inclusive: true,
        })
    }
}

/// 64-bit floating point field
#[derive(Clone, Copy, Debug, Default)]
pub struct Float64Type;

impl FieldValueType for Float64Type {
    fn name(&self) -> &'static str {
        "float64"
    }

    fn supports_range_kind(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Double)
    }

    fn range_query(&self, field: &str, bounds: &RangeBounds) -> Option<Fragment> {
        Some(Fragment::DoubleRange {
            field: field.to_string(),
            min: bounds.min.as_ref().and_then(|v| v.as_f64()),
            max: bounds.max.as_ref().and_then(|v| v.as_f64()),
            min_inclusive: bounds.min_inclusive,
            max_inclusive: bounds.max_inclusive,
        })
    }

    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let value: f64 = text.trim().parse().ok()?;
        Some(Fragment::DoubleRange {
            field: field.to_string(),
            min: Some(value),
            max: Some(value),
            min_inclusive: true,
            max_inclusive: true,
        })
    }
}

/// Date-time field, queried as an epoch-millisecond range
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTimeType;

impl FieldValueType for DateTimeType {
    fn name(&self) -> &'static str {
        "date_time"
    }

    fn supports_range_kind(&self, kind: ValueKind) -> bool {
        // Callers may pass epoch milliseconds directly
        matches!(kind, ValueKind::Date | ValueKind::Long)
    }

    fn range_query(&self, field: &str, bounds: &RangeBounds) -> Option<Fragment> {
        Some(Fragment::LongRange {
            field: field.to_string(),
            min: bounds.min.as_ref().and_then(|v| v.as_timestamp_millis()),
            max: bounds.max.as_ref().and_then(|v| v.as_timestamp_millis()),
            min_inclusive: bounds.min_inclusive,
            max_inclusive: bounds.max_inclusive,
        })
    }

    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let millis = DateTime::parse_from_rfc3339(text.trim())
            .ok()?
            .timestamp_millis();
        Some(Fragment::LongRange {
            field: field.to_string(),
            min: Some(millis),
            max: Some(millis),
            min_inclusive: true,
            max_inclusive: true,
        })
    }
}

/// Analyzed full-text field
///
/// Free text is analyzed into terms which combine as SHOULD clauses. Analyzed
/// terms are useless for ordering, so a sortable variant of the field (an
/// exact copy indexed under [`SORTABLE_FIELD_PREFIX`]) can be declared with
/// [`FullTextType::sortable`].
#[derive(Clone, Debug)]
pub struct FullTextType {
    analyzer: Arc<Analyzer>,
    sortable: bool,
}

impl FullTextType {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self {
            analyzer,
            sortable: false,
        }
    }

    /// Declare a sortable copy of the field
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

impl Default for FullTextType {
    fn default() -> Self {
        Self::new(Arc::new(Analyzer::default()))
    }
}

impl FieldValueType for FullTextType {
    fn name(&self) -> &'static str {
        "full_text"
    }

    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let terms = self.analyzer.analyze(text);
        match terms.as_slice() {
            [] => None,
            [term] => Some(Fragment::term(field, term)),
            _ => {
                let mut group = ClauseGroup::new();
                for term in &terms {
                    group.push(Clause::concrete(
                        Fragment::term(field, term),
                        Occurrence::Should,
                    ));
                }
                Some(Fragment::Group(group))
            }
        }
    }

    fn sortable_field_name(&self, field: &str) -> Option<String> {
        self.sortable
            .then(|| format!("{SORTABLE_FIELD_PREFIX}{field}"))
    }
}
