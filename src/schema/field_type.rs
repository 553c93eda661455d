//! Field value type capabilities
//!
//! A field value type encapsulates how raw values, ranges, and free text
//! against one field translate into engine query fragments, and whether the
//! field carries a distinct sortable variant. The criteria builder consumes
//! these through the [`FieldValueType`] trait; it never inspects engine
//! internals itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::Fragment;

/// Kind of value carried by a range bound
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Untyped string, compared lexicographically
    Keyword,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// Date/time, carried as epoch milliseconds on the wire
    Date,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Keyword => "keyword",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// A typed value used as a range bound (or exact match, when min == max)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeValue {
    Keyword(String),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
}

impl RangeValue {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            RangeValue::Keyword(_) => ValueKind::Keyword,
            RangeValue::Long(_) => ValueKind::Long,
            RangeValue::Double(_) => ValueKind::Double,
            RangeValue::Date(_) => ValueKind::Date,
        }
    }

    /// View as a keyword, without conversion
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            RangeValue::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RangeValue::Long(v) => Some(*v),
            RangeValue::Double(v) => Some(*v as i64),
            RangeValue::Date(d) => Some(d.timestamp_millis()),
            RangeValue::Keyword(s) => s.parse().ok(),
        }
    }

    /// Convert to f64 if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RangeValue::Long(v) => Some(*v as f64),
            RangeValue::Double(v) => Some(*v),
            RangeValue::Date(d) => Some(d.timestamp_millis() as f64),
            RangeValue::Keyword(s) => s.parse().ok(),
        }
    }

    /// Convert to epoch milliseconds if possible
    pub fn as_timestamp_millis(&self) -> Option<i64> {
        match self {
            RangeValue::Date(d) => Some(d.timestamp_millis()),
            RangeValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for RangeValue {
    fn from(value: &str) -> Self {
        RangeValue::Keyword(value.to_string())
    }
}

impl From<String> for RangeValue {
    fn from(value: String) -> Self {
        RangeValue::Keyword(value)
    }
}

impl From<i32> for RangeValue {
    fn from(value: i32) -> Self {
        RangeValue::Long(i64::from(value))
    }
}

impl From<i64> for RangeValue {
    fn from(value: i64) -> Self {
        RangeValue::Long(value)
    }
}

impl From<f64> for RangeValue {
    fn from(value: f64) -> Self {
        RangeValue::Double(value)
    }
}

impl From<DateTime<Utc>> for RangeValue {
    fn from(value: DateTime<Utc>) -> Self {
        RangeValue::Date(value)
    }
}

/// Bounds of one ranged dispatch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub min: Option<RangeValue>,
    pub max: Option<RangeValue>,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

impl RangeBounds {
    pub fn new(
        min: Option<RangeValue>,
        max: Option<RangeValue>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> Self {
        Self {
            min,
            max,
            min_inclusive,
            max_inclusive,
        }
    }

    /// Both-inclusive bounds
    pub fn inclusive(min: impl Into<RangeValue>, max: impl Into<RangeValue>) -> Self {
        Self::new(Some(min.into()), Some(max.into()), true, true)
    }

    /// Exact-match bounds: min = max = value, both inclusive
    pub fn point(value: impl Into<RangeValue>) -> Self {
        let value = value.into();
        Self::new(Some(value.clone()), Some(value), true, true)
    }

    /// Kind of the bounds, taken from the lower bound, else the upper one.
    /// `None` when both bounds are absent.
    pub fn kind(&self) -> Option<ValueKind> {
        self.min
            .as_ref()
            .or(self.max.as_ref())
            .map(RangeValue::kind)
    }

    /// Whether this is an exact-match query (min == max, both inclusive)
    pub fn is_point(&self) -> bool {
        self.min_inclusive
            && self.max_inclusive
            && matches!((&self.min, &self.max), (Some(min), Some(max)) if min == max)
    }
}

/// Per-field capability object consulted by the criteria builder
///
/// A field absent from the registry behaves as if it had a type with no
/// capabilities at all: managed queries skip it, range queries fail on it,
/// sorting falls back to the raw field name.
pub trait FieldValueType: fmt::Debug + Send + Sync {
    /// Short type identity used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether ranged queries with bounds of `kind` are supported
    fn supports_range_kind(&self, kind: ValueKind) -> bool {
        let _ = kind;
        false
    }

    /// Translate range bounds into an engine fragment
    ///
    /// `None` means the bounds produce no usable query and the dispatch
    /// contributes nothing.
    fn range_query(&self, field: &str, bounds: &RangeBounds) -> Option<Fragment> {
        let _ = (field, bounds);
        None
    }

    /// Translate free text into an engine fragment
    ///
    /// `None` means this type has no free-text capability or analysis consumed
    /// every term.
    fn text_query(&self, field: &str, text: &str) -> Option<Fragment> {
        let _ = (field, text);
        None
    }

    /// Distinct sortable variant of the field, when one exists
    fn sortable_field_name(&self, field: &str) -> Option<String> {
        let _ = field;
        None
    }
}
