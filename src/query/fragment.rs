//! Engine-agnostic boolean query fragments
//!
//! A fragment is the query element one clause contributes to the finished
//! tree. Fragments stay engine-agnostic: the execution engine translates them
//! into its own query objects.

use std::fmt;

use super::clause::ClauseGroup;

/// One engine-level boolean query element
#[derive(Clone, Debug)]
pub enum Fragment {
    /// Exact term match
    Term { field: String, value: String },

    /// Lexicographic term range
    TermRange {
        field: String,
        min: Option<String>,
        max: Option<String>,
        min_inclusive: bool,
        max_inclusive: bool,
    },

    /// Numeric range over 64-bit integers (also carries epoch-millis dates)
    LongRange {
        field: String,
        min: Option<i64>,
        max: Option<i64>,
        min_inclusive: bool,
        max_inclusive: bool,
    },

    /// Numeric range over 64-bit floats
    DoubleRange {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
        min_inclusive: bool,
        max_inclusive: bool,
    },

    /// Nested boolean sub-group, rendered as one opaque clause
    Group(ClauseGroup),
}

impl Fragment {
    /// Create an exact term match fragment
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Fragment::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Get the fragment type name for debugging and logging
    pub fn fragment_type(&self) -> &'static str {
        match self {
            Fragment::Term { .. } => "term",
            Fragment::TermRange { .. } => "term_range",
            Fragment::LongRange { .. } => "long_range",
            Fragment::DoubleRange { .. } => "double_range",
            Fragment::Group(_) => "group",
        }
    }

    /// Field this fragment constrains, when it is a leaf
    pub fn field(&self) -> Option<&str> {
        match self {
            Fragment::Term { field, .. }
            | Fragment::TermRange { field, .. }
            | Fragment::LongRange { field, .. }
            | Fragment::DoubleRange { field, .. } => Some(field),
            Fragment::Group(_) => None,
        }
    }
}

fn write_range<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    field: &str,
    min: Option<&T>,
    max: Option<&T>,
    min_inclusive: bool,
    max_inclusive: bool,
) -> fmt::Result {
    let open = if min_inclusive { '[' } else { '{' };
    let close = if max_inclusive { ']' } else { '}' };
    write!(f, "{field}:{open}")?;
    match min {
        Some(min) => write!(f, "{min}")?,
        None => f.write_str("*")?,
    }
    f.write_str(" TO ")?;
    match max {
        Some(max) => write!(f, "{max}")?,
        None => f.write_str("*")?,
    }
    write!(f, "{close}")
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Term { field, value } => write!(f, "{field}:{value}"),
            Fragment::TermRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => write_range(f, field, min.as_ref(), max.as_ref(), *min_inclusive, *max_inclusive),
            Fragment::LongRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => write_range(f, field, min.as_ref(), max.as_ref(), *min_inclusive, *max_inclusive),
            Fragment::DoubleRange {
                field,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => write_range(f, field, min.as_ref(), max.as_ref(), *min_inclusive, *max_inclusive),
            Fragment::Group(group) => write!(f, "({group})"),
        }
    }
}
