use thiserror::Error;

use crate::schema::ValueKind;

/// Main error type for searchcraft operations
#[derive(Error, Debug)]
pub enum SearchcraftError {
    /// A range query was requested on a field whose resolved value type has no
    /// ranged-query capability for the requested value kind.
    ///
    /// Raised when the owning deferred node is evaluated, not when the fluent
    /// call is made. `value_type` is `"none"` for fields absent from the
    /// registry.
    #[error("cannot perform a range query on field '{field}' with {kind} bounds: its value type is {value_type}")]
    UnsupportedFieldType {
        field: String,
        value_type: String,
        kind: ValueKind,
    },

    #[error("unrecognized sort type: {0}")]
    InvalidSortType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type alias for searchcraft operations
pub type Result<T> = std::result::Result<T, SearchcraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchcraftError::UnsupportedFieldType {
            field: "age".to_string(),
            value_type: "full_text".to_string(),
            kind: ValueKind::Long,
        };
        assert_eq!(
            err.to_string(),
            "cannot perform a range query on field 'age' with long bounds: its value type is full_text"
        );
    }

    #[test]
    fn test_invalid_sort_type_display() {
        let err = SearchcraftError::InvalidSortType("unknown".to_string());
        assert_eq!(err.to_string(), "unrecognized sort type: unknown");
    }
}
