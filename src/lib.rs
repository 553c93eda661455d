pub mod analyzer;
pub mod config;
pub mod error;
pub mod query;
pub mod schema;

pub use analyzer::Analyzer;
pub use config::{AnalyzerConfig, QueryOptions, DEFAULT_MAX_RESULTS};
pub use error::{Result, SearchcraftError};
pub use query::{
    BooleanOperation, FieldSelection, FinalizedQuery, Fragment, Occurrence, SearchExecutor,
    SearchHit, SearchQuery, SearchResults, SortType, SortableField, CATEGORY_FIELD,
};
pub use schema::{
    DateTimeType, FieldRegistry, FieldValueType, Float64Type, FullTextType, Int64Type,
    KeywordType, RangeBounds, RangeValue, ValueKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
