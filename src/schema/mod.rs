//! Field schema: value type capabilities and the per-field registry

pub mod field_type;
pub mod registry;
pub mod value_types;

pub use field_type::{FieldValueType, RangeBounds, RangeValue, ValueKind};
pub use registry::{FieldRegistry, FieldRegistryBuilder};
pub use value_types::{
    DateTimeType, Float64Type, FullTextType, Int64Type, KeywordType, SORTABLE_FIELD_PREFIX,
};
