//! Sort field resolution
//!
//! Maps requested logical sort keys to the concrete comparable fields the
//! execution engine orders by. Resolution is deterministic and side-effect
//! free, re-derivable from the requested fields plus current registry state.
//! Nothing is cached across calls: a long-lived builder whose registry
//! composition changes between order-by calls resolves against whatever the
//! registry declares at each call.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchcraftError};
use crate::schema::FieldRegistry;

/// Requested sort key type tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    /// Relevance score
    Score,
    /// Insertion/document ordinal
    DocumentOrder,
    String,
    Int32,
    Int64,
    Float64,
    Int16,
    Byte,
}

impl FromStr for SortType {
    type Err = SearchcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "score" => Ok(SortType::Score),
            "document_order" => Ok(SortType::DocumentOrder),
            "string" => Ok(SortType::String),
            "int32" | "int" => Ok(SortType::Int32),
            "int64" | "long" => Ok(SortType::Int64),
            "float64" | "float" | "double" => Ok(SortType::Float64),
            "int16" | "short" => Ok(SortType::Int16),
            "byte" => Ok(SortType::Byte),
            other => Err(SearchcraftError::InvalidSortType(other.to_string())),
        }
    }
}

impl SortType {
    /// Concrete comparator kind for this tag
    pub fn resolve_kind(&self) -> SortFieldKind {
        match self {
            SortType::Score => SortFieldKind::Score,
            SortType::DocumentOrder => SortFieldKind::DocumentOrder,
            SortType::String => SortFieldKind::String,
            SortType::Int32 => SortFieldKind::Int32,
            SortType::Int64 => SortFieldKind::Int64,
            SortType::Float64 => SortFieldKind::Float64,
            SortType::Int16 => SortFieldKind::Int16,
            SortType::Byte => SortFieldKind::Byte,
        }
    }
}

/// A requested logical sort key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortableField {
    pub field_name: String,
    pub sort_type: SortType,
}

impl SortableField {
    pub fn new(field_name: impl Into<String>, sort_type: SortType) -> Self {
        Self {
            field_name: field_name.into(),
            sort_type,
        }
    }
}

/// Concrete comparator kind understood by the execution engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortFieldKind {
    Score,
    DocumentOrder,
    String,
    Int32,
    Int64,
    Float64,
    Int16,
    Byte,
}

/// A fully resolved sort instruction
///
/// `field_name` may differ from the requested one when the field's value type
/// declares a distinct sortable variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSortField {
    pub field_name: String,
    pub kind: SortFieldKind,
    pub descending: bool,
}

/// Resolve requested sort fields against current registry state
///
/// Order is priority: the first entry is the primary sort key.
pub fn resolve_sort_fields(
    registry: &FieldRegistry,
    fields: &[SortableField],
    descending: bool,
) -> Result<Vec<ResolvedSortField>> {
    if fields.is_empty() {
        return Err(SearchcraftError::InvalidArgument(
            "order-by requires at least one sort field".to_string(),
        ));
    }

    Ok(fields
        .iter()
        .map(|requested| {
            let field_name = registry
                .resolve(&requested.field_name)
                .and_then(|value_type| value_type.sortable_field_name(&requested.field_name))
                .unwrap_or_else(|| requested.field_name.clone());

            ResolvedSortField {
                field_name,
                kind: requested.sort_type.resolve_kind(),
                descending,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldValueType, Float64Type, FullTextType};

    #[derive(Debug)]
    struct AliasedPriceType;

    impl FieldValueType for AliasedPriceType {
        fn name(&self) -> &'static str {
            "aliased_price"
        }

        fn sortable_field_name(&self, field: &str) -> Option<String> {
            Some(format!("{field}_sort"))
        }
    }

    #[test]
    fn test_sort_type_kind_mapping() {
        assert_eq!(SortType::Score.resolve_kind(), SortFieldKind::Score);
        assert_eq!(SortType::DocumentOrder.resolve_kind(), SortFieldKind::DocumentOrder);
        assert_eq!(SortType::String.resolve_kind(), SortFieldKind::String);
        assert_eq!(SortType::Int32.resolve_kind(), SortFieldKind::Int32);
        assert_eq!(SortType::Int64.resolve_kind(), SortFieldKind::Int64);
        assert_eq!(SortType::Float64.resolve_kind(), SortFieldKind::Float64);
        assert_eq!(SortType::Int16.resolve_kind(), SortFieldKind::Int16);
        assert_eq!(SortType::Byte.resolve_kind(), SortFieldKind::Byte);
    }

    #[test]
    fn test_sort_type_from_str() {
        assert_eq!("float64".parse::<SortType>().unwrap(), SortType::Float64);
        // Legacy tag aliases
        assert_eq!("double".parse::<SortType>().unwrap(), SortType::Float64);
        assert_eq!("long".parse::<SortType>().unwrap(), SortType::Int64);
        assert_eq!(
            "document_order".parse::<SortType>().unwrap(),
            SortType::DocumentOrder
        );

        let err = "fancy".parse::<SortType>().unwrap_err();
        assert!(matches!(err, SearchcraftError::InvalidSortType(tag) if tag == "fancy"));
    }

    #[test]
    fn test_resolve_substitutes_sortable_alias() {
        let registry = FieldRegistry::builder()
            .field("price", AliasedPriceType)
            .build();

        let resolved = resolve_sort_fields(
            &registry,
            &[SortableField::new("price", SortType::Float64)],
            false,
        )
        .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].field_name, "price_sort");
        assert_eq!(resolved[0].kind, SortFieldKind::Float64);
        assert!(!resolved[0].descending);
    }

    #[test]
    fn test_resolve_keeps_name_without_alias() {
        let registry = FieldRegistry::builder()
            .field("price", Float64Type)
            .build();

        let resolved = resolve_sort_fields(
            &registry,
            &[SortableField::new("price", SortType::Float64)],
            true,
        )
        .unwrap();

        assert_eq!(resolved[0].field_name, "price");
        assert!(resolved[0].descending);
    }

    #[test]
    fn test_resolve_unknown_field_keeps_name() {
        let registry = FieldRegistry::new();
        let resolved = resolve_sort_fields(
            &registry,
            &[SortableField::new("mystery", SortType::String)],
            false,
        )
        .unwrap();

        assert_eq!(resolved[0].field_name, "mystery");
    }

    #[test]
    fn test_resolve_empty_fields_is_an_error() {
        let registry = FieldRegistry::new();
        let err = resolve_sort_fields(&registry, &[], false).unwrap_err();
        assert!(matches!(err, SearchcraftError::InvalidArgument(_)));
    }

    #[test]
    fn test_resolve_priority_order() {
        let registry = FieldRegistry::builder()
            .field("title", FullTextType::default().sortable())
            .build();

        let resolved = resolve_sort_fields(
            &registry,
            &[
                SortableField::new("title", SortType::String),
                SortableField::new("created_at", SortType::Int64),
            ],
            false,
        )
        .unwrap();

        assert_eq!(resolved[0].field_name, "__sort_title");
        assert_eq!(resolved[1].field_name, "created_at");
    }
}
