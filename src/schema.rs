//! Field-to-column mapping for `order_line_item`.
//!
//! The entity struct says what a line item is; this table says how it is
//! stored. Migrations, docs and tests read it instead of re-deriving the
//! layout from attributes.

use sea_orm::{EntityName, Iterable};

use crate::models::line_item;

/// Storage type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Boolean,
    Numeric,
    Json,
    Timestamptz,
}

/// One persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub indexed: bool,
}

const fn col(field: &'static str, kind: ColumnKind, nullable: bool) -> ColumnSpec {
    ColumnSpec {
        field,
        column: field,
        kind,
        nullable,
        indexed: false,
    }
}

const fn indexed(field: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        column: field,
        kind: ColumnKind::Text,
        nullable: true,
        indexed: true,
    }
}

pub const LINE_ITEM_TABLE: &str = "order_line_item";

/// Column layout of `order_line_item`, in entity field order.
pub const LINE_ITEM_COLUMNS: &[ColumnSpec] = &[
    col("id", ColumnKind::Text, false),
    col("totals_id", ColumnKind::Text, false),
    col("title", ColumnKind::Text, false),
    col("subtitle", ColumnKind::Text, true),
    col("thumbnail", ColumnKind::Text, true),
    indexed("variant_id"),
    indexed("product_id"),
    col("product_title", ColumnKind::Text, true),
    col("product_description", ColumnKind::Text, true),
    col("product_subtitle", ColumnKind::Text, true),
    col("product_type", ColumnKind::Text, true),
    col("product_collection", ColumnKind::Text, true),
    col("product_handle", ColumnKind::Text, true),
    col("variant_sku", ColumnKind::Text, true),
    col("variant_barcode", ColumnKind::Text, true),
    col("variant_title", ColumnKind::Text, true),
    col("variant_option_values", ColumnKind::Json, true),
    col("requires_shipping", ColumnKind::Boolean, false),
    col("is_discountable", ColumnKind::Boolean, false),
    col("is_tax_inclusive", ColumnKind::Boolean, false),
    col("compare_at_unit_price", ColumnKind::Numeric, true),
    col("raw_compare_at_unit_price", ColumnKind::Json, true),
    col("unit_price", ColumnKind::Numeric, false),
    col("raw_unit_price", ColumnKind::Json, false),
    col("created_at", ColumnKind::Timestamptz, false),
    col("updated_at", ColumnKind::Timestamptz, false),
];

/// Looks up the column mapping of a field.
pub fn line_item_column(field: &str) -> Option<&'static ColumnSpec> {
    LINE_ITEM_COLUMNS.iter().find(|spec| spec.field == field)
}

/// Name of the index on an indexed column, `IDX_<table>_<column>`.
pub fn index_name(table: &str, column: &str) -> String {
    format!("IDX_{}_{}", table, column)
}

/// Indexed columns of `order_line_item` with their index names.
pub fn line_item_indexes() -> Vec<(&'static str, String)> {
    LINE_ITEM_COLUMNS
        .iter()
        .filter(|spec| spec.indexed)
        .map(|spec| (spec.column, index_name(LINE_ITEM_TABLE, spec.column)))
        .collect()
}

/// Column names as the entity declares them, for checking the table above
/// against the struct.
pub fn entity_column_names() -> Vec<String> {
    line_item::Column::iter()
        .map(|c| sea_orm::IdenStatic::as_str(&c).to_string())
        .collect()
}

/// Table name as the entity declares it.
pub fn entity_table_name() -> &'static str {
    line_item::Entity.table_name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_covers_every_entity_column_in_order() {
        let mapped: Vec<&str> = LINE_ITEM_COLUMNS.iter().map(|c| c.column).collect();
        let declared = entity_column_names();
        assert_eq!(mapped, declared);
        assert_eq!(entity_table_name(), LINE_ITEM_TABLE);
    }

    #[test]
    fn product_and_variant_ids_are_indexed() {
        assert_eq!(
            line_item_indexes(),
            vec![
                ("variant_id", "IDX_order_line_item_variant_id".to_string()),
                ("product_id", "IDX_order_line_item_product_id".to_string()),
            ]
        );
    }

    #[test]
    fn required_columns_are_not_nullable() {
        for field in ["id", "totals_id", "title", "unit_price", "raw_unit_price"] {
            let spec = line_item_column(field).unwrap();
            assert!(!spec.nullable, "{} should be required", field);
        }
        assert!(line_item_column("raw_compare_at_unit_price").unwrap().nullable);
        assert_eq!(
            line_item_column("variant_option_values").unwrap().kind,
            ColumnKind::Json
        );
        assert!(line_item_column("missing").is_none());
    }
}
