use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::errors::ServiceError;
use crate::ids::{generate_entity_id, has_prefix};
use crate::money::RawAmount;

use super::{line_item_adjustment, line_item_tax_line};

pub const LINE_ITEM_ID_PREFIX: &str = "ordli";

/// The `order_line_item` table: one row per purchased line of an order.
///
/// Product and variant fields are a snapshot taken when the order was placed
/// and are not kept in sync with the catalog.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_line_item")]
pub struct Model {
    /// Prefixed identifier (`ordli_...`). Empty until assigned.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// Owning order detail aggregate.
    #[sea_orm(column_type = "Text")]
    pub totals_id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub subtitle: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub thumbnail: Option<String>,

    #[sea_orm(column_type = "Text", nullable, indexed)]
    pub variant_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable, indexed)]
    pub product_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_description: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_subtitle: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_type: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_collection: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub product_handle: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub variant_sku: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub variant_barcode: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub variant_title: Option<String>,

    /// Option name to value, e.g. `{"Size": "M"}`.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub variant_option_values: Option<Json>,

    pub requires_shipping: bool,

    pub is_discountable: bool,

    pub is_tax_inclusive: bool,

    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub compare_at_unit_price: Option<Decimal>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub raw_compare_at_unit_price: Option<Json>,

    #[sea_orm(column_type = "Decimal(None)")]
    pub unit_price: Decimal,

    #[sea_orm(column_type = "JsonBinary")]
    pub raw_unit_price: Json,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to exactly one order detail.
    #[sea_orm(
        belongs_to = "super::order_detail::Entity",
        from = "Column::TotalsId",
        to = "super::order_detail::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Totals,
    #[sea_orm(has_many = "super::line_item_tax_line::Entity")]
    TaxLines,
    #[sea_orm(has_many = "super::line_item_adjustment::Entity")]
    Adjustments,
}

impl Related<super::order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Totals.def()
    }
}

impl Related<super::line_item_tax_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxLines.def()
    }
}

impl Related<super::line_item_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.set_id_if_needed();
            // stamped at insert time, not construction time
            active_model.created_at = Set(now);
        } else {
            // created_at is written once, on insert
            active_model.created_at = ActiveValue::NotSet;
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

impl ActiveModel {
    fn set_id_if_needed(&mut self) {
        let current = match &self.id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => id.clone(),
            ActiveValue::NotSet => String::new(),
        };
        self.id = Set(generate_entity_id(&current, LINE_ITEM_ID_PREFIX));
    }
}

/// Input for [`Model::new`].
///
/// `unit_price`/`raw_unit_price` and `totals_id` are required; everything
/// else falls back to the column defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct NewLineItem {
    pub totals_id: Option<String>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub subtitle: Option<String>,
    pub thumbnail: Option<String>,
    pub variant_id: Option<String>,
    pub product_id: Option<String>,
    pub product_title: Option<String>,
    pub product_description: Option<String>,
    pub product_subtitle: Option<String>,
    pub product_type: Option<String>,
    pub product_collection: Option<String>,
    pub product_handle: Option<String>,
    pub variant_sku: Option<String>,
    pub variant_barcode: Option<String>,
    pub variant_title: Option<String>,
    pub variant_option_values: Option<Json>,
    pub requires_shipping: Option<bool>,
    pub is_discountable: Option<bool>,
    pub is_tax_inclusive: Option<bool>,
    pub unit_price: Option<Decimal>,
    pub raw_unit_price: Option<RawAmount>,
    pub compare_at_unit_price: Option<Decimal>,
    pub raw_compare_at_unit_price: Option<RawAmount>,
}

impl NewLineItem {
    /// Shorthand for the required fields, with the raw price derived from
    /// `unit_price`.
    pub fn new(totals_id: impl Into<String>, title: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            totals_id: Some(totals_id.into()),
            title: title.into(),
            ..Default::default()
        }
        .with_unit_price(unit_price)
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.raw_unit_price = Some(RawAmount::from_decimal(&unit_price));
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_compare_at_unit_price(mut self, compare_at: Decimal) -> Self {
        self.raw_compare_at_unit_price = Some(RawAmount::from_decimal(&compare_at));
        self.compare_at_unit_price = Some(compare_at);
        self
    }
}

impl Model {
    /// Builds an unsaved line item. The id is left empty; it is assigned by
    /// [`Model::assign_identifier`] or on insert.
    pub fn new(input: NewLineItem) -> Result<Self, ServiceError> {
        input.validate()?;

        let totals_id = input
            .totals_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ServiceError::validation("line item requires an owning order detail (totals)"))?;

        let (unit_price, raw_unit_price) = match (input.unit_price, input.raw_unit_price) {
            (Some(price), Some(raw)) => (price, raw),
            _ => {
                return Err(ServiceError::validation(
                    "unit_price and raw_unit_price are both required",
                ))
            }
        };
        ensure_pair_matches("unit_price", &unit_price, &raw_unit_price)?;

        let (compare_at_unit_price, raw_compare_at_unit_price) =
            match (input.compare_at_unit_price, input.raw_compare_at_unit_price) {
                (Some(price), Some(raw)) => {
                    ensure_pair_matches("compare_at_unit_price", &price, &raw)?;
                    (Some(price), Some(raw.to_json()))
                }
                (None, None) => (None, None),
                _ => {
                    return Err(ServiceError::validation(
                        "compare_at_unit_price and raw_compare_at_unit_price must be set together",
                    ))
                }
            };

        if let Some(values) = &input.variant_option_values {
            if !values.is_object() {
                return Err(ServiceError::validation(
                    "variant_option_values must be a JSON object",
                ));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: String::new(),
            totals_id,
            title: input.title,
            subtitle: input.subtitle,
            thumbnail: input.thumbnail,
            variant_id: input.variant_id,
            product_id: input.product_id,
            product_title: input.product_title,
            product_description: input.product_description,
            product_subtitle: input.product_subtitle,
            product_type: input.product_type,
            product_collection: input.product_collection,
            product_handle: input.product_handle,
            variant_sku: input.variant_sku,
            variant_barcode: input.variant_barcode,
            variant_title: input.variant_title,
            variant_option_values: input.variant_option_values,
            requires_shipping: input.requires_shipping.unwrap_or(true),
            is_discountable: input.is_discountable.unwrap_or(true),
            is_tax_inclusive: input.is_tax_inclusive.unwrap_or(false),
            compare_at_unit_price,
            raw_compare_at_unit_price,
            unit_price,
            raw_unit_price: raw_unit_price.to_json(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Stamps a new `ordli_` id unless one is already present.
    pub fn assign_identifier(&mut self) {
        self.id = generate_entity_id(&self.id, LINE_ITEM_ID_PREFIX);
    }

    /// Load-path fix-up, run on every record read from storage.
    ///
    /// Assigns an id if the row somehow lacks one and restores the exact
    /// prices from their raw columns. A compare-at price stored without its
    /// raw form gets one derived so the pair is never half set.
    pub fn normalize(mut self) -> Result<Self, ServiceError> {
        self.assign_identifier();
        if !has_prefix(&self.id, LINE_ITEM_ID_PREFIX) {
            warn!(id = %self.id, "line item id predates the '{}' prefix", LINE_ITEM_ID_PREFIX);
        }

        self.unit_price = RawAmount::from_json(&self.raw_unit_price)?.to_decimal()?;

        match self.raw_compare_at_unit_price.as_ref() {
            Some(raw) => {
                let exact = RawAmount::from_json(raw)?.to_decimal()?;
                self.compare_at_unit_price = Some(exact);
            }
            None => {
                if let Some(price) = self.compare_at_unit_price {
                    warn!(id = %self.id, "compare_at_unit_price stored without raw value");
                    self.raw_compare_at_unit_price =
                        Some(RawAmount::from_decimal(&price).to_json());
                }
            }
        }

        Ok(self)
    }

    /// Verifies both price pairs: each display value agrees with its raw
    /// form, and the compare-at pair is either fully set or fully empty.
    pub fn check_price_pairs(&self) -> Result<(), ServiceError> {
        let raw_unit = RawAmount::from_json(&self.raw_unit_price)
            .map_err(|e| ServiceError::validation(format!("raw_unit_price: {}", e)))?;
        ensure_pair_matches("unit_price", &self.unit_price, &raw_unit)?;

        match (&self.compare_at_unit_price, &self.raw_compare_at_unit_price) {
            (Some(price), Some(raw)) => {
                let raw = RawAmount::from_json(raw).map_err(|e| {
                    ServiceError::validation(format!("raw_compare_at_unit_price: {}", e))
                })?;
                ensure_pair_matches("compare_at_unit_price", price, &raw)
            }
            (None, None) => Ok(()),
            _ => Err(ServiceError::validation(
                "compare_at_unit_price and raw_compare_at_unit_price must be set together",
            )),
        }
    }
}

fn ensure_pair_matches(field: &str, price: &Decimal, raw: &RawAmount) -> Result<(), ServiceError> {
    if raw.matches(price) {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "{} {} does not match raw value '{}'",
            field, price, raw.value
        )))
    }
}

/// A line item together with its owned child records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItemDetails {
    #[serde(flatten)]
    pub item: Model,
    pub tax_lines: Vec<line_item_tax_line::Model>,
    pub adjustments: Vec<line_item_adjustment::Model>,
}

impl From<Model> for LineItemDetails {
    fn from(item: Model) -> Self {
        Self {
            item,
            tax_lines: Vec::new(),
            adjustments: Vec::new(),
        }
    }
}

/// Storage state of a line item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineItemState {
    /// Not yet inserted; the id may still be empty.
    Unpersisted,
    /// A row with this id exists.
    Persisted,
}
