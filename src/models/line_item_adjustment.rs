use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::ids::generate_entity_id;
use crate::money::{decimal_from_raw_json, RawAmount};

pub const ADJUSTMENT_ID_PREFIX: &str = "ordliadj";

/// Price adjustment (promotion, manual discount) against a single line item.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_line_item_adjustment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub item_id: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub promotion_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub code: Option<String>,

    #[sea_orm(column_type = "Decimal(None)")]
    pub amount: Decimal,

    #[sea_orm(column_type = "JsonBinary")]
    pub raw_amount: Json,

    #[sea_orm(column_type = "Text", nullable)]
    pub provider_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::line_item::Entity",
        from = "Column::ItemId",
        to = "super::line_item::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    LineItem,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItem.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            let current = match &active_model.id {
                ActiveValue::Set(id) | ActiveValue::Unchanged(id) => id.clone(),
                ActiveValue::NotSet => String::new(),
            };
            active_model.id = Set(generate_entity_id(&current, ADJUSTMENT_ID_PREFIX));
            // stamped at insert time, not construction time
            active_model.created_at = Set(now);
        } else {
            active_model.created_at = ActiveValue::NotSet;
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

impl Model {
    /// Creates an unsaved adjustment of `amount` against `item_id`.
    pub fn new(item_id: String, amount: Decimal) -> Result<Self, ServiceError> {
        if item_id.trim().is_empty() {
            return Err(ServiceError::validation("adjustment requires an owning item"));
        }

        let now = Utc::now();
        Ok(Self {
            id: String::new(),
            item_id,
            description: None,
            promotion_id: None,
            code: None,
            amount,
            raw_amount: RawAmount::from_decimal(&amount).to_json(),
            provider_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_promotion(mut self, promotion_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.promotion_id = Some(promotion_id.into());
        self.code = Some(code.into());
        self
    }

    pub fn assign_identifier(&mut self) {
        self.id = generate_entity_id(&self.id, ADJUSTMENT_ID_PREFIX);
    }

    pub fn normalize(mut self) -> Result<Self, ServiceError> {
        self.assign_identifier();
        self.amount = decimal_from_raw_json(&self.raw_amount)?;
        Ok(self)
    }
}
