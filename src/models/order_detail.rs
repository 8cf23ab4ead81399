use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::ids::generate_entity_id;

pub const ORDER_DETAIL_ID_PREFIX: &str = "orddetail";

/// Per-order aggregate that owns the order's line items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_detail")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    pub version: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
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
        self.id = Set(generate_entity_id(&current, ORDER_DETAIL_ID_PREFIX));
    }
}

impl Model {
    /// Creates an unsaved order detail at version 1.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn assign_identifier(&mut self) {
        self.id = generate_entity_id(&self.id, ORDER_DETAIL_ID_PREFIX);
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
