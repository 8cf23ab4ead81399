use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::line_item::{
    self, ActiveModel as LineItemActiveModel, Column, Entity as LineItem, LineItemDetails,
    LineItemState, Model as LineItemModel, LINE_ITEM_ID_PREFIX,
};
use crate::models::line_item_adjustment::{
    self, Entity as LineItemAdjustment, ADJUSTMENT_ID_PREFIX,
};
use crate::models::line_item_tax_line::{self, Entity as LineItemTaxLine, TAX_LINE_ID_PREFIX};
use crate::repositories::Repository;

use super::{map_write_error, BaseRepository, IdGenerator};

/// Repository for order line items and their tax lines and adjustments
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    base: BaseRepository,
}

impl LineItemRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Repository honouring the configured id retry budget
    pub fn from_config(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        Self::new(db).with_max_id_attempts(config.id_max_attempts)
    }

    /// Number of inserts tried with freshly generated ids before a collision
    /// is reported.
    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.base = self.base.with_max_id_attempts(attempts);
        self
    }

    pub fn with_id_generator(mut self, generator: IdGenerator) -> Self {
        self.base = self.base.with_id_generator(generator);
        self
    }

    /// Persist an unpersisted line item and return the stored record.
    #[instrument(skip(self, item), fields(totals_id = %item.totals_id))]
    pub async fn create(&self, item: LineItemModel) -> Result<LineItemModel, ServiceError> {
        item.check_price_pairs()?;

        let db = self.base.get_db();
        let created = self
            .base
            .insert_with_id_retry(LINE_ITEM_ID_PREFIX, &item.id, |id| {
                let mut active = LineItemActiveModel::from(item.clone()).reset_all();
                active.id = Set(id);
                active.insert(db)
            })
            .await?;

        info!(id = %created.id, "line item created");
        created.normalize()
    }

    /// Find a line item by id
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<LineItemModel>, ServiceError> {
        LineItem::find_by_id(id.to_string())
            .one(self.base.get_db())
            .await?
            .map(LineItemModel::normalize)
            .transpose()
    }

    /// Find a line item by id, failing when it does not exist
    pub async fn get(&self, id: &str) -> Result<LineItemModel, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("line item {} not found", id)))
    }

    /// Load a line item with its tax lines and adjustments
    #[instrument(skip(self))]
    pub async fn find_details(&self, id: &str) -> Result<Option<LineItemDetails>, ServiceError> {
        let db = self.base.get_db();
        let Some(item) = LineItem::find_by_id(id.to_string()).one(db).await? else {
            return Ok(None);
        };

        let tax_lines = item
            .find_related(LineItemTaxLine)
            .order_by_asc(line_item_tax_line::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(line_item_tax_line::Model::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        let adjustments = item
            .find_related(LineItemAdjustment)
            .order_by_asc(line_item_adjustment::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(line_item_adjustment::Model::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(LineItemDetails {
            item: item.normalize()?,
            tax_lines,
            adjustments,
        }))
    }

    /// All line items of an order detail, oldest first
    #[instrument(skip(self))]
    pub async fn list_by_totals(&self, totals_id: &str) -> Result<Vec<LineItemModel>, ServiceError> {
        self.find_where(Column::TotalsId.eq(totals_id)).await
    }

    /// Find line items snapshotting the given product
    #[instrument(skip(self))]
    pub async fn find_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<LineItemModel>, ServiceError> {
        self.find_where(Column::ProductId.eq(product_id)).await
    }

    /// Find line items snapshotting the given variant
    #[instrument(skip(self))]
    pub async fn find_by_variant_id(
        &self,
        variant_id: &str,
    ) -> Result<Vec<LineItemModel>, ServiceError> {
        self.find_where(Column::VariantId.eq(variant_id)).await
    }

    async fn find_where(
        &self,
        condition: sea_orm::sea_query::SimpleExpr,
    ) -> Result<Vec<LineItemModel>, ServiceError> {
        LineItem::find()
            .filter(condition)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await?
            .into_iter()
            .map(LineItemModel::normalize)
            .collect()
    }

    /// Write every field of a persisted line item. `created_at` is left as
    /// stored and `updated_at` is refreshed.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn update(&self, item: LineItemModel) -> Result<LineItemModel, ServiceError> {
        item.check_price_pairs()?;
        if item.id.is_empty() {
            return Err(ServiceError::validation("cannot update a line item without an id"));
        }

        let active = LineItemActiveModel::from(item).reset_all();
        let updated = active.update(self.base.get_db()).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => {
                ServiceError::NotFound("line item not found".to_string())
            }
            other => map_write_error(other),
        })?;

        debug!(updated_at = %updated.updated_at, "line item updated");
        updated.normalize()
    }

    /// Delete a line item; its tax lines and adjustments go with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let result = LineItem::delete_by_id(id.to_string())
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Whether a record has been stored yet
    pub async fn state(&self, item: &LineItemModel) -> Result<LineItemState, ServiceError> {
        if item.id.is_empty() {
            return Ok(LineItemState::Unpersisted);
        }
        let count = LineItem::find_by_id(item.id.clone())
            .count(self.base.get_db())
            .await?;
        Ok(if count > 0 {
            LineItemState::Persisted
        } else {
            LineItemState::Unpersisted
        })
    }

    /// Attach a tax line to a stored line item
    #[instrument(skip(self, tax_line), fields(item_id = %tax_line.item_id))]
    pub async fn add_tax_line(
        &self,
        tax_line: line_item_tax_line::Model,
    ) -> Result<line_item_tax_line::Model, ServiceError> {
        let db = self.base.get_db();
        let created = self
            .base
            .insert_with_id_retry(TAX_LINE_ID_PREFIX, &tax_line.id, |id| {
                let mut active =
                    line_item_tax_line::ActiveModel::from(tax_line.clone()).reset_all();
                active.id = Set(id);
                active.insert(db)
            })
            .await?;
        created.normalize()
    }

    /// Attach an adjustment to a stored line item
    #[instrument(skip(self, adjustment), fields(item_id = %adjustment.item_id))]
    pub async fn add_adjustment(
        &self,
        adjustment: line_item_adjustment::Model,
    ) -> Result<line_item_adjustment::Model, ServiceError> {
        let db = self.base.get_db();
        let created = self
            .base
            .insert_with_id_retry(ADJUSTMENT_ID_PREFIX, &adjustment.id, |id| {
                let mut active =
                    line_item_adjustment::ActiveModel::from(adjustment.clone()).reset_all();
                active.id = Set(id);
                active.insert(db)
            })
            .await?;
        created.normalize()
    }

    pub async fn list_tax_lines(
        &self,
        item_id: &str,
    ) -> Result<Vec<line_item_tax_line::Model>, ServiceError> {
        LineItemTaxLine::find()
            .filter(line_item_tax_line::Column::ItemId.eq(item_id))
            .order_by_asc(line_item_tax_line::Column::CreatedAt)
            .all(self.base.get_db())
            .await?
            .into_iter()
            .map(line_item_tax_line::Model::normalize)
            .collect()
    }

    pub async fn list_adjustments(
        &self,
        item_id: &str,
    ) -> Result<Vec<line_item_adjustment::Model>, ServiceError> {
        LineItemAdjustment::find()
            .filter(line_item_adjustment::Column::ItemId.eq(item_id))
            .order_by_asc(line_item_adjustment::Column::CreatedAt)
            .all(self.base.get_db())
            .await?
            .into_iter()
            .map(line_item_adjustment::Model::normalize)
            .collect()
    }

    /// Count the line items of an order detail
    pub async fn count_by_totals(&self, totals_id: &str) -> Result<u64, ServiceError> {
        Ok(LineItem::find()
            .filter(line_item::Column::TotalsId.eq(totals_id))
            .count(self.base.get_db())
            .await?)
    }
}
