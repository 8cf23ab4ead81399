use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::order_detail::{
    ActiveModel as OrderDetailActiveModel, Entity as OrderDetail, Model as OrderDetailModel,
    ORDER_DETAIL_ID_PREFIX,
};
use crate::repositories::Repository;

use super::BaseRepository;

/// Repository for the order detail records line items belong to
#[derive(Debug, Clone)]
pub struct OrderDetailRepository {
    base: BaseRepository,
}

impl OrderDetailRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new order detail
    #[instrument(skip(self, detail))]
    pub async fn create(&self, detail: OrderDetailModel) -> Result<OrderDetailModel, ServiceError> {
        let db = self.base.get_db();
        let created = self
            .base
            .insert_with_id_retry(ORDER_DETAIL_ID_PREFIX, &detail.id, |id| {
                let mut active = OrderDetailActiveModel::from(detail.clone()).reset_all();
                active.id = Set(id);
                active.insert(db)
            })
            .await?;
        info!(id = %created.id, "order detail created");
        Ok(created)
    }

    /// Find an order detail by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<OrderDetailModel>, ServiceError> {
        let mut found = OrderDetail::find_by_id(id.to_string())
            .one(self.base.get_db())
            .await?;
        if let Some(detail) = found.as_mut() {
            detail.assign_identifier();
        }
        Ok(found)
    }

    /// Delete an order detail. Line items and their children are removed by
    /// the cascading foreign keys.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let result = OrderDetail::delete_by_id(id.to_string())
            .exec(self.base.get_db())
            .await?;

        if result.rows_affected == 0 {
            warn!("order detail not found for delete");
            return Err(ServiceError::NotFound(format!("order detail {} not found", id)));
        }
        info!("order detail deleted");
        Ok(())
    }
}
