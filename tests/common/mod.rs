use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use stateset_line_items::{
    config::AppConfig,
    db::{self, DbConfig, SQLITE_MEMORY_URL},
    models::{line_item, order_detail},
    LineItemRepository, NewLineItem, OrderDetailRepository,
};

/// Helper harness backed by a freshly migrated in-memory SQLite database.
pub struct TestDb {
    pub db: Arc<DatabaseConnection>,
    pub line_items: LineItemRepository,
    pub order_details: OrderDetailRepository,
}

impl TestDb {
    /// Construct a new harness with an empty schema.
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("connect in-memory sqlite");
        db::run_migrations(&pool).await.expect("run migrations");

        let db = Arc::new(pool);
        let config = AppConfig::new(SQLITE_MEMORY_URL.to_string(), "test".to_string());
        Self {
            line_items: LineItemRepository::from_config(db.clone(), &config),
            order_details: OrderDetailRepository::new(db.clone()),
            db,
        }
    }

    /// Store an empty order detail for line items to hang off.
    pub async fn order_detail(&self) -> order_detail::Model {
        self.order_details
            .create(order_detail::Model::new())
            .await
            .expect("create order detail")
    }

    /// Store a line item with just the required fields.
    #[allow(dead_code)]
    pub async fn line_item(&self, totals_id: &str, title: &str, price: Decimal) -> line_item::Model {
        let item = line_item::Model::new(NewLineItem::new(totals_id, title, price))
            .expect("valid line item");
        self.line_items.create(item).await.expect("create line item")
    }
}
