//! StateSet order line items
//!
//! Persistence for order line items: the `order_line_item` entity with its
//! product/variant snapshot and exact price pairs, prefixed identifier
//! assignment, the owning order detail and the per-item tax lines and
//! adjustments.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod errors;
pub mod ids;
pub mod migrator;
pub mod models;
pub mod money;
pub mod repositories;
pub mod schema;

pub use errors::ServiceError;
pub use ids::generate_entity_id;
pub use models::line_item::{Model as LineItem, NewLineItem};
pub use money::RawAmount;
pub use repositories::{LineItemRepository, OrderDetailRepository};

pub mod prelude {
    pub use crate::config::{load_config, AppConfig};
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::models::line_item::{
        LineItemDetails, LineItemState, Model as LineItem, NewLineItem, LINE_ITEM_ID_PREFIX,
    };
    pub use crate::models::{line_item_adjustment, line_item_tax_line, order_detail};
    pub use crate::money::*;
    pub use crate::repositories::*;
}
