// Order line items and the records they hang off / own
pub mod line_item;
pub mod line_item_adjustment;
pub mod line_item_tax_line;
pub mod order_detail;

pub use line_item::{LineItemDetails, LineItemState, NewLineItem, LINE_ITEM_ID_PREFIX};
