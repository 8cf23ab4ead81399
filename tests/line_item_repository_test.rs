mod common;

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ActiveModelTrait;
use serde_json::json;
use stateset_line_items::ids::{has_prefix, new_entity_id};
use stateset_line_items::models::{
    line_item, line_item_adjustment, line_item_tax_line, LineItemState, LINE_ITEM_ID_PREFIX,
};
use stateset_line_items::{LineItemRepository, NewLineItem, RawAmount, ServiceError};

#[tokio::test]
async fn blue_t_shirt_is_created_with_defaults() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let item = line_item::Model::new(NewLineItem::new(order.id.clone(), "Blue T-Shirt", dec!(19.99)))
        .expect("valid line item");
    assert!(item.id.is_empty());
    assert_eq!(app.line_items.state(&item).await.unwrap(), LineItemState::Unpersisted);

    let created = app.line_items.create(item).await.expect("create line item");

    assert!(has_prefix(&created.id, LINE_ITEM_ID_PREFIX));
    assert_eq!(created.title, "Blue T-Shirt");
    assert_eq!(created.totals_id, order.id);
    assert_eq!(created.unit_price, dec!(19.99));
    assert!(created.requires_shipping);
    assert!(created.is_discountable);
    assert!(!created.is_tax_inclusive);
    assert_eq!(app.line_items.state(&created).await.unwrap(), LineItemState::Persisted);

    let details = app
        .line_items
        .find_details(&created.id)
        .await
        .unwrap()
        .expect("details for stored item");
    assert_eq!(details.item.id, created.id);
    assert!(details.tax_lines.is_empty());
    assert!(details.adjustments.is_empty());
}

#[tokio::test]
async fn missing_order_detail_is_a_validation_error() {
    let app = common::TestDb::new().await;

    let item = line_item::Model::new(NewLineItem::new("orddetail_MISSING", "Ghost", dec!(1)))
        .unwrap();

    assert_matches!(
        app.line_items.create(item).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn broken_price_pair_is_not_persisted() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let mut item = line_item::Model::new(NewLineItem::new(order.id.clone(), "Mug", dec!(8))).unwrap();
    item.unit_price = dec!(7.5);

    assert_matches!(
        app.line_items.create(item).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_eq!(app.line_items.count_by_totals(&order.id).await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_order_detail_cascades_to_items_and_children() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let item = app.line_item(&order.id, "Blue T-Shirt", dec!(19.99)).await;

    let tax_line = line_item_tax_line::Model::new(item.id.clone(), "VAT".into(), dec!(0.2)).unwrap();
    let tax_line = app.line_items.add_tax_line(tax_line).await.unwrap();
    assert!(tax_line.id.starts_with("ordlitxl_"));

    let adjustment = line_item_adjustment::Model::new(item.id.clone(), dec!(2.50))
        .unwrap()
        .with_promotion("promo_SUMMER", "SUMMER10");
    let adjustment = app.line_items.add_adjustment(adjustment).await.unwrap();
    assert!(adjustment.id.starts_with("ordliadj_"));

    let details = app.line_items.find_details(&item.id).await.unwrap().unwrap();
    assert_eq!(details.tax_lines.len(), 1);
    assert_eq!(details.tax_lines[0].rate, dec!(0.2));
    assert_eq!(details.adjustments.len(), 1);
    assert_eq!(details.adjustments[0].amount, dec!(2.50));

    app.order_details.delete(&order.id).await.unwrap();

    assert!(app.line_items.find_by_id(&item.id).await.unwrap().is_none());
    assert!(app.line_items.list_tax_lines(&item.id).await.unwrap().is_empty());
    assert!(app.line_items.list_adjustments(&item.id).await.unwrap().is_empty());
    assert!(app.order_details.find_by_id(&order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_missing_order_detail_is_not_found() {
    let app = common::TestDb::new().await;
    assert_matches!(
        app.order_details.delete("orddetail_NOPE").await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn constant_generator_reports_collision_after_max_attempts() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let repo = LineItemRepository::new(app.db.clone())
        .with_id_generator(Arc::new(|prefix: &str| format!("{}_FIXED", prefix)))
        .with_max_id_attempts(3);

    let first = line_item::Model::new(NewLineItem::new(order.id.clone(), "One", dec!(1))).unwrap();
    let first = repo.create(first).await.unwrap();
    assert_eq!(first.id, "ordli_FIXED");

    let second = line_item::Model::new(NewLineItem::new(order.id.clone(), "Two", dec!(2))).unwrap();
    let err = repo.create(second).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::IdentifierCollision { ref prefix, attempts: 3 } if prefix == "ordli"
    );
    assert_eq!(repo.count_by_totals(&order.id).await.unwrap(), 1);
}

#[tokio::test]
async fn generated_collision_is_retried_with_a_fresh_id() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let taken = app.line_item(&order.id, "Existing", dec!(5)).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let taken_id = taken.id.clone();
    let repo = LineItemRepository::new(app.db.clone()).with_id_generator(Arc::new(
        move |prefix: &str| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                taken_id.clone()
            } else {
                new_entity_id(prefix)
            }
        },
    ));

    let item = line_item::Model::new(NewLineItem::new(order.id.clone(), "Retry", dec!(6))).unwrap();
    let created = repo.create(item).await.unwrap();

    assert_ne!(created.id, taken.id);
    assert!(has_prefix(&created.id, LINE_ITEM_ID_PREFIX));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn supplied_id_collision_is_not_retried() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let existing = app.line_item(&order.id, "Existing", dec!(5)).await;

    let mut duplicate =
        line_item::Model::new(NewLineItem::new(order.id.clone(), "Duplicate", dec!(5))).unwrap();
    duplicate.id = existing.id.clone();

    assert_matches!(
        app.line_items.create(duplicate).await,
        Err(ServiceError::IdentifierCollision { attempts: 1, .. })
    );
}

#[tokio::test]
async fn raw_amount_keeps_precision_through_storage() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let price = Decimal::from_str("12345678901234567890.123456789").unwrap();
    let compare_at = Decimal::from_str("0.1000000000000000000000000001").unwrap();

    let item = line_item::Model::new(
        NewLineItem::new(order.id.clone(), "Precise", price).with_compare_at_unit_price(compare_at),
    )
    .unwrap();
    let created = app.line_items.create(item).await.unwrap();

    let loaded = app.line_items.get(&created.id).await.unwrap();
    assert_eq!(loaded.unit_price, price);
    assert_eq!(loaded.compare_at_unit_price, Some(compare_at));
    assert_eq!(
        RawAmount::from_json(&loaded.raw_unit_price).unwrap().value,
        "12345678901234567890.123456789"
    );
    assert!(loaded.check_price_pairs().is_ok());
}

#[tokio::test]
async fn update_refreshes_updated_at_only() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let created = app.line_item(&order.id, "Blue T-Shirt", dec!(19.99)).await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut changed = created.clone();
    changed.title = "Navy T-Shirt".into();
    changed.requires_shipping = false;
    let updated = app.line_items.update(changed).await.unwrap();

    assert_eq!(updated.title, "Navy T-Shirt");
    assert!(!updated.requires_shipping);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let reloaded = app.line_items.get(&created.id).await.unwrap();
    assert_eq!(reloaded.created_at, created.created_at);
    assert_eq!(reloaded.title, "Navy T-Shirt");
}

#[tokio::test]
async fn update_of_unknown_item_is_not_found() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let mut item = line_item::Model::new(NewLineItem::new(order.id.clone(), "Nowhere", dec!(1))).unwrap();
    item.assign_identifier();

    assert_matches!(app.line_items.update(item).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn lookups_by_product_and_variant() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    for (title, product, variant) in [
        ("Shirt S", "prod_SHIRT", "variant_S"),
        ("Shirt M", "prod_SHIRT", "variant_M"),
        ("Mug", "prod_MUG", "variant_MUG"),
    ] {
        let input = NewLineItem {
            product_id: Some(product.into()),
            variant_id: Some(variant.into()),
            variant_option_values: Some(json!({ "Size": title })),
            ..NewLineItem::new(order.id.clone(), title, dec!(10))
        };
        app.line_items
            .create(line_item::Model::new(input).unwrap())
            .await
            .unwrap();
    }

    let shirts = app.line_items.find_by_product_id("prod_SHIRT").await.unwrap();
    assert_eq!(shirts.len(), 2);
    assert!(shirts.iter().all(|i| i.product_id.as_deref() == Some("prod_SHIRT")));

    let medium = app.line_items.find_by_variant_id("variant_M").await.unwrap();
    assert_eq!(medium.len(), 1);
    assert_eq!(medium[0].title, "Shirt M");
    assert_eq!(medium[0].variant_option_values, Some(json!({ "Size": "Shirt M" })));

    assert!(app.line_items.find_by_product_id("prod_NONE").await.unwrap().is_empty());
    assert_eq!(app.line_items.list_by_totals(&order.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn legacy_unprefixed_id_is_kept_on_load() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let mut legacy = line_item::Model::new(NewLineItem::new(order.id.clone(), "Legacy", dec!(3.10))).unwrap();
    legacy.id = "legacy-line-42".into();
    line_item::ActiveModel::from(legacy)
        .reset_all()
        .insert(&*app.db)
        .await
        .unwrap();

    let loaded = app.line_items.get("legacy-line-42").await.unwrap();
    assert_eq!(loaded.id, "legacy-line-42");
    assert_eq!(loaded.unit_price, dec!(3.10));
}

#[tokio::test]
async fn tax_line_for_unknown_item_is_rejected() {
    let app = common::TestDb::new().await;
    let tax_line = line_item_tax_line::Model::new("ordli_MISSING".into(), "VAT".into(), dec!(0.2)).unwrap();

    assert_matches!(
        app.line_items.add_tax_line(tax_line).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn deleting_line_item_removes_its_tax_lines() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let item = app.line_item(&order.id, "Poster", dec!(12)).await;
    let tax_line = line_item_tax_line::Model::new(item.id.clone(), "GST".into(), dec!(0.05)).unwrap();
    app.line_items.add_tax_line(tax_line).await.unwrap();

    assert!(app.line_items.delete(&item.id).await.unwrap());
    assert!(!app.line_items.delete(&item.id).await.unwrap());
    assert!(app.line_items.list_tax_lines(&item.id).await.unwrap().is_empty());
    assert!(app.order_details.find_by_id(&order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn created_at_is_stamped_at_insert_not_construction() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;

    let item = line_item::Model::new(NewLineItem::new(order.id.clone(), "Late", dec!(4))).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let before_insert = chrono::Utc::now();

    let created = app.line_items.create(item).await.unwrap();

    assert!(created.created_at >= before_insert);
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn update_to_missing_order_detail_is_a_validation_error() {
    let app = common::TestDb::new().await;
    let order = app.order_detail().await;
    let created = app.line_item(&order.id, "Orphan", dec!(9)).await;

    let mut moved = created.clone();
    moved.totals_id = "orddetail_MISSING".into();

    assert_matches!(
        app.line_items.update(moved).await,
        Err(ServiceError::ValidationError(_))
    );
    let reloaded = app.line_items.get(&created.id).await.unwrap();
    assert_eq!(reloaded.totals_id, order.id);
}
