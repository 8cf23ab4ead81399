use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_order_detail_table::Migration),
            Box::new(m20240301_000002_create_order_line_item_table::Migration),
            Box::new(m20240301_000003_create_line_item_children_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_order_detail_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_order_detail_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderDetail::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetail::Id)
                                .text()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetail::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(OrderDetail::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(OrderDetail::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderDetail::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderDetail {
        Table,
        Id,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_order_line_item_table {

    use crate::schema::{index_name, LINE_ITEM_TABLE};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_order_line_item_table"
        }
    }

    fn nullable_text(col: OrderLineItem) -> ColumnDef {
        ColumnDef::new(col).text().null().to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLineItem::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLineItem::Id)
                                .text()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLineItem::TotalsId).text().not_null())
                        .col(ColumnDef::new(OrderLineItem::Title).text().not_null())
                        .col(&mut nullable_text(OrderLineItem::Subtitle))
                        .col(&mut nullable_text(OrderLineItem::Thumbnail))
                        .col(&mut nullable_text(OrderLineItem::VariantId))
                        .col(&mut nullable_text(OrderLineItem::ProductId))
                        .col(&mut nullable_text(OrderLineItem::ProductTitle))
                        .col(&mut nullable_text(OrderLineItem::ProductDescription))
                        .col(&mut nullable_text(OrderLineItem::ProductSubtitle))
                        .col(&mut nullable_text(OrderLineItem::ProductType))
                        .col(&mut nullable_text(OrderLineItem::ProductCollection))
                        .col(&mut nullable_text(OrderLineItem::ProductHandle))
                        .col(&mut nullable_text(OrderLineItem::VariantSku))
                        .col(&mut nullable_text(OrderLineItem::VariantBarcode))
                        .col(&mut nullable_text(OrderLineItem::VariantTitle))
                        .col(
                            ColumnDef::new(OrderLineItem::VariantOptionValues)
                                .json_binary()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::RequiresShipping)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::IsDiscountable)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::IsTaxInclusive)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::CompareAtUnitPrice)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::RawCompareAtUnitPrice)
                                .json_binary()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderLineItem::UnitPrice).decimal().not_null())
                        .col(
                            ColumnDef::new(OrderLineItem::RawUnitPrice)
                                .json_binary()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(OrderLineItem::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_item_totals_id")
                                .from(OrderLineItem::Table, OrderLineItem::TotalsId)
                                .to(OrderDetail::Table, OrderDetail::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, column) in [
                (index_name(LINE_ITEM_TABLE, "totals_id"), OrderLineItem::TotalsId),
                (index_name(LINE_ITEM_TABLE, "product_id"), OrderLineItem::ProductId),
                (index_name(LINE_ITEM_TABLE, "variant_id"), OrderLineItem::VariantId),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(OrderLineItem::Table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLineItem::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum OrderLineItem {
        Table,
        Id,
        TotalsId,
        Title,
        Subtitle,
        Thumbnail,
        VariantId,
        ProductId,
        ProductTitle,
        ProductDescription,
        ProductSubtitle,
        ProductType,
        ProductCollection,
        ProductHandle,
        VariantSku,
        VariantBarcode,
        VariantTitle,
        VariantOptionValues,
        RequiresShipping,
        IsDiscountable,
        IsTaxInclusive,
        CompareAtUnitPrice,
        RawCompareAtUnitPrice,
        UnitPrice,
        RawUnitPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderDetail {
        Table,
        Id,
    }
}

mod m20240301_000003_create_line_item_children_tables {

    use crate::schema::index_name;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_line_item_children_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLineItemTaxLine::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderLineItemTaxLine::Id).text().primary_key().not_null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::ItemId).text().not_null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::Description).text().null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::TaxRateId).text().null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::Code).text().not_null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::Rate).decimal().not_null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::RawRate).json_binary().not_null())
                        .col(ColumnDef::new(OrderLineItemTaxLine::ProviderId).text().null())
                        .col(
                            ColumnDef::new(OrderLineItemTaxLine::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(OrderLineItemTaxLine::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_item_tax_line_item_id")
                                .from(OrderLineItemTaxLine::Table, OrderLineItemTaxLine::ItemId)
                                .to(OrderLineItem::Table, OrderLineItem::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(index_name("order_line_item_tax_line", "item_id"))
                        .table(OrderLineItemTaxLine::Table)
                        .col(OrderLineItemTaxLine::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderLineItemAdjustment::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLineItemAdjustment::Id)
                                .text()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLineItemAdjustment::ItemId).text().not_null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::Description).text().null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::PromotionId).text().null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::Code).text().null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::Amount).decimal().not_null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::RawAmount).json_binary().not_null())
                        .col(ColumnDef::new(OrderLineItemAdjustment::ProviderId).text().null())
                        .col(
                            ColumnDef::new(OrderLineItemAdjustment::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(OrderLineItemAdjustment::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_item_adjustment_item_id")
                                .from(OrderLineItemAdjustment::Table, OrderLineItemAdjustment::ItemId)
                                .to(OrderLineItem::Table, OrderLineItem::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(index_name("order_line_item_adjustment", "item_id"))
                        .table(OrderLineItemAdjustment::Table)
                        .col(OrderLineItemAdjustment::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLineItemAdjustment::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderLineItemTaxLine::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLineItem {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum OrderLineItemTaxLine {
        Table,
        Id,
        ItemId,
        Description,
        TaxRateId,
        Code,
        Rate,
        RawRate,
        ProviderId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderLineItemAdjustment {
        Table,
        Id,
        ItemId,
        Description,
        PromotionId,
        Code,
        Amount,
        RawAmount,
        ProviderId,
        CreatedAt,
        UpdatedAt,
    }
}
