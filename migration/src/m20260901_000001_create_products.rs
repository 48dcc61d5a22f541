use sea_orm_migration::prelude::*;

/// 商品目录
/// - sizes / colors / images 以 JSON 数组文本保存
/// - price 以整数货币单位 (taka) 保存
#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Sku,
    Title,
    Price,
    Category,
    Section,
    Subcategory,
    Image,
    Images,
    Description,
    Sizes,
    Colors,
    Stock,
    IsNew,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Sku).string_len(64).null())
                    .col(ColumnDef::new(Products::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Products::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Products::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Products::Category)
                            .string_len(64)
                            .not_null()
                            .default("General"),
                    )
                    .col(
                        ColumnDef::new(Products::Section)
                            .string_len(32)
                            .not_null()
                            .default("women"),
                    )
                    .col(
                        ColumnDef::new(Products::Subcategory)
                            .string_len(64)
                            .not_null()
                            .default("General"),
                    )
                    .col(ColumnDef::new(Products::Image).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Products::Images)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(
                        ColumnDef::new(Products::Sizes)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Products::Colors)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    // 库存不允许为负
                    .col(
                        ColumnDef::new(Products::Stock)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Products::Stock).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Products::IsNew)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_section_category")
                    .table(Products::Table)
                    .col(Products::Section)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_created_at")
                    .table(Products::Table)
                    .col(Products::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Products::Table).to_owned())
            .await
    }
}
