use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Discounts {
    Table,
    Id,
    Code,
    DiscountType,
    Value,
    Description,
    ValidFrom,
    ValidUntil,
    MinPurchase,
    MaxDiscount,
    Active,
    UsageCount,
    MaxUsage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("discount_type"))
                    .values(vec![Alias::new("percentage"), Alias::new("fixed")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Discounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Discounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Discounts::Code).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Discounts::DiscountType)
                            .custom(Alias::new("discount_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Discounts::Value).big_integer().not_null())
                    .col(
                        ColumnDef::new(Discounts::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Discounts::ValidFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Discounts::ValidUntil)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Discounts::MinPurchase).big_integer().null())
                    .col(ColumnDef::new(Discounts::MaxDiscount).big_integer().null())
                    .col(
                        ColumnDef::new(Discounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Discounts::UsageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Discounts::MaxUsage).integer().null())
                    .col(
                        ColumnDef::new(Discounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Discounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 优惠码唯一（统一存大写）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discounts_code_unique")
                    .table(Discounts::Table)
                    .col(Discounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // usage_count 不超过 max_usage
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "ALTER TABLE discounts ADD CONSTRAINT chk_discounts_usage \
             CHECK (max_usage IS NULL OR usage_count <= max_usage)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Discounts::Table).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("discount_type"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
