use crate::m20260901_000003_create_orders::Orders;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Tracking {
    TrackingNumber,
    CourierName,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 发货时记录快递单号与快递公司
        manager
            .alter_table(
                Table::alter()
                    .table(Orders::Table)
                    .add_column_if_not_exists(
                        ColumnDef::new(Tracking::TrackingNumber)
                            .string_len(128)
                            .null(),
                    )
                    .add_column_if_not_exists(
                        ColumnDef::new(Tracking::CourierName).string_len(128).null(),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Orders::Table)
                    .drop_column(Tracking::TrackingNumber)
                    .drop_column(Tracking::CourierName)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
