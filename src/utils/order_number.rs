use crate::entities::order_entity as orders;
use crate::error::AppResult;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

/// ORD-YYYY-NNNN（序号至少4位）
pub fn format_order_number(year: i32, sequence: u64) -> String {
    format!("ORD-{year}-{sequence:04}")
}

/// 生成唯一订单号：以现有订单数 + 1 为起点，若已被占用则顺延
pub async fn generate_unique_order_number<C>(db: &C, now: DateTime<Utc>) -> AppResult<String>
where
    C: ConnectionTrait,
{
    let count = orders::Entity::find().count(db).await?;
    let mut sequence = count + 1;

    loop {
        let order_number = format_order_number(now.year(), sequence);

        // 检查是否已存在
        let exists = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number.clone()))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(order_number);
        }
        sequence += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }

    #[test]
    fn test_format_order_number() {
        assert_eq!(format_order_number(2026, 1), "ORD-2026-0001");
        assert_eq!(format_order_number(2026, 42), "ORD-2026-0042");
        assert_eq!(format_order_number(2026, 12345), "ORD-2026-12345");
    }

    #[tokio::test]
    async fn test_generate_next_free_number() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(3)]])
            .append_query_results([[count_row(0)]])
            .into_connection();

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let number = generate_unique_order_number(&db, now).await.unwrap();
        assert_eq!(number, "ORD-2026-0004");
    }

    #[tokio::test]
    async fn test_generate_skips_taken_number() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(3)]])
            .append_query_results([[count_row(1)]])
            .append_query_results([[count_row(0)]])
            .into_connection();

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let number = generate_unique_order_number(&db, now).await.unwrap();
        assert_eq!(number, "ORD-2026-0005");
    }
}
