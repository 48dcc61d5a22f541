use crate::entities::{
    OrderStatus, discount_entity as discounts, order_entity as orders, product_entity as products,
};
use crate::error::AppResult;
use crate::models::DashboardStats;
use crate::services::OrderService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use std::sync::Arc;

const RECENT_ORDERS: u64 = 5;

pub struct DashboardService {
    pool: Arc<DatabaseConnection>,
    order_service: Arc<OrderService>,
    low_stock_threshold: i32,
}

impl DashboardService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        order_service: Arc<OrderService>,
        low_stock_threshold: i32,
    ) -> Self {
        Self {
            pool,
            order_service,
            low_stock_threshold,
        }
    }

    /// 后台概览统计
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let total_orders = orders::Entity::find().count(self.pool.as_ref()).await?;

        // 营业额不含已取消订单
        let total_revenue = orders::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(total), 0)::BIGINT"), "revenue")
            .filter(orders::Column::Status.ne(OrderStatus::Cancelled))
            .into_tuple::<i64>()
            .one(self.pool.as_ref())
            .await?
            .unwrap_or(0);

        let pending_orders = orders::Entity::find()
            .filter(orders::Column::Status.eq(OrderStatus::Pending))
            .count(self.pool.as_ref())
            .await?;
        let processing_orders = orders::Entity::find()
            .filter(orders::Column::Status.eq(OrderStatus::Processing))
            .count(self.pool.as_ref())
            .await?;

        let total_products = products::Entity::find().count(self.pool.as_ref()).await?;
        let low_stock_products = products::Entity::find()
            .filter(products::Column::Stock.lte(self.low_stock_threshold))
            .count(self.pool.as_ref())
            .await?;

        let now = Utc::now();
        let active_discounts = discounts::Entity::find()
            .filter(discounts::Column::Active.eq(true))
            .filter(discounts::Column::ValidFrom.lte(now))
            .filter(discounts::Column::ValidUntil.gte(now))
            .count(self.pool.as_ref())
            .await?;

        let recent_orders = self.order_service.recent_orders(RECENT_ORDERS).await?;

        Ok(DashboardStats {
            total_orders,
            total_revenue,
            pending_orders,
            processing_orders,
            total_products,
            low_stock_products,
            active_discounts,
            recent_orders,
        })
    }
}
