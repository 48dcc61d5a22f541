use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 商品实体
/// - sizes / colors / images: JSON 数组文本
/// - stock: 可售库存，下单时扣减，取消订单时回补
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sku: Option<String>,
    pub title: String,
    pub price: i64,
    pub category: String,
    pub section: String,
    pub subcategory: String,
    pub image: String,
    pub images: String,
    pub description: Option<String>,
    pub sizes: String,
    pub colors: String,
    pub stock: i32,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn in_stock(&self, quantity: i32) -> bool {
        quantity > 0 && self.stock >= quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
