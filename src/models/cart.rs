//! 购物车：与前端购物车状态一致的服务端实现，用于下单前报价

use crate::models::order::{MAX_LINE_QUANTITY, OrderItemInput};
use crate::utils::{DeliveryArea, OrderTotals};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    pub product_title: String,
    pub price: i64,
    pub image: Option<String>,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartLine {
    /// 行 ID: productId-size[-color]
    pub fn line_id(product_id: &str, size: Option<&str>, color: Option<&str>) -> String {
        let mut id = format!("{}-{}", product_id, size.unwrap_or_default());
        if let Some(color) = color.filter(|c| !c.is_empty()) {
            id.push('-');
            id.push_str(color);
        }
        id
    }

    pub fn line_total(&self) -> i64 {
        self.price * self.quantity as i64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub items: Vec<CartLine>,
}

impl Cart {
    /// 相同行 ID 的商品合并数量，单行数量不超过上限
    pub fn add(&mut self, mut line: CartLine) {
        line.id = CartLine::line_id(&line.product_id, line.size.as_deref(), line.color.as_deref());
        line.quantity = line.quantity.min(MAX_LINE_QUANTITY);

        match self.items.iter_mut().find(|item| item.id == line.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(line.quantity)
                    .min(MAX_LINE_QUANTITY);
            }
            None => self.items.push(line),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
    }

    /// 数量小于 1 时忽略
    pub fn update_quantity(&mut self, id: &str, quantity: i32) {
        if quantity < 1 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn count(&self) -> i32 {
        self.items
            .iter()
            .fold(0i32, |acc, item| acc.saturating_add(item.quantity))
    }

    pub fn total(&self) -> i64 {
        self.items.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartQuoteRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    pub discount_code: Option<String>,
    pub delivery_area: Option<DeliveryArea>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartQuoteResponse {
    pub items: Vec<CartLine>,
    pub item_count: i32,
    pub totals: OrderTotals,
    pub discount_code: Option<String>,
    /// 促销码不可用时的原因，报价本身仍然返回
    pub discount_error: Option<String>,
    pub warnings: Vec<String>,
}
