use crate::entities::{
    OrderStatus, PaymentMethod, PaymentStatus, order_entity, order_item_entity,
};
use crate::utils::DeliveryArea;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    pub country: Option<String>,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty() && !self.city.trim().is_empty()
    }
}

/// 单个商品行的数量上限
pub const MAX_LINE_QUANTITY: i32 = 100;

/// 下单商品行。客户端传入的价格与标题会被忽略，以商品库为准
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: String,
    pub product_title: Option<String>,
    pub quantity: i32,
    pub price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl OrderItemInput {
    pub fn has_valid_quantity(&self) -> bool {
        (1..=MAX_LINE_QUANTITY).contains(&self.quantity)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub delivery_area: Option<DeliveryArea>,
    pub shipping_cost: Option<i64>,
    pub discount_code: Option<String>,
    /// 客户端计算的折扣，仅作参考，服务端会重新计算
    pub discount: Option<i64>,
    /// 移动支付交易号
    #[serde(alias = "trxId")]
    pub transaction_id: Option<String>,
    pub sender_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: Option<String>,
    pub product_title: String,
    pub quantity: i32,
    pub price: i64,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(item: order_item_entity::Model) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_title: item.product_title,
            quantity: item.quantity,
            price: item.price,
            size: item.size,
            color: item.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: i64,
    pub discount: i64,
    pub discount_code: Option<String>,
    pub shipping: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_parts(order: order_entity::Model, items: Vec<order_item_entity::Model>) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: order.subtotal,
            discount: order.discount,
            discount_code: order.discount_code,
            shipping: order.shipping,
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            shipping_address: ShippingAddress {
                street: order.shipping_street,
                city: order.shipping_city,
                state: order.shipping_state,
                pincode: order.shipping_pincode,
                country: Some(order.shipping_country),
            },
            notes: order.notes,
            tracking_number: order.tracking_number,
            courier_name: order.courier_name,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    /// 按订单号、客户姓名或手机号模糊搜索
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackOrderQuery {
    pub order_number: Option<String>,
    pub phone: Option<String>,
}

/// PATCH /orders/{orderNumber} 的请求体
/// 管理员使用 status / paymentStatus / trackingNumber / courierName，
/// 顾客使用 action / phone / shippingAddress
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
    pub action: Option<String>,
    pub phone: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerOrderAction {
    Cancel,
    UpdateAddress,
}

impl std::str::FromStr for CustomerOrderAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel" => Ok(CustomerOrderAction::Cancel),
            "update_address" => Ok(CustomerOrderAction::UpdateAddress),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_uses_camel_case() {
        let body = r#"{
            "customerName": "Ayesha Rahman",
            "customerEmail": "ayesha@example.com",
            "customerPhone": "01712345678",
            "shippingAddress": {"street": "House 12, Road 5", "city": "Dhaka", "state": "Dhaka", "pincode": "1207"},
            "items": [{"id": "w1-M", "productId": "w1", "productTitle": "Tunic", "price": 1, "quantity": 2, "size": "M"}],
            "paymentMethod": "bkash",
            "deliveryArea": "inside",
            "discountCode": "welcome10"
        }"#;
        let req: CreateOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].product_id, "w1");
        assert_eq!(req.payment_method, Some(PaymentMethod::Bkash));
        assert_eq!(req.delivery_area, Some(DeliveryArea::Inside));
        let address = req.shipping_address.unwrap();
        assert!(address.is_complete());
        assert_eq!(address.country, None);
    }

    #[test]
    fn test_customer_action_parse() {
        assert_eq!(
            "cancel".parse::<CustomerOrderAction>(),
            Ok(CustomerOrderAction::Cancel)
        );
        assert_eq!(
            "update_address".parse::<CustomerOrderAction>(),
            Ok(CustomerOrderAction::UpdateAddress)
        );
        assert!("refund".parse::<CustomerOrderAction>().is_err());
    }
}
