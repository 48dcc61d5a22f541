use crate::entities::{DiscountType, discount_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDiscountRequest {
    pub code: Option<String>,
    #[serde(default)]
    pub cart_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateDiscountResponse {
    pub code: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub id: i64,
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: i64,
    pub description: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub min_purchase: Option<i64>,
    pub max_discount: Option<i64>,
    pub active: bool,
    pub usage_count: i32,
    pub max_usage: Option<i32>,
    pub remaining_uses: Option<i32>,
    pub currently_valid: bool,
    pub created_at: DateTime<Utc>,
}

impl DiscountResponse {
    pub fn from_model(d: discount_entity::Model, now: DateTime<Utc>) -> Self {
        Self {
            remaining_uses: d.remaining_uses(),
            currently_valid: d.active && d.is_within_window(now) && !d.is_exhausted(),
            id: d.id,
            code: d.code,
            discount_type: d.discount_type,
            value: d.value,
            description: d.description,
            valid_from: d.valid_from,
            valid_until: d.valid_until,
            min_purchase: d.min_purchase,
            max_discount: d.max_discount,
            active: d.active,
            usage_count: d.usage_count,
            max_usage: d.max_usage,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscountRequest {
    /// 不传则生成 8 位随机码
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: i64,
    #[serde(default)]
    pub description: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
    pub min_purchase: Option<i64>,
    pub max_discount: Option<i64>,
    pub active: Option<bool>,
    pub max_usage: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscountRequest {
    #[serde(rename = "type")]
    pub discount_type: Option<DiscountType>,
    pub value: Option<i64>,
    pub description: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_purchase: Option<i64>,
    pub max_discount: Option<i64>,
    pub active: Option<bool>,
    pub max_usage: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DiscountQuery {
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
