use crate::entities::product_entity;
use crate::models::common::deserialize_lenient_i64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_SECTION: &str = "women";
pub const DEFAULT_SUBCATEGORY: &str = "General";
pub const DEFAULT_IMAGE: &str = "/products/women-tunic-1.jpg";

/// 解析数据库中的 JSON 数组文本，格式错误时返回空数组
pub fn parse_string_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub sku: Option<String>,
    pub title: String,
    pub price: i64,
    pub category: String,
    pub section: String,
    pub subcategory: String,
    pub image: String,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub in_stock: bool,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product_entity::Model> for ProductResponse {
    fn from(p: product_entity::Model) -> Self {
        Self {
            images: parse_string_list(&p.images),
            sizes: parse_string_list(&p.sizes),
            colors: parse_string_list(&p.colors),
            in_stock: p.stock > 0,
            id: p.id,
            sku: p.sku,
            title: p.title,
            price: p.price,
            category: p.category,
            section: p.section,
            subcategory: p.subcategory,
            image: p.image,
            description: p.description,
            stock: p.stock,
            is_new: p.is_new,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub category: Option<String>,
    /// women / men
    pub section: Option<String>,
    /// true 时只返回最新的 4 件商品
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// 不传则自动生成
    pub id: Option<String>,
    pub sku: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub price: Option<i64>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub subcategory: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub stock: Option<i64>,
    pub is_new: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub sku: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub price: Option<i64>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub subcategory: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub stock: Option<i64>,
    pub is_new: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> product_entity::Model {
        let now = Utc::now();
        product_entity::Model {
            id: "w1".into(),
            sku: None,
            title: "Embroidered Tunic".into(),
            price: 4500,
            category: "Tunics".into(),
            section: "women".into(),
            subcategory: "Tops".into(),
            image: "/products/women-tunic-1.jpg".into(),
            images: "[]".into(),
            description: None,
            sizes: r#"["S","M","L","XL"]"#.into(),
            colors: "not json".into(),
            stock: 0,
            is_new: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_product_response_parses_lists() {
        let resp = ProductResponse::from(model());
        assert_eq!(resp.sizes, vec!["S", "M", "L", "XL"]);
        assert!(resp.colors.is_empty());
        assert!(!resp.in_stock);
    }

    #[test]
    fn test_create_request_accepts_string_price() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"title":"Kurta","price":"3200","stock":"7","isNew":true}"#)
                .unwrap();
        assert_eq!(req.price, Some(3200));
        assert_eq!(req.stock, Some(7));
        assert_eq!(req.is_new, Some(true));
    }
}
