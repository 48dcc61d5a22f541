//! 价格计算：促销码折扣、运费与订单合计

use crate::config::ShopConfig;
use crate::entities::{DiscountType, discount_entity};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 配送区域：达卡市内 / 市外
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryArea {
    Inside,
    Outside,
}

pub fn shipping_cost(area: Option<DeliveryArea>, shop: &ShopConfig) -> i64 {
    match area {
        Some(DeliveryArea::Inside) => shop.shipping_inside,
        Some(DeliveryArea::Outside) => shop.shipping_outside,
        None => shop.default_shipping,
    }
}

/// 确定订单运费。客户端传入的 shipping_cost 只能是已配置的费率之一。
pub fn resolve_shipping(
    area: Option<DeliveryArea>,
    requested: Option<i64>,
    shop: &ShopConfig,
) -> AppResult<i64> {
    if area.is_some() {
        return Ok(shipping_cost(area, shop));
    }
    match requested {
        None => Ok(shop.default_shipping),
        Some(cost)
            if cost == shop.shipping_inside
                || cost == shop.shipping_outside
                || cost == shop.default_shipping =>
        {
            Ok(cost)
        }
        Some(cost) => Err(AppError::ValidationError(format!(
            "Unsupported shipping cost: {cost}"
        ))),
    }
}

/// 校验促销码当前是否可用于该购物车金额
pub fn check_discount_usable(
    discount: &discount_entity::Model,
    cart_total: i64,
    now: DateTime<Utc>,
    currency_symbol: &str,
) -> AppResult<()> {
    if !discount.active {
        return Err(AppError::ValidationError(
            "Invalid or expired promo code".to_string(),
        ));
    }
    if !discount.is_within_window(now) {
        return Err(AppError::ValidationError(
            "Promo code is not currently valid".to_string(),
        ));
    }
    if discount.is_exhausted() {
        return Err(AppError::ValidationError(
            "Promo code usage limit reached".to_string(),
        ));
    }
    if let Some(min) = discount.min_purchase
        && cart_total < min
    {
        return Err(AppError::ValidationError(format!(
            "Minimum purchase of {currency_symbol}{min} required"
        )));
    }
    Ok(())
}

/// 计算折扣金额：百分比按购物车金额计算并受 max_discount 封顶，固定金额直接抵扣；
/// 折扣不会超过购物车金额。
pub fn discount_amount(discount: &discount_entity::Model, cart_total: i64) -> i64 {
    let cart_total = cart_total.max(0);
    let amount = match discount.discount_type {
        DiscountType::Percentage => {
            let raw = cart_total * discount.value / 100;
            match discount.max_discount {
                Some(cap) if raw > cap => cap,
                _ => raw,
            }
        }
        DiscountType::Fixed => discount.value,
    };
    amount.clamp(0, cart_total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: i64,
    pub shipping: i64,
    pub discount: i64,
    pub total: i64,
}

impl OrderTotals {
    /// total = subtotal + shipping - discount，最低为 0
    pub fn compute(subtotal: i64, shipping: i64, discount: i64) -> Self {
        let total = (subtotal + shipping - discount).max(0);
        Self {
            subtotal,
            shipping,
            discount,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn discount(kind: DiscountType, value: i64) -> discount_entity::Model {
        let now = Utc::now();
        discount_entity::Model {
            id: 1,
            code: "TEST".into(),
            discount_type: kind,
            value,
            description: String::new(),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            min_purchase: None,
            max_discount: None,
            active: true,
            usage_count: 0,
            max_usage: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let d = discount(DiscountType::Percentage, 10);
        assert_eq!(discount_amount(&d, 9100), 910);
    }

    #[test]
    fn test_percentage_discount_is_capped() {
        let mut d = discount(DiscountType::Percentage, 25);
        d.max_discount = Some(2000);
        assert_eq!(discount_amount(&d, 6600), 1650);
        assert_eq!(discount_amount(&d, 10_000), 2000);
    }

    #[test]
    fn test_fixed_discount_never_exceeds_cart() {
        let d = discount(DiscountType::Fixed, 500);
        assert_eq!(discount_amount(&d, 3500), 500);
        assert_eq!(discount_amount(&d, 300), 300);
    }

    #[test]
    fn test_valid_discount_reduces_total_by_computed_amount() {
        let d = discount(DiscountType::Percentage, 10);
        let subtotal = 9100;
        let amount = discount_amount(&d, subtotal);
        let totals = OrderTotals::compute(subtotal, 150, amount);
        assert_eq!(totals.total, 9100 + 150 - 910);
        assert_eq!(totals.total, totals.subtotal + totals.shipping - totals.discount);
    }

    #[test]
    fn test_totals_clamped_at_zero() {
        assert_eq!(OrderTotals::compute(100, 0, 500).total, 0);
    }

    #[test]
    fn test_inactive_code_is_rejected() {
        let mut d = discount(DiscountType::Fixed, 500);
        d.active = false;
        let err = check_discount_usable(&d, 5000, Utc::now(), "৳").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Invalid or expired promo code");
    }

    #[test]
    fn test_code_outside_window_is_rejected() {
        let mut d = discount(DiscountType::Fixed, 500);
        d.valid_from = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        d.valid_until = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let err = check_discount_usable(&d, 5000, Utc::now(), "৳").unwrap_err();
        assert!(err.to_string().contains("not currently valid"));
    }

    #[test]
    fn test_usage_limit_reached() {
        let mut d = discount(DiscountType::Fixed, 500);
        d.max_usage = Some(3);
        d.usage_count = 3;
        let err = check_discount_usable(&d, 5000, Utc::now(), "৳").unwrap_err();
        assert!(err.to_string().contains("usage limit reached"));
        assert_eq!(d.remaining_uses(), Some(0));
    }

    #[test]
    fn test_minimum_purchase_message() {
        let mut d = discount(DiscountType::Fixed, 500);
        d.min_purchase = Some(3000);
        let err = check_discount_usable(&d, 2999, Utc::now(), "৳").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Minimum purchase of ৳3000 required"
        );
        assert!(check_discount_usable(&d, 3000, Utc::now(), "৳").is_ok());
    }

    #[test]
    fn test_shipping_rates() {
        let shop = ShopConfig::default();
        assert_eq!(shipping_cost(Some(DeliveryArea::Inside), &shop), 70);
        assert_eq!(shipping_cost(Some(DeliveryArea::Outside), &shop), 150);
        assert_eq!(shipping_cost(None, &shop), 100);
    }

    #[test]
    fn test_resolve_shipping_rejects_arbitrary_cost() {
        let shop = ShopConfig::default();
        assert_eq!(resolve_shipping(None, Some(150), &shop).unwrap(), 150);
        assert_eq!(resolve_shipping(None, None, &shop).unwrap(), 100);
        assert!(resolve_shipping(None, Some(1), &shop).is_err());
        // 区域优先
        assert_eq!(
            resolve_shipping(Some(DeliveryArea::Inside), Some(1), &shop).unwrap(),
            70
        );
    }
}
