use crate::config::ShopConfig;
use crate::entities::product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::{Cart, CartLine, CartQuoteRequest, CartQuoteResponse};
use crate::services::discount_service::find_usable_discount;
use crate::utils::{OrderTotals, shipping_cost};
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;
use std::sync::Arc;

/// 用商品库价格重建购物车；下架商品与无效数量记为提示而不是报错
pub fn build_cart(
    req: &CartQuoteRequest,
    catalog: &HashMap<String, products::Model>,
) -> (Cart, Vec<String>) {
    let mut cart = Cart::default();
    let mut warnings = Vec::new();

    for item in &req.items {
        if !item.has_valid_quantity() {
            warnings.push(format!("Ignored invalid quantity for {}", item.product_id));
            continue;
        }
        let Some(product) = catalog.get(&item.product_id) else {
            warnings.push(format!("Product {} is no longer available", item.product_id));
            continue;
        };
        cart.add(CartLine {
            id: String::new(),
            product_id: product.id.clone(),
            product_title: product.title.clone(),
            price: product.price,
            image: Some(product.image.clone()),
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
        });
    }

    // 同一商品不同尺码共用库存
    let mut wanted: HashMap<&str, i32> = HashMap::new();
    for line in &cart.items {
        let qty = wanted.entry(line.product_id.as_str()).or_default();
        *qty = qty.saturating_add(line.quantity);
    }
    let mut short: Vec<String> = wanted
        .into_iter()
        .filter_map(|(id, qty)| {
            let product = catalog.get(id)?;
            (qty > product.stock).then(|| {
                if product.stock <= 0 {
                    format!("{} is out of stock", product.title)
                } else {
                    format!("Only {} left for {}", product.stock, product.title)
                }
            })
        })
        .collect();
    short.sort();
    warnings.extend(short);

    (cart, warnings)
}

pub struct CartService {
    pool: Arc<DatabaseConnection>,
    shop: ShopConfig,
}

impl CartService {
    pub fn new(pool: Arc<DatabaseConnection>, shop: ShopConfig) -> Self {
        Self { pool, shop }
    }

    /// 结算前报价：重新定价、运费、促销码与库存提示
    pub async fn quote(&self, req: &CartQuoteRequest) -> AppResult<CartQuoteResponse> {
        let ids: Vec<String> = req.items.iter().map(|i| i.product_id.clone()).collect();
        let catalog: HashMap<String, products::Model> = if ids.is_empty() {
            HashMap::new()
        } else {
            products::Entity::find()
                .filter(products::Column::Id.is_in(ids))
                .all(self.pool.as_ref())
                .await?
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect()
        };

        let (cart, warnings) = build_cart(req, &catalog);
        let subtotal = cart.total();

        let code = req
            .discount_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let (discount, discount_code, discount_error) = match code {
            Some(code) if !cart.is_empty() => {
                match find_usable_discount(
                    self.pool.as_ref(),
                    code,
                    subtotal,
                    Utc::now(),
                    &self.shop.currency_symbol,
                )
                .await
                {
                    Ok((model, amount)) => (amount, Some(model.code), None),
                    Err(AppError::ValidationError(msg)) => (0, None, Some(msg)),
                    Err(e) => return Err(e),
                }
            }
            _ => (0, None, None),
        };

        let shipping = if cart.is_empty() {
            0
        } else {
            shipping_cost(req.delivery_area, &self.shop)
        };

        Ok(CartQuoteResponse {
            item_count: cart.count(),
            totals: OrderTotals::compute(subtotal, shipping, discount),
            items: cart.items,
            discount_code,
            discount_error,
            warnings,
        })
    }
}
