use crate::config::ShopConfig;
use crate::entities::{
    OrderStatus, PaymentMethod, PaymentStatus, order_entity as orders,
    order_item_entity as order_items, product_entity as products,
};
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OrderNotification};
use crate::models::{
    CreateOrderRequest, CustomerOrderAction, OrderQuery, OrderResponse, PaginatedResponse,
    PaginationParams, ShippingAddress, TrackOrderQuery, UpdateOrderRequest,
};
use crate::services::discount_service::{find_usable_discount, increment_usage};
use crate::utils::{
    OrderTotals, generate_unique_order_number, normalize_phone, phones_match, resolve_shipping,
    validate_phone,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 下单时按商品库重新定价后的订单行
#[derive(Debug, Clone)]
struct PricedLine {
    product_id: String,
    product_title: String,
    price: i64,
    quantity: i32,
    size: Option<String>,
    color: Option<String>,
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// 校验下单请求，返回收货地址
pub fn validate_order_request(req: &CreateOrderRequest) -> AppResult<ShippingAddress> {
    if req.items.is_empty() {
        return Err(AppError::ValidationError("No items in order".into()));
    }
    let address = req
        .shipping_address
        .clone()
        .filter(ShippingAddress::is_complete)
        .ok_or_else(|| AppError::ValidationError("Shipping address is required".into()))?;

    if req.customer_name.trim().is_empty() {
        return Err(AppError::ValidationError("Customer name is required".into()));
    }
    if req.customer_phone.trim().is_empty() {
        return Err(AppError::ValidationError("Customer phone is required".into()));
    }
    validate_phone(&req.customer_phone)?;

    if let Some(item) = req.items.iter().find(|item| !item.has_valid_quantity()) {
        return Err(AppError::ValidationError(format!(
            "Invalid quantity for product {}",
            item.product_id
        )));
    }

    let method = req.payment_method.unwrap_or_default();
    if method.requires_transaction_id() {
        let has_trx = req.transaction_id.as_deref().is_some_and(|v| !v.trim().is_empty());
        let has_sender = req.sender_phone.as_deref().is_some_and(|v| !v.trim().is_empty());
        if !has_trx || !has_sender {
            return Err(AppError::ValidationError(
                "Transaction ID and sender number are required for this payment method".into(),
            ));
        }
    }

    Ok(address)
}

/// 移动支付信息附加在备注里，格式: Payment: BKASH | TrxID: xxx | Sender: 01xxx
pub fn build_order_notes(
    notes: Option<&str>,
    method: PaymentMethod,
    transaction_id: Option<&str>,
    sender_phone: Option<&str>,
) -> Option<String> {
    let customer_notes = notes.and_then(trimmed);
    let payment_note = method.requires_transaction_id().then(|| {
        format!(
            "Payment: {} | TrxID: {} | Sender: {}",
            method.to_string().to_uppercase(),
            transaction_id.unwrap_or_default().trim(),
            sender_phone.unwrap_or_default().trim()
        )
    });

    match (payment_note, customer_notes) {
        (Some(p), Some(n)) => Some(format!("{p}\n{n}")),
        (Some(p), None) => Some(p),
        (None, n) => n,
    }
}

/// 顾客自助修改订单的前置检查：手机号一致、未超过修改时限、订单仍为待处理
pub fn check_customer_can_modify(
    order: &orders::Model,
    phone: &str,
    now: DateTime<Utc>,
    edit_window_minutes: i64,
) -> AppResult<()> {
    if !phones_match(&order.customer_phone, phone) {
        return Err(AppError::Forbidden(
            "Phone number does not match this order".into(),
        ));
    }
    if now - order.created_at > Duration::minutes(edit_window_minutes) {
        return Err(AppError::Forbidden(
            "Order modification period has expired".into(),
        ));
    }
    if order.status != OrderStatus::Pending {
        return Err(AppError::Forbidden(
            "Order is already processing and cannot be modified".into(),
        ));
    }
    Ok(())
}

/// 原子扣减库存 (where stock >= quantity)
async fn reserve_stock<C>(db: &C, product: &products::Model, quantity: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let result = products::Entity::update_many()
        .col_expr(
            products::Column::Stock,
            Expr::col(products::Column::Stock).sub(quantity),
        )
        .filter(products::Column::Id.eq(product.id.clone()))
        .filter(products::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        return Err(AppError::ValidationError(format!(
            "Insufficient stock for {}",
            product.title
        )));
    }
    Ok(())
}

/// 按当前状态原子切换订单状态 (where status = from)，并发修改时返回冲突
async fn switch_status<C>(
    db: &C,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: DateTime<Utc>,
) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let result = orders::Entity::update_many()
        .set(orders::ActiveModel {
            status: Set(to),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(orders::Column::Id.eq(order_id))
        .filter(orders::Column::Status.eq(from))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        return Err(AppError::Conflict(
            "Order status has changed, please reload and retry".into(),
        ));
    }
    Ok(())
}

/// 取消订单时回补库存（已删除的商品跳过）
/// 只能在 switch_status 成功之后调用，保证同一订单只回补一次
async fn restore_stock<C>(db: &C, order_id: i64) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .all(db)
        .await?;

    for item in items {
        let Some(product_id) = item.product_id else {
            continue;
        };
        products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).add(item.quantity),
            )
            .filter(products::Column::Id.eq(product_id))
            .exec(db)
            .await?;
    }
    Ok(())
}

pub struct OrderService {
    pool: Arc<DatabaseConnection>,
    shop: ShopConfig,
    mailer: Mailer,
}

impl OrderService {
    pub fn new(pool: Arc<DatabaseConnection>, shop: ShopConfig, mailer: Mailer) -> Self {
        Self { pool, shop, mailer }
    }

    /// 下单
    ///
    /// 逻辑:
    /// 1. 校验请求（商品、收货地址、姓名、手机号、数量）
    /// 2. 事务内按商品库重新定价，并原子扣减库存
    /// 3. 若带促销码，服务端重新校验并原子增加使用次数
    /// 4. 计算运费与合计，生成订单号，写入订单及订单行
    /// 5. 提交后发送确认邮件（失败只记日志）
    pub async fn create_order(&self, req: CreateOrderRequest) -> AppResult<OrderResponse> {
        let address = validate_order_request(&req)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;

        let mut lines = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let product = products::Entity::find_by_id(item.product_id.clone())
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Product {} is no longer available",
                        item.product_id
                    ))
                })?;

            if !product.in_stock(item.quantity) {
                return Err(AppError::ValidationError(format!(
                    "Insufficient stock for {}",
                    product.title
                )));
            }
            reserve_stock(&txn, &product, item.quantity).await?;

            lines.push(PricedLine {
                product_id: product.id,
                product_title: product.title,
                price: product.price,
                quantity: item.quantity,
                size: item.size.as_deref().and_then(trimmed),
                color: item.color.as_deref().and_then(trimmed),
            });
        }

        let subtotal: i64 = lines.iter().map(|l| l.price * l.quantity as i64).sum();

        let (discount, discount_code) = match req.discount_code.as_deref().and_then(trimmed) {
            Some(code) => {
                let (model, amount) = find_usable_discount(
                    &txn,
                    &code,
                    subtotal,
                    now,
                    &self.shop.currency_symbol,
                )
                .await?;
                increment_usage(&txn, model.id).await?;
                (amount, Some(model.code))
            }
            None => (0, None),
        };
        if let Some(client_discount) = req.discount
            && client_discount != discount
        {
            log::warn!(
                "Client discount {} differs from computed {}, using computed value",
                client_discount,
                discount
            );
        }

        let shipping = resolve_shipping(req.delivery_area, req.shipping_cost, &self.shop)?;
        let totals = OrderTotals::compute(subtotal, shipping, discount);
        let order_number = generate_unique_order_number(&txn, now).await?;
        let payment_method = req.payment_method.unwrap_or_default();

        let order = orders::ActiveModel {
            order_number: Set(order_number),
            customer_name: Set(req.customer_name.trim().to_string()),
            customer_email: Set(req.customer_email.trim().to_string()),
            customer_phone: Set(normalize_phone(&req.customer_phone)),
            subtotal: Set(totals.subtotal),
            discount: Set(totals.discount),
            discount_code: Set(discount_code),
            shipping: Set(totals.shipping),
            total: Set(totals.total),
            status: Set(OrderStatus::Pending),
            payment_status: Set(PaymentStatus::Pending),
            payment_method: Set(payment_method),
            shipping_street: Set(address.street.trim().to_string()),
            shipping_city: Set(address.city.trim().to_string()),
            shipping_state: Set(address.state.trim().to_string()),
            shipping_pincode: Set(address.pincode.trim().to_string()),
            shipping_country: Set(address
                .country
                .as_deref()
                .and_then(trimmed)
                .unwrap_or_else(|| self.shop.default_country.clone())),
            notes: Set(build_order_notes(
                req.notes.as_deref(),
                payment_method,
                req.transaction_id.as_deref(),
                req.sender_phone.as_deref(),
            )),
            tracking_number: Set(None),
            courier_name: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(Some(line.product_id)),
                product_title: Set(line.product_title),
                quantity: Set(line.quantity),
                price: Set(line.price),
                size: Set(line.size),
                color: Set(line.color),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        txn.commit().await?;

        log::info!(
            "Order created: {}, total={}, items={}",
            order.order_number,
            order.total,
            items.len()
        );

        if let Err(e) = self
            .mailer
            .send_order_confirmation(&OrderNotification::from(&order))
            .await
        {
            log::error!(
                "Failed to send confirmation email for {}: {}",
                order.order_number,
                e
            );
        }

        Ok(OrderResponse::from_parts(order, items))
    }

    /// 后台订单列表（最新优先）
    pub async fn list_orders(&self, query: &OrderQuery) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut condition = Condition::all();
        if let Some(status) = query.status {
            condition = condition.add(orders::Column::Status.eq(status));
        }
        if let Some(search) = query.search.as_deref().and_then(trimmed) {
            let pattern = format!("%{}%", search.to_lowercase());
            let lower = |col: orders::Column| Expr::expr(Func::lower(Expr::col(col)));
            condition = condition.add(
                Condition::any()
                    .add(lower(orders::Column::OrderNumber).like(pattern.clone()))
                    .add(lower(orders::Column::CustomerName).like(pattern.clone()))
                    .add(orders::Column::CustomerPhone.like(pattern)),
            );
        }

        let base_query = orders::Entity::find().filter(condition);
        let total = base_query.clone().count(self.pool.as_ref()).await?;
        let page = base_query
            .order_by_desc(orders::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;

        let data = self.attach_items(page).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    /// 最近的订单（后台概览使用）
    pub async fn recent_orders(&self, limit: u64) -> AppResult<Vec<OrderResponse>> {
        let list = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .limit(limit)
            .all(self.pool.as_ref())
            .await?;
        self.attach_items(list).await
    }

    pub async fn get_order(&self, order_number: &str) -> AppResult<OrderResponse> {
        let order = self.find_by_number(self.pool.as_ref(), order_number).await?;
        self.with_items(order).await
    }

    /// 顾客查询订单：订单号（若同时提供手机号则须匹配）或手机号（返回最新订单）
    pub async fn track_order(&self, query: &TrackOrderQuery) -> AppResult<OrderResponse> {
        let order_number = query.order_number.as_deref().and_then(trimmed);
        let phone = query.phone.as_deref().and_then(trimmed);

        let order = match (order_number, phone) {
            (None, None) => {
                return Err(AppError::ValidationError(
                    "Please provide either Order Number or Phone Number".into(),
                ));
            }
            (Some(number), phone) => {
                let order = self.find_by_number(self.pool.as_ref(), &number).await?;
                if let Some(phone) = phone
                    && !phones_match(&order.customer_phone, &phone)
                {
                    return Err(AppError::NotFound("Order not found".into()));
                }
                order
            }
            (None, Some(phone)) => orders::Entity::find()
                .filter(orders::Column::CustomerPhone.eq(normalize_phone(&phone)))
                .order_by_desc(orders::Column::CreatedAt)
                .one(self.pool.as_ref())
                .await?
                .ok_or_else(|| AppError::NotFound("Order not found".into()))?,
        };

        self.with_items(order).await
    }

    /// 顾客自助修改：取消订单或修改收货地址
    pub async fn customer_modify_order(
        &self,
        order_number: &str,
        req: UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let phone = req
            .phone
            .as_deref()
            .and_then(trimmed)
            .ok_or_else(|| {
                AppError::ValidationError("Phone number is required to modify an order".into())
            })?;

        let txn = self.pool.begin().await?;
        let order = self.find_by_number(&txn, order_number).await?;
        check_customer_can_modify(&order, &phone, Utc::now(), self.shop.edit_window_minutes)?;

        let action = req
            .action
            .as_deref()
            .and_then(|a| a.parse::<CustomerOrderAction>().ok());

        let updated = match (action, req.shipping_address) {
            (Some(CustomerOrderAction::Cancel), _) => {
                let now = Utc::now();
                switch_status(
                    &txn,
                    order.id,
                    OrderStatus::Pending,
                    OrderStatus::Cancelled,
                    now,
                )
                .await?;
                restore_stock(&txn, order.id).await?;
                orders::Model {
                    status: OrderStatus::Cancelled,
                    updated_at: now,
                    ..order
                }
            }
            (Some(CustomerOrderAction::UpdateAddress), Some(address)) if address.is_complete() => {
                let mut am = order.into_active_model();
                am.shipping_street = Set(address.street.trim().to_string());
                am.shipping_city = Set(address.city.trim().to_string());
                am.shipping_state = Set(address.state.trim().to_string());
                am.shipping_pincode = Set(address.pincode.trim().to_string());
                if let Some(country) = address.country.as_deref().and_then(trimmed) {
                    am.shipping_country = Set(country);
                }
                am.updated_at = Set(Utc::now());
                am.update(&txn).await?
            }
            _ => return Err(AppError::ValidationError("Invalid action".into())),
        };

        txn.commit().await?;
        log::info!(
            "Order {} modified by customer, status={}",
            updated.order_number,
            updated.status
        );

        self.with_items(updated).await
    }

    /// 后台更新订单状态、支付状态与物流信息
    pub async fn admin_update_order(
        &self,
        order_number: &str,
        req: UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;
        let order = self.find_by_number(&txn, order_number).await?;
        let previous = order.status;

        if let Some(next) = req.status
            && next != previous
        {
            if !previous.can_transition_to(next) {
                return Err(AppError::ValidationError(format!(
                    "Cannot change order status from {} to {}",
                    previous, next
                )));
            }
            switch_status(&txn, order.id, previous, next, Utc::now()).await?;
            if next == OrderStatus::Cancelled {
                restore_stock(&txn, order.id).await?;
            }
        }

        // 状态已由 switch_status 写入，这里只更新其余字段
        let mut am = order.into_active_model();
        if let Some(payment_status) = req.payment_status {
            am.payment_status = Set(payment_status);
        }
        if let Some(tracking_number) = req.tracking_number {
            am.tracking_number = Set(trimmed(&tracking_number));
        }
        if let Some(courier_name) = req.courier_name {
            am.courier_name = Set(trimmed(&courier_name));
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;

        txn.commit().await?;
        log::info!(
            "Order {} updated by admin: {} -> {}",
            updated.order_number,
            previous,
            updated.status
        );

        if previous != OrderStatus::Shipped
            && updated.status == OrderStatus::Shipped
            && let Err(e) = self
                .mailer
                .send_shipping_update(&OrderNotification::from(&updated))
                .await
        {
            log::error!(
                "Failed to send shipping email for {}: {}",
                updated.order_number,
                e
            );
        }

        self.with_items(updated).await
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn find_by_number<C>(&self, db: &C, order_number: &str) -> AppResult<orders::Model>
    where
        C: ConnectionTrait,
    {
        orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))
    }

    async fn with_items(&self, order: orders::Model) -> AppResult<OrderResponse> {
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(OrderResponse::from_parts(order, items))
    }

    async fn attach_items(&self, list: Vec<orders::Model>) -> AppResult<Vec<OrderResponse>> {
        if list.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = list.iter().map(|o| o.id).collect();
        let all_items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(ids))
            .order_by_asc(order_items::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        let mut grouped: HashMap<i64, Vec<order_items::Model>> = HashMap::new();
        for item in all_items {
            grouped.entry(item.order_id).or_default().push(item);
        }

        Ok(list
            .into_iter()
            .map(|order| {
                let items = grouped.remove(&order.id).unwrap_or_default();
                OrderResponse::from_parts(order, items)
            })
            .collect())
    }
}
