use crate::entities::{DiscountType, discount_entity as discounts};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDiscountRequest, DiscountQuery, DiscountResponse, PaginatedResponse, PaginationParams,
    UpdateDiscountRequest, ValidateDiscountRequest, ValidateDiscountResponse,
};
use crate::utils::{check_discount_usable, discount_amount, generate_promo_code};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// 按促销码查找并校验，返回促销码与折扣金额
pub async fn find_usable_discount<C>(
    db: &C,
    code: &str,
    cart_total: i64,
    now: DateTime<Utc>,
    currency_symbol: &str,
) -> AppResult<(discounts::Model, i64)>
where
    C: ConnectionTrait,
{
    let discount = discounts::Entity::find()
        .filter(discounts::Column::Code.eq(normalize_code(code)))
        .one(db)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid or expired promo code".into()))?;

    check_discount_usable(&discount, cart_total, now, currency_symbol)?;
    let amount = discount_amount(&discount, cart_total);
    Ok((discount, amount))
}

/// 原子增加使用次数 (where max_usage is null or usage_count < max_usage)
pub async fn increment_usage<C>(db: &C, discount_id: i64) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let result = discounts::Entity::update_many()
        .col_expr(
            discounts::Column::UsageCount,
            Expr::col(discounts::Column::UsageCount).add(1),
        )
        .col_expr(discounts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(discounts::Column::Id.eq(discount_id))
        .filter(
            Condition::any()
                .add(discounts::Column::MaxUsage.is_null())
                .add(Expr::col(discounts::Column::UsageCount).lt(Expr::col(discounts::Column::MaxUsage))),
        )
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        // 并发下单时可能刚好用完
        return Err(AppError::ValidationError(
            "Promo code usage limit reached".into(),
        ));
    }
    Ok(())
}

fn check_terms(
    discount_type: DiscountType,
    value: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    min_purchase: Option<i64>,
    max_discount: Option<i64>,
    max_usage: Option<i32>,
) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::ValidationError(
            "Discount value must be positive".into(),
        ));
    }
    if discount_type == DiscountType::Percentage && value > 100 {
        return Err(AppError::ValidationError(
            "Percentage discount cannot exceed 100".into(),
        ));
    }
    if valid_from >= valid_until {
        return Err(AppError::ValidationError(
            "validFrom must be before validUntil".into(),
        ));
    }
    if min_purchase.is_some_and(|v| v < 0) || max_discount.is_some_and(|v| v < 0) {
        return Err(AppError::ValidationError(
            "Amounts cannot be negative".into(),
        ));
    }
    if max_usage.is_some_and(|v| v < 0) {
        return Err(AppError::ValidationError(
            "maxUsage cannot be negative".into(),
        ));
    }
    Ok(())
}

pub struct DiscountService {
    pool: Arc<DatabaseConnection>,
    currency_symbol: String,
}

impl DiscountService {
    pub fn new(pool: Arc<DatabaseConnection>, currency_symbol: &str) -> Self {
        Self {
            pool,
            currency_symbol: currency_symbol.to_string(),
        }
    }

    /// 结算页校验促销码（不计入使用次数）
    pub async fn validate(&self, req: &ValidateDiscountRequest) -> AppResult<ValidateDiscountResponse> {
        let code = req
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::ValidationError("Promo code is required".into()))?;

        let (discount, amount) = find_usable_discount(
            self.pool.as_ref(),
            code,
            req.cart_total,
            Utc::now(),
            &self.currency_symbol,
        )
        .await?;

        Ok(ValidateDiscountResponse {
            code: discount.code,
            amount,
            discount_type: discount.discount_type,
            value: discount.value,
        })
    }

    pub async fn list_discounts(
        &self,
        query: &DiscountQuery,
    ) -> AppResult<PaginatedResponse<DiscountResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let mut base_query = discounts::Entity::find();
        if let Some(active) = query.active {
            base_query = base_query.filter(discounts::Column::Active.eq(active));
        }

        let total = base_query.clone().count(self.pool.as_ref()).await?;
        let now = Utc::now();
        let items = base_query
            .order_by_desc(discounts::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|d| DiscountResponse::from_model(d, now))
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn create_discount(&self, req: CreateDiscountRequest) -> AppResult<DiscountResponse> {
        let now = Utc::now();
        let valid_from = req.valid_from.unwrap_or(now);
        check_terms(
            req.discount_type,
            req.value,
            valid_from,
            req.valid_until,
            req.min_purchase,
            req.max_discount,
            req.max_usage,
        )?;

        let code = match req.code.as_deref().map(normalize_code) {
            Some(code) if !code.is_empty() => {
                if self.code_exists(&code).await? {
                    return Err(AppError::Conflict(format!(
                        "Promo code {} already exists",
                        code
                    )));
                }
                code
            }
            _ => self.generate_unique_code().await?,
        };

        let created = discounts::ActiveModel {
            code: Set(code),
            discount_type: Set(req.discount_type),
            value: Set(req.value),
            description: Set(req.description),
            valid_from: Set(valid_from),
            valid_until: Set(req.valid_until),
            min_purchase: Set(req.min_purchase),
            max_discount: Set(req.max_discount),
            active: Set(req.active.unwrap_or(true)),
            usage_count: Set(0),
            max_usage: Set(req.max_usage),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Promo code created: {}", created.code);
        Ok(DiscountResponse::from_model(created, now))
    }

    pub async fn update_discount(
        &self,
        id: i64,
        req: UpdateDiscountRequest,
    ) -> AppResult<DiscountResponse> {
        let existing = self.find_by_id(id).await?;

        let discount_type = req.discount_type.unwrap_or(existing.discount_type);
        let value = req.value.unwrap_or(existing.value);
        let valid_from = req.valid_from.unwrap_or(existing.valid_from);
        let valid_until = req.valid_until.unwrap_or(existing.valid_until);
        let min_purchase = req.min_purchase.or(existing.min_purchase);
        let max_discount = req.max_discount.or(existing.max_discount);
        let max_usage = req.max_usage.or(existing.max_usage);
        check_terms(
            discount_type,
            value,
            valid_from,
            valid_until,
            min_purchase,
            max_discount,
            max_usage,
        )?;
        if max_usage.is_some_and(|max| max < existing.usage_count) {
            return Err(AppError::ValidationError(
                "maxUsage cannot be below the current usage count".into(),
            ));
        }

        let mut am = existing.into_active_model();
        am.discount_type = Set(discount_type);
        am.value = Set(value);
        am.valid_from = Set(valid_from);
        am.valid_until = Set(valid_until);
        am.min_purchase = Set(min_purchase);
        am.max_discount = Set(max_discount);
        am.max_usage = Set(max_usage);
        if let Some(description) = req.description {
            am.description = Set(description);
        }
        if let Some(active) = req.active {
            am.active = Set(active);
        }
        let now = Utc::now();
        am.updated_at = Set(now);

        let updated = am.update(self.pool.as_ref()).await?;
        Ok(DiscountResponse::from_model(updated, now))
    }

    /// 启用 / 停用
    pub async fn toggle_discount(&self, id: i64) -> AppResult<DiscountResponse> {
        let existing = self.find_by_id(id).await?;
        let active = !existing.active;

        let mut am = existing.into_active_model();
        am.active = Set(active);
        let now = Utc::now();
        am.updated_at = Set(now);
        let updated = am.update(self.pool.as_ref()).await?;

        log::info!("Promo code {} active={}", updated.code, updated.active);
        Ok(DiscountResponse::from_model(updated, now))
    }

    pub async fn delete_discount(&self, id: i64) -> AppResult<()> {
        let result = discounts::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Promo code not found".into()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<discounts::Model> {
        discounts::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Promo code not found".into()))
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let count = discounts::Entity::find()
            .filter(discounts::Column::Code.eq(code))
            .count(self.pool.as_ref())
            .await?;
        Ok(count > 0)
    }

    async fn generate_unique_code(&self) -> AppResult<String> {
        loop {
            let code = generate_promo_code();
            if !self.code_exists(&code).await? {
                return Ok(code);
            }
        }
    }
}
