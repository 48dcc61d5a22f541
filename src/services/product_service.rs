use crate::entities::product_entity as products;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProductRequest, DEFAULT_CATEGORY, DEFAULT_IMAGE, DEFAULT_SECTION, DEFAULT_SUBCATEGORY,
    PaginatedResponse, PaginationParams, ProductQuery, ProductResponse, UpdateProductRequest,
};
use crate::utils::generate_product_id;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

const FEATURED_LIMIT: u64 = 4;

fn to_json_list(values: &[String]) -> AppResult<String> {
    Ok(serde_json::to_string(values)?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_stock(stock: i64) -> AppResult<i32> {
    if stock < 0 {
        return Err(AppError::ValidationError("Stock cannot be negative".into()));
    }
    i32::try_from(stock).map_err(|_| AppError::ValidationError("Stock is too large".into()))
}

pub struct ProductService {
    pool: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// 商品列表，最新优先；featured=true 时只取 4 件
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let mut condition = Condition::all();
        if let Some(category) = non_empty(query.category.clone()) {
            condition = condition.add(products::Column::Category.eq(category));
        }
        if let Some(section) = non_empty(query.section.clone()) {
            condition = condition.add(products::Column::Section.eq(section.to_lowercase()));
        }
        if let Some(search) = non_empty(query.search.clone()) {
            // 不区分大小写
            let pattern = format!("%{}%", search.to_lowercase());
            let lower = |col: products::Column| Expr::expr(Func::lower(Expr::col(col)));
            condition = condition.add(
                Condition::any()
                    .add(lower(products::Column::Title).like(pattern.clone()))
                    .add(lower(products::Column::Category).like(pattern.clone()))
                    .add(lower(products::Column::Subcategory).like(pattern)),
            );
        }

        let base_query = products::Entity::find()
            .filter(condition)
            .order_by_desc(products::Column::CreatedAt);

        if query.featured.unwrap_or(false) {
            let items: Vec<ProductResponse> = base_query
                .limit(FEATURED_LIMIT)
                .all(self.pool.as_ref())
                .await?
                .into_iter()
                .map(Into::into)
                .collect();
            let params = PaginationParams::new(Some(1), Some(FEATURED_LIMIT as u32));
            let total = items.len() as u64;
            return Ok(PaginatedResponse::new(items, &params, total));
        }

        let params = PaginationParams::new(query.page, query.per_page);
        let total = base_query.clone().count(self.pool.as_ref()).await?;
        let items = base_query
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_product(&self, id: &str) -> AppResult<ProductResponse> {
        products::Entity::find_by_id(id.to_string())
            .one(self.pool.as_ref())
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Product not found".into()))
    }

    pub async fn create_product(&self, req: CreateProductRequest) -> AppResult<ProductResponse> {
        let title = non_empty(req.title)
            .ok_or_else(|| AppError::ValidationError("Title is required".into()))?;
        let price = req
            .price
            .filter(|p| *p > 0)
            .ok_or_else(|| AppError::ValidationError("A positive price is required".into()))?;
        let stock = check_stock(req.stock.unwrap_or(0))?;

        let id = non_empty(req.id).unwrap_or_else(generate_product_id);
        if products::Entity::find_by_id(id.clone())
            .one(self.pool.as_ref())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("Product {} already exists", id)));
        }

        let now = Utc::now();
        let image = non_empty(req.image).unwrap_or_else(|| DEFAULT_IMAGE.to_string());
        let images = req.images.unwrap_or_else(|| vec![image.clone()]);

        let created = products::ActiveModel {
            id: Set(id),
            sku: Set(non_empty(req.sku)),
            title: Set(title),
            price: Set(price),
            category: Set(non_empty(req.category).unwrap_or_else(|| DEFAULT_CATEGORY.into())),
            section: Set(non_empty(req.section)
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| DEFAULT_SECTION.into())),
            subcategory: Set(
                non_empty(req.subcategory).unwrap_or_else(|| DEFAULT_SUBCATEGORY.into())
            ),
            image: Set(image),
            images: Set(to_json_list(&images)?),
            description: Set(non_empty(req.description)),
            sizes: Set(to_json_list(&req.sizes.unwrap_or_default())?),
            colors: Set(to_json_list(&req.colors.unwrap_or_default())?),
            stock: Set(stock),
            is_new: Set(req.is_new.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Product created: {} ({})", created.id, created.title);
        Ok(created.into())
    }

    pub async fn update_product(
        &self,
        id: &str,
        req: UpdateProductRequest,
    ) -> AppResult<ProductResponse> {
        let existing = products::Entity::find_by_id(id.to_string())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let mut am = existing.into_active_model();
        if let Some(title) = req.title {
            let title = non_empty(Some(title))
                .ok_or_else(|| AppError::ValidationError("Title cannot be empty".into()))?;
            am.title = Set(title);
        }
        if let Some(price) = req.price {
            if price <= 0 {
                return Err(AppError::ValidationError("Price must be positive".into()));
            }
            am.price = Set(price);
        }
        if let Some(stock) = req.stock {
            am.stock = Set(check_stock(stock)?);
        }
        if let Some(sku) = req.sku {
            am.sku = Set(non_empty(Some(sku)));
        }
        if let Some(category) = non_empty(req.category) {
            am.category = Set(category);
        }
        if let Some(section) = non_empty(req.section) {
            am.section = Set(section.to_lowercase());
        }
        if let Some(subcategory) = non_empty(req.subcategory) {
            am.subcategory = Set(subcategory);
        }
        if let Some(image) = non_empty(req.image) {
            am.image = Set(image);
        }
        if let Some(images) = req.images {
            am.images = Set(to_json_list(&images)?);
        }
        if let Some(description) = req.description {
            am.description = Set(non_empty(Some(description)));
        }
        if let Some(sizes) = req.sizes {
            am.sizes = Set(to_json_list(&sizes)?);
        }
        if let Some(colors) = req.colors {
            am.colors = Set(to_json_list(&colors)?);
        }
        if let Some(is_new) = req.is_new {
            am.is_new = Set(is_new);
        }
        am.updated_at = Set(Utc::now());

        let updated = am.update(self.pool.as_ref()).await?;
        Ok(updated.into())
    }

    /// 删除商品；历史订单行保留标题快照（外键 ON DELETE SET NULL）
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        let result = products::Entity::delete_by_id(id.to_string())
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        log::info!("Product deleted: {}", id);
        Ok(())
    }
}
