use crate::models::*;
use crate::services::ProductService;
use actix_web::{HttpResponse, Result, ResponseError, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/products",
    tag = "product",
    params(
        ("category" = Option<String>, Query, description = "分类"),
        ("section" = Option<String>, Query, description = "women / men"),
        ("featured" = Option<bool>, Query, description = "只返回最新 4 件"),
        ("search" = Option<String>, Query, description = "关键字"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取商品列表成功")
    )
)]
pub async fn list_products(
    product_service: web::Data<ProductService>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse> {
    match product_service.list_products(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "product",
    params(
        ("id" = String, Path, description = "商品ID")
    ),
    responses(
        (status = 200, description = "获取商品成功", body = ProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn get_product(
    product_service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match product_service.get_product(&path).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "product",
    request_body = CreateProductRequest,
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 201, description = "创建商品成功", body = ProductResponse),
        (status = 400, description = "参数错误"),
        (status = 401, description = "未登录")
    )
)]
pub async fn create_product(
    product_service: web::Data<ProductService>,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    match product_service.create_product(request.into_inner()).await {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "product",
    params(
        ("id" = String, Path, description = "商品ID")
    ),
    request_body = UpdateProductRequest,
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "更新商品成功", body = ProductResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn update_product(
    product_service: web::Data<ProductService>,
    path: web::Path<String>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    match product_service
        .update_product(&path, request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "product",
    params(
        ("id" = String, Path, description = "商品ID")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "删除商品成功"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn delete_product(
    product_service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match product_service.delete_product(&path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product))
            .route("/{id}", web::delete().to(delete_product)),
    );
}
