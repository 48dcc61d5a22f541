use crate::models::*;
use crate::services::DiscountService;
use actix_web::{HttpResponse, Result, ResponseError, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/discounts/validate",
    tag = "discount",
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "促销码可用", body = ValidateDiscountResponse),
        (status = 400, description = "促销码无效、过期、用尽或未达最低消费")
    )
)]
pub async fn validate_discount(
    discount_service: web::Data<DiscountService>,
    request: web::Json<ValidateDiscountRequest>,
) -> Result<HttpResponse> {
    match discount_service.validate(&request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/discounts",
    tag = "discount",
    params(
        ("active" = Option<bool>, Query, description = "是否启用"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "获取促销码列表成功")
    )
)]
pub async fn list_discounts(
    discount_service: web::Data<DiscountService>,
    query: web::Query<DiscountQuery>,
) -> Result<HttpResponse> {
    match discount_service.list_discounts(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/discounts",
    tag = "discount",
    request_body = CreateDiscountRequest,
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 201, description = "创建成功", body = DiscountResponse),
        (status = 400, description = "参数错误"),
        (status = 409, description = "促销码已存在")
    )
)]
pub async fn create_discount(
    discount_service: web::Data<DiscountService>,
    request: web::Json<CreateDiscountRequest>,
) -> Result<HttpResponse> {
    match discount_service.create_discount(request.into_inner()).await {
        Ok(discount) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": discount
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/discounts/{id}",
    tag = "discount",
    params(
        ("id" = i64, Path, description = "促销码ID")
    ),
    request_body = UpdateDiscountRequest,
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = DiscountResponse),
        (status = 404, description = "促销码不存在")
    )
)]
pub async fn update_discount(
    discount_service: web::Data<DiscountService>,
    path: web::Path<i64>,
    request: web::Json<UpdateDiscountRequest>,
) -> Result<HttpResponse> {
    match discount_service
        .update_discount(path.into_inner(), request.into_inner())
        .await
    {
        Ok(discount) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": discount
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/discounts/{id}/toggle",
    tag = "discount",
    params(
        ("id" = i64, Path, description = "促销码ID")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "切换成功", body = DiscountResponse),
        (status = 404, description = "促销码不存在")
    )
)]
pub async fn toggle_discount(
    discount_service: web::Data<DiscountService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match discount_service.toggle_discount(path.into_inner()).await {
        Ok(discount) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": discount
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/discounts/{id}",
    tag = "discount",
    params(
        ("id" = i64, Path, description = "促销码ID")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "促销码不存在")
    )
)]
pub async fn delete_discount(
    discount_service: web::Data<DiscountService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match discount_service.delete_discount(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn discount_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/discounts").route("/validate", web::post().to(validate_discount)));
}

/// 挂载在 /admin 下
pub fn admin_discount_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discounts")
            .route("", web::get().to(list_discounts))
            .route("", web::post().to(create_discount))
            .route("/{id}", web::put().to(update_discount))
            .route("/{id}", web::delete().to(delete_discount))
            .route("/{id}/toggle", web::post().to(toggle_discount)),
    );
}
