use crate::middlewares::get_admin_session;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, Result, ResponseError, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "下单成功", body = OrderResponse),
        (status = 400, description = "参数错误、库存不足或促销码不可用")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("status" = Option<String>, Query, description = "订单状态"),
        ("search" = Option<String>, Query, description = "订单号 / 姓名 / 手机号"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "获取订单列表成功"),
        (status = 401, description = "未登录")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match order_service.list_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/track",
    tag = "order",
    params(
        ("orderNumber" = Option<String>, Query, description = "订单号"),
        ("phone" = Option<String>, Query, description = "手机号")
    ),
    responses(
        (status = 200, description = "查询成功", body = OrderResponse),
        (status = 400, description = "订单号与手机号均未提供"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn track_order(
    order_service: web::Data<OrderService>,
    query: web::Query<TrackOrderQuery>,
) -> Result<HttpResponse> {
    match order_service.track_order(&query).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_number}",
    tag = "order",
    params(
        ("order_number" = String, Path, description = "订单号")
    ),
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "获取订单成功", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match order_service.get_order(&path).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 带后台会话时按管理员更新处理，否则按顾客自助修改处理
#[utoipa::path(
    patch,
    path = "/orders/{order_number}",
    tag = "order",
    params(
        ("order_number" = String, Path, description = "订单号")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "更新成功", body = OrderResponse),
        (status = 400, description = "无效操作或状态流转"),
        (status = 403, description = "手机号不匹配、超过修改时限或订单已处理"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let result = match get_admin_session(&req) {
        Some(session) => {
            log::info!("Admin {} updating order {}", session.username, path);
            order_service
                .admin_update_order(&path, request.into_inner())
                .await
        }
        None => {
            order_service
                .customer_modify_order(&path, request.into_inner())
                .await
        }
    };

    match result {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/track", web::get().to(track_order))
            .route("/{order_number}", web::get().to(get_order))
            .route("/{order_number}", web::patch().to(update_order)),
    );
}
