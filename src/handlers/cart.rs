use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpResponse, Result, ResponseError, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/cart/quote",
    tag = "cart",
    request_body = CartQuoteRequest,
    responses(
        (status = 200, description = "报价成功", body = CartQuoteResponse)
    )
)]
pub async fn quote_cart(
    cart_service: web::Data<CartService>,
    request: web::Json<CartQuoteRequest>,
) -> Result<HttpResponse> {
    match cart_service.quote(&request).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/cart").route("/quote", web::post().to(quote_cart)));
}
