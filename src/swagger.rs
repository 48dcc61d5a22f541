use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DiscountType, OrderStatus, PaymentMethod, PaymentStatus};
use crate::handlers;
use crate::models::*;
use crate::services::UploadedFile;
use crate::utils::{DeliveryArea, OrderTotals};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("admin_session"))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::product::list_products,
        handlers::product::get_product,
        handlers::product::create_product,
        handlers::product::update_product,
        handlers::product::delete_product,
        handlers::order::create_order,
        handlers::order::list_orders,
        handlers::order::track_order,
        handlers::order::get_order,
        handlers::order::update_order,
        handlers::cart::quote_cart,
        handlers::discount::validate_discount,
        handlers::discount::list_discounts,
        handlers::discount::create_discount,
        handlers::discount::update_discount,
        handlers::discount::toggle_discount,
        handlers::discount::delete_discount,
        handlers::upload::upload_file,
        handlers::admin::login,
        handlers::admin::logout,
        handlers::admin::session,
        handlers::admin::dashboard,
    ),
    components(
        schemas(
            ProductResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ShippingAddress,
            OrderItemInput,
            CreateOrderRequest,
            OrderItemResponse,
            OrderResponse,
            UpdateOrderRequest,
            OrderStatus,
            PaymentStatus,
            PaymentMethod,
            DeliveryArea,
            OrderTotals,
            CartLine,
            CartQuoteRequest,
            CartQuoteResponse,
            DiscountType,
            ValidateDiscountRequest,
            ValidateDiscountResponse,
            DiscountResponse,
            CreateDiscountRequest,
            UpdateDiscountRequest,
            AdminLoginRequest,
            AdminSessionResponse,
            DashboardStats,
            UploadedFile,
            handlers::upload::UploadForm,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "product", description = "Product catalog API"),
        (name = "order", description = "Checkout and order management API"),
        (name = "cart", description = "Cart pricing API"),
        (name = "discount", description = "Promo code API"),
        (name = "upload", description = "Image upload API"),
        (name = "admin", description = "Admin session and dashboard API"),
    ),
    info(
        title = "Faroo Backend API",
        version = "1.0.0",
        description = "Faroo storefront REST API documentation"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_cookie_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/orders/{order_number}"));
        assert!(doc.paths.paths.contains_key("/admin/discounts/{id}/toggle"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("admin_session"));
        assert!(components.schemas.contains_key("UploadForm"));
    }
}
