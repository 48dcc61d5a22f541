use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// 已登录的后台会话，由中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

// 需要后台会话的路径规则
struct ProtectedPaths {
    // 前缀下全部需要登录
    admin_prefixes: Vec<&'static str>,
    // 即使在受保护前缀下也公开的路径
    public_exact: Vec<&'static str>,
}

impl ProtectedPaths {
    fn new() -> Self {
        Self {
            admin_prefixes: vec!["/api/admin", "/api/upload"],
            public_exact: vec![
                "/api/admin/login",
                "/api/admin/logout",
                "/api/admin/session",
            ],
        }
    }

    fn requires_admin(&self, method: &Method, path: &str) -> bool {
        let path = path.trim_end_matches('/');

        if *method == Method::OPTIONS || self.public_exact.contains(&path) {
            return false;
        }

        if self
            .admin_prefixes
            .iter()
            .any(|&prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
        {
            return true;
        }

        // 订单：下单、查询物流、按订单号 PATCH 对顾客开放（PATCH 由处理函数区分身份）
        if path == "/api/orders" || path.starts_with("/api/orders/") {
            let rest = path.trim_start_matches("/api/orders").trim_start_matches('/');
            let customer_route = (*method == Method::POST && rest.is_empty())
                || (*method == Method::GET && rest == "track")
                || (*method == Method::PATCH && !rest.is_empty() && !rest.contains('/'));
            return !customer_route;
        }

        // 商品：只读公开，写操作需要登录
        if path == "/api/products" || path.starts_with("/api/products/") {
            return *method == Method::POST || *method == Method::PUT || *method == Method::DELETE;
        }

        false
    }
}

pub struct AdminSessionMiddleware {
    jwt_service: JwtService,
}

impl AdminSessionMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminSessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminSessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminSessionMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            protected_paths: ProtectedPaths::new(),
        }))
    }
}

pub struct AdminSessionMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    protected_paths: ProtectedPaths,
}

impl<S, B> Service<ServiceRequest> for AdminSessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 有效 cookie 时写入会话，公开路径同样需要（PATCH 订单据此区分管理员与顾客）
        let session = req.cookie(ADMIN_SESSION_COOKIE).and_then(|cookie| {
            match self.jwt_service.verify_session_token(cookie.value()) {
                Ok(claims) => Some(AdminSession {
                    expires_at: claims.expires_at(),
                    username: claims.sub,
                }),
                Err(e) => {
                    log::debug!("Ignoring invalid admin session cookie: {}", e);
                    None
                }
            }
        });

        let authenticated = session.is_some();
        if let Some(session) = session {
            req.extensions_mut().insert(session);
        }

        if !authenticated
            && self
                .protected_paths
                .requires_admin(req.method(), req.path())
        {
            log::warn!("Unauthorized admin request: {} {}", req.method(), req.path());
            let error = AppError::AuthError("Unauthorized".to_string());
            return Box::pin(async move { Err(error.into()) });
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

/// 获取当前后台会话
pub fn get_admin_session(req: &HttpRequest) -> Option<AdminSession> {
    req.extensions().get::<AdminSession>().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};

    #[test]
    fn test_protected_path_rules() {
        let paths = ProtectedPaths::new();

        assert!(!paths.requires_admin(&Method::POST, "/api/admin/login"));
        assert!(!paths.requires_admin(&Method::GET, "/api/admin/session"));
        assert!(paths.requires_admin(&Method::GET, "/api/admin/dashboard"));
        // 过期 cookie 也要能被清除
        assert!(!paths.requires_admin(&Method::POST, "/api/admin/logout"));
        assert!(paths.requires_admin(&Method::GET, "/api/admin/discounts"));

        assert!(!paths.requires_admin(&Method::POST, "/api/orders"));
        assert!(!paths.requires_admin(&Method::GET, "/api/orders/track"));
        assert!(!paths.requires_admin(&Method::PATCH, "/api/orders/ORD-2026-0001"));
        assert!(paths.requires_admin(&Method::GET, "/api/orders"));
        assert!(paths.requires_admin(&Method::GET, "/api/orders/ORD-2026-0001"));

        assert!(!paths.requires_admin(&Method::GET, "/api/products"));
        assert!(!paths.requires_admin(&Method::GET, "/api/products/w1"));
        assert!(paths.requires_admin(&Method::POST, "/api/products"));
        assert!(paths.requires_admin(&Method::PUT, "/api/products/w1"));
        assert!(paths.requires_admin(&Method::DELETE, "/api/products/w1"));

        assert!(paths.requires_admin(&Method::POST, "/api/upload"));
        assert!(!paths.requires_admin(&Method::OPTIONS, "/api/upload"));

        assert!(!paths.requires_admin(&Method::POST, "/api/discounts/validate"));
        assert!(!paths.requires_admin(&Method::POST, "/api/cart/quote"));
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match get_admin_session(&req) {
            Some(session) => HttpResponse::Ok().body(session.username),
            None => HttpResponse::Ok().body("guest"),
        }
    }

    #[actix_web::test]
    async fn test_middleware_blocks_and_admits() {
        let jwt = JwtService::new("test-secret", 3600);
        let token = jwt.generate_session_token("admin").unwrap();

        let app = actix_test::init_service(
            App::new()
                .wrap(AdminSessionMiddleware::new(jwt))
                .route("/api/admin/dashboard", web::get().to(whoami))
                .route("/api/orders/{n}", web::patch().to(whoami)),
        )
        .await;

        // 无 cookie
        let req = actix_test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .to_request();
        let err = actix_test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );

        // 旧版明文 cookie 不再被接受
        let req = actix_test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .cookie(Cookie::new(ADMIN_SESSION_COOKIE, "true"))
            .to_request();
        assert!(actix_test::try_call_service(&app, req).await.is_err());

        // 有效会话
        let req = actix_test::TestRequest::get()
            .uri("/api/admin/dashboard")
            .cookie(Cookie::new(ADMIN_SESSION_COOKIE, token.clone()))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "admin");

        // 顾客 PATCH 可通过，且不带会话
        let req = actix_test::TestRequest::patch()
            .uri("/api/orders/ORD-2026-0001")
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "guest");

        let req = actix_test::TestRequest::patch()
            .uri("/api/orders/ORD-2026-0001")
            .cookie(Cookie::new(ADMIN_SESSION_COOKIE, token))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "admin");
    }
}
