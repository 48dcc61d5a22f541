use crate::handlers::discount::admin_discount_config;
use crate::middlewares::{ADMIN_SESSION_COOKIE, get_admin_session};
use crate::models::*;
use crate::services::{AdminAuthService, DashboardService};
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, Result, ResponseError, web};
use serde_json::json;

fn session_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(ADMIN_SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "登录成功，写入 admin_session cookie", body = AdminSessionResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    auth_service: web::Data<AdminAuthService>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(&request) {
        Ok(issued) => Ok(HttpResponse::Ok()
            .cookie(session_cookie(
                issued.token,
                issued.max_age_secs,
                auth_service.secure_cookie(),
            ))
            .json(json!({
                "success": true,
                "data": issued.session
            }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    responses(
        (status = 200, description = "已退出登录，清除 cookie（无需有效会话）")
    )
)]
pub async fn logout(auth_service: web::Data<AdminAuthService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(String::new(), 0, auth_service.secure_cookie()))
        .json(ApiResponse::success_with_message(
            (),
            "Logged out".to_string(),
        )))
}

#[utoipa::path(
    get,
    path = "/admin/session",
    tag = "admin",
    responses(
        (status = 200, description = "当前会话状态", body = AdminSessionResponse)
    )
)]
pub async fn session(
    auth_service: web::Data<AdminAuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let response = match get_admin_session(&req) {
        Some(session) => AdminSessionResponse {
            authenticated: true,
            username: Some(session.username),
            expires_at: Some(session.expires_at),
        },
        None => auth_service.session(None),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(
        ("admin_session" = [])
    ),
    responses(
        (status = 200, description = "后台概览", body = DashboardStats),
        (status = 401, description = "未登录")
    )
)]
pub async fn dashboard(dashboard_service: web::Data<DashboardService>) -> Result<HttpResponse> {
    match dashboard_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/session", web::get().to(session))
            .route("/dashboard", web::get().to(dashboard))
            .configure(admin_discount_config),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminConfig;
    use crate::middlewares::AdminSessionMiddleware;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    fn auth_service() -> AdminAuthService {
        AdminAuthService::new(&AdminConfig {
            username: "admin".into(),
            password: None,
            password_hash: Some(bcrypt::hash("faroo-admin-2026", 4).unwrap()),
            session_secret: "test-secret".into(),
            session_ttl_secs: 86_400,
            secure_cookie: false,
        })
        .unwrap()
    }

    #[actix_web::test]
    async fn test_login_sets_session_cookie() {
        let service = auth_service();
        let app = test::init_service(
            App::new()
                .wrap(AdminSessionMiddleware::new(service.jwt_service().clone()))
                .app_data(web::Data::new(service))
                .service(
                    web::scope("/api/admin")
                        .route("/login", web::post().to(login))
                        .route("/session", web::get().to(session)),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({"username": "admin", "password": "faroo-admin-2026"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == ADMIN_SESSION_COOKIE)
            .unwrap()
            .into_owned();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));

        let req = test::TestRequest::get()
            .uri("/api/admin/session")
            .cookie(cookie)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["authenticated"], true);
        assert_eq!(body["data"]["username"], "admin");
    }

    #[actix_web::test]
    async fn test_logout_clears_stale_cookie() {
        let service = auth_service();
        let app = test::init_service(
            App::new()
                .wrap(AdminSessionMiddleware::new(service.jwt_service().clone()))
                .app_data(web::Data::new(service))
                .service(web::scope("/api/admin").route("/logout", web::post().to(logout))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/logout")
            .cookie(Cookie::new(ADMIN_SESSION_COOKIE, "expired-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == ADMIN_SESSION_COOKIE)
            .unwrap()
            .into_owned();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::seconds(0)));
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password() {
        let service = auth_service();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .service(web::scope("/api/admin").route("/login", web::post().to(login))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({"username": "admin", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
