use actix_cors::Cors;

/// allowed_origins 为空时放行任意来源（本地开发）
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let origins = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origins.is_empty()
                || origin
                    .to_str()
                    .is_ok_and(|o| origins.iter().any(|allowed| allowed == o))
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        // 后台会话依赖 cookie
        .supports_credentials()
        .max_age(3600)
}
