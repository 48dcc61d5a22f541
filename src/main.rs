use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use faroo_backend::{
    AppError,
    config::Config,
    database::{create_pool, run_migrations, seed_catalog},
    external::Mailer,
    handlers,
    middlewares::{AdminSessionMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
};

// JSON 请求体上限（商品描述等长文本）
const JSON_LIMIT_BYTES: usize = 256 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 各服务共享同一个连接池
    let pool = Arc::new(pool);

    if config.database.seed_on_start
        && let Err(e) = seed_catalog(pool.as_ref()).await
    {
        log::error!("Failed to seed catalog: {:?}", e);
    }

    // 后台登录
    let admin_auth_service =
        AdminAuthService::new(&config.admin).expect("Failed to configure admin credentials");
    let jwt_service = admin_auth_service.jwt_service().clone();

    // 外部服务
    let mailer = Mailer::new(config.email.clone(), &config.shop.currency_symbol);
    if !mailer.is_enabled() {
        log::warn!("Email API key not configured, order emails will only be logged");
    }

    // 创建服务（只构建一次，worker 之间共享）
    let admin_auth_service = web::Data::new(admin_auth_service);
    let product_service = web::Data::new(ProductService::new(Arc::clone(&pool)));
    let discount_service = web::Data::new(DiscountService::new(
        Arc::clone(&pool),
        &config.shop.currency_symbol,
    ));
    let order_service = Arc::new(OrderService::new(
        Arc::clone(&pool),
        config.shop.clone(),
        mailer,
    ));
    let cart_service = web::Data::new(CartService::new(Arc::clone(&pool), config.shop.clone()));
    let dashboard_service = web::Data::new(DashboardService::new(
        Arc::clone(&pool),
        Arc::clone(&order_service),
        config.shop.low_stock_threshold,
    ));
    let order_service = web::Data::from(order_service);
    let upload_service = web::Data::new(UploadService::new(config.upload.clone()));

    let allowed_origins = config.server.allowed_origins.clone();

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        let json_config = web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err, _req| {
                AppError::ValidationError(format!("Invalid JSON body: {err}")).into()
            });

        App::new()
            .wrap(AdminSessionMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&allowed_origins))
            .wrap(Logger::default())
            .app_data(json_config)
            .app_data(admin_auth_service.clone())
            .app_data(product_service.clone())
            .app_data(discount_service.clone())
            .app_data(order_service.clone())
            .app_data(cart_service.clone())
            .app_data(dashboard_service.clone())
            .app_data(upload_service.clone())
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::product_config)
                    .configure(handlers::order_config)
                    .configure(handlers::cart_config)
                    .configure(handlers::discount_config)
                    .configure(handlers::upload_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
