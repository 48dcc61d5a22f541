use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的前端来源，为空表示不限制
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default)]
    pub seed_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    /// 明文密码，启动时做 bcrypt 哈希；password_hash 存在时优先使用
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub session_secret: String,
    pub session_ttl_secs: i64, // seconds
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: Some("admin123".to_string()),
            password_hash: None,
            session_secret: "change-me-in-production".to_string(),
            session_ttl_secs: 60 * 60 * 24,
            secure_cookie: false,
        }
    }
}

/// 店铺业务参数（运费、默认国家、订单可修改时间窗口等）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub shipping_inside: i64,
    pub shipping_outside: i64,
    pub default_shipping: i64,
    pub default_country: String,
    pub edit_window_minutes: i64,
    pub currency_symbol: String,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
}

fn default_low_stock_threshold() -> i32 {
    5
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            shipping_inside: 70,
            shipping_outside: 150,
            default_shipping: 100,
            default_country: "Bangladesh".to_string(),
            edit_window_minutes: 30,
            currency_symbol: "৳".to_string(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub public_prefix: String,
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "public/uploads".to_string(),
            public_prefix: "/uploads".to_string(),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub api_base_url: String,
    /// 为空时只记录日志，不真正发送
    #[serde(default)]
    pub api_key: String,
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.resend.com".to_string(),
            api_key: String::new(),
            from_address: "Faroo <orders@faroo.com>".to_string(),
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;
                Self::from_defaults(database_url)
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    pub fn from_defaults(database_url: String) -> Self {
        Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
                allowed_origins: Vec::new(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                seed_on_start: get_env_parse("SEED_ON_START", false),
            },
            admin: AdminConfig::default(),
            shop: ShopConfig::default(),
            upload: UploadConfig::default(),
            email: EmailConfig::default(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.server.allowed_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("SEED_ON_START")
            && let Ok(b) = v.parse()
        {
            self.database.seed_on_start = b;
        }

        // Admin
        if let Ok(v) = env::var("ADMIN_USERNAME") {
            self.admin.username = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.admin.password = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_SESSION_SECRET") {
            self.admin.session_secret = v;
        }
        if let Ok(v) = env::var("ADMIN_SESSION_TTL")
            && let Ok(n) = v.parse()
        {
            self.admin.session_ttl_secs = n;
        }
        if let Ok(v) = env::var("ADMIN_SECURE_COOKIE")
            && let Ok(b) = v.parse()
        {
            self.admin.secure_cookie = b;
        }

        // Upload
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.upload.dir = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES")
            && let Ok(n) = v.parse()
        {
            self.upload.max_bytes = n;
        }

        // Email
        if let Ok(v) = env::var("EMAIL_API_BASE_URL") {
            self.email.api_base_url = v;
        }
        if let Ok(v) = env::var("EMAIL_API_KEY") {
            self.email.api_key = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM") {
            self.email.from_address = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_section_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/faroo"
            max_connections = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(config.server.allowed_origins.is_empty());
        assert!(!config.database.seed_on_start);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.session_ttl_secs, 86_400);
        assert_eq!(config.shop.shipping_inside, 70);
        assert_eq!(config.shop.shipping_outside, 150);
        assert_eq!(config.shop.default_country, "Bangladesh");
        assert_eq!(config.shop.edit_window_minutes, 30);
        assert_eq!(config.upload.public_prefix, "/uploads");
        assert!(config.email.api_key.is_empty());
    }

    #[test]
    fn test_parse_shop_section_overrides() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/faroo"
            max_connections = 10
            seed_on_start = true

            [shop]
            shipping_inside = 60
            shipping_outside = 120
            default_shipping = 90
            default_country = "Bangladesh"
            edit_window_minutes = 15
            currency_symbol = "Tk"
            "#,
        )
        .unwrap();

        assert!(config.database.seed_on_start);
        assert_eq!(config.shop.shipping_inside, 60);
        assert_eq!(config.shop.edit_window_minutes, 15);
        assert_eq!(config.shop.low_stock_threshold, 5);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::from_toml_str("[server]\nport = \"abc\"").is_err());
    }
}
