use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AdminLoginRequest, AdminSessionResponse};
use crate::utils::{JwtService, hash_password, validate_password, verify_password};

/// 登录成功后返回的会话令牌
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub max_age_secs: i64,
    pub session: AdminSessionResponse,
}

#[derive(Clone)]
pub struct AdminAuthService {
    username: String,
    password_hash: String,
    jwt_service: JwtService,
    secure_cookie: bool,
}

impl AdminAuthService {
    /// password_hash 优先；否则在启动时对明文密码做哈希
    pub fn new(config: &AdminConfig) -> AppResult<Self> {
        let password_hash = match (&config.password_hash, &config.password) {
            (Some(hash), _) if !hash.is_empty() => hash.clone(),
            (_, Some(password)) if !password.is_empty() => {
                if let Err(e) = validate_password(password) {
                    log::warn!("Weak admin password configured: {}", e);
                }
                hash_password(password)?
            }
            _ => {
                return Err(AppError::ConfigError(
                    "admin.password or admin.password_hash must be set".into(),
                ));
            }
        };

        Ok(Self {
            username: config.username.clone(),
            password_hash,
            jwt_service: JwtService::new(&config.session_secret, config.session_ttl_secs),
            secure_cookie: config.secure_cookie,
        })
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    pub fn login(&self, req: &AdminLoginRequest) -> AppResult<IssuedSession> {
        let username_ok = req.username.trim() == self.username;
        // 用户名错误时也执行一次校验，避免响应时间差异
        let password_ok = verify_password(&req.password, &self.password_hash)?;

        if !username_ok || !password_ok {
            log::warn!("Admin login failed for username: {}", req.username);
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        let token = self.jwt_service.generate_session_token(&self.username)?;
        let claims = self.jwt_service.verify_session_token(&token)?;
        log::info!("Admin logged in: {}", self.username);

        Ok(IssuedSession {
            token,
            max_age_secs: self.jwt_service.get_session_expires_in(),
            session: AdminSessionResponse {
                authenticated: true,
                username: Some(claims.sub.clone()),
                expires_at: Some(claims.expires_at()),
            },
        })
    }

    /// 根据 cookie 中的令牌返回会话状态；无效令牌视为未登录
    pub fn session(&self, token: Option<&str>) -> AdminSessionResponse {
        match token.map(|t| self.jwt_service.verify_session_token(t)) {
            Some(Ok(claims)) => AdminSessionResponse {
                authenticated: true,
                expires_at: Some(claims.expires_at()),
                username: Some(claims.sub),
            },
            _ => AdminSessionResponse {
                authenticated: false,
                username: None,
                expires_at: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AdminConfig {
        AdminConfig {
            username: "admin".into(),
            password: None,
            password_hash: Some(bcrypt::hash("faroo-admin-2026", 4).unwrap()),
            session_secret: "test-secret".into(),
            session_ttl_secs: 3600,
            secure_cookie: false,
        }
    }

    #[test]
    fn test_login_success_issues_token() {
        let service = AdminAuthService::new(&config()).unwrap();
        let issued = service
            .login(&AdminLoginRequest {
                username: "admin".into(),
                password: "faroo-admin-2026".into(),
            })
            .unwrap();
        assert_eq!(issued.max_age_secs, 3600);
        assert!(issued.session.authenticated);

        let session = service.session(Some(&issued.token));
        assert!(session.authenticated);
        assert_eq!(session.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let service = AdminAuthService::new(&config()).unwrap();
        let err = service
            .login(&AdminLoginRequest {
                username: "admin".into(),
                password: "wrong".into(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Auth error: Invalid credentials");

        let err = service
            .login(&AdminLoginRequest {
                username: "root".into(),
                password: "faroo-admin-2026".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[test]
    fn test_session_without_token() {
        let service = AdminAuthService::new(&config()).unwrap();
        assert!(!service.session(None).authenticated);
        assert!(!service.session(Some("true")).authenticated);
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let mut cfg = config();
        cfg.password_hash = None;
        cfg.password = None;
        assert!(matches!(
            AdminAuthService::new(&cfg),
            Err(AppError::ConfigError(_))
        ));
    }
}
