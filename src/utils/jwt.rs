use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const SESSION_TOKEN_TYPE: &str = "admin_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin username
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// 后台会话令牌：签名后写入 admin_session cookie
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, session_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expires_in,
        }
    }

    pub fn generate_session_token(&self, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.session_expires_in);

        let claims = Claims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_session_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        if claims.token_type != SESSION_TOKEN_TYPE {
            return Err(AppError::AuthError("Invalid session token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_session_expires_in(&self) -> i64 {
        self.session_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_roundtrip() {
        let svc = JwtService::new("secret", 3600);
        let token = svc.generate_session_token("admin").unwrap();
        let claims = svc.verify_session_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let a = JwtService::new("secret-a", 3600);
        let b = JwtService::new("secret-b", 3600);
        let token = a.generate_session_token("admin").unwrap();
        assert!(b.verify_session_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // 超过默认 60 秒 leeway
        let svc = JwtService::new("secret", -600);
        let token = svc.generate_session_token("admin").unwrap();
        assert!(svc.verify_session_token(&token).is_err());
    }

    #[test]
    fn test_legacy_plain_cookie_value_is_rejected() {
        let svc = JwtService::new("secret", 3600);
        assert!(svc.verify_session_token("true").is_err());
    }
}
