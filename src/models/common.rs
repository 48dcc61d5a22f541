use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            error: None,
        }
    }

    pub fn error(code: String, message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError { code, message }),
        }
    }
}

/// 后台表单常把数字以字符串提交（"3500"、"3500.00"），这里统一解析为整数
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom("invalid number")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid number: {s}")))
        }
        Some(other) => Err(D::Error::custom(format!("invalid number: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "deserialize_lenient_i64")]
        price: Option<i64>,
    }

    #[test]
    fn test_lenient_number_accepts_strings_and_numbers() {
        let f: Form = serde_json::from_str(r#"{"price": "3500"}"#).unwrap();
        assert_eq!(f.price, Some(3500));
        let f: Form = serde_json::from_str(r#"{"price": 4200}"#).unwrap();
        assert_eq!(f.price, Some(4200));
        let f: Form = serde_json::from_str(r#"{"price": "3499.6"}"#).unwrap();
        assert_eq!(f.price, Some(3500));
        let f: Form = serde_json::from_str(r#"{"price": ""}"#).unwrap();
        assert_eq!(f.price, None);
        let f: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(f.price, None);
    }

    #[test]
    fn test_lenient_number_rejects_garbage() {
        assert!(serde_json::from_str::<Form>(r#"{"price": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Form>(r#"{"price": [1]}"#).is_err());
    }

    #[test]
    fn test_api_response_skips_empty_fields() {
        let value = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": 1}));
    }
}
