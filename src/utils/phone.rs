use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{7,15}$").expect("phone regex is valid"))
}

fn digits_of(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 校验手机号：去掉空格、横线、括号后为 7-15 位数字，可带 +
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if !phone_regex().is_match(&compact) {
        return Err(AppError::ValidationError(
            "Invalid phone number format".to_string(),
        ));
    }

    Ok(())
}

/// 规范化孟加拉手机号为 +880 开头；其它号码只保留数字并加 +
pub fn normalize_phone(phone: &str) -> String {
    let digits = digits_of(phone);

    if digits.len() == 13 && digits.starts_with("880") {
        format!("+{digits}")
    } else if digits.len() == 11 && digits.starts_with("01") {
        format!("+88{digits}")
    } else if digits.is_empty() {
        phone.trim().to_string()
    } else {
        format!("+{digits}")
    }
}

/// 订单追踪时比较手机号（忽略格式差异）
pub fn phones_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_phone(a), normalize_phone(b));
    !a.is_empty() && a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("01712345678").is_ok());
        assert!(validate_phone("+880 1712-345678").is_ok());
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("01712345678"), "+8801712345678");
        assert_eq!(normalize_phone("+880 1712-345678"), "+8801712345678");
        assert_eq!(normalize_phone("8801712345678"), "+8801712345678");
        assert_eq!(normalize_phone("+91 98765 43210"), "+919876543210");
    }

    #[test]
    fn test_phones_match_ignores_formatting() {
        assert!(phones_match("01712345678", "+880 1712 345678"));
        assert!(!phones_match("01712345678", "01812345678"));
        assert!(!phones_match("", ""));
    }
}
