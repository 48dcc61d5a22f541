use crate::config::EmailConfig;
use crate::entities::order_entity;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;

/// 邮件通知所需的订单信息
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub total: i64,
    pub status: String,
    pub tracking_number: Option<String>,
    pub courier_name: Option<String>,
}

impl From<&order_entity::Model> for OrderNotification {
    fn from(order: &order_entity::Model) -> Self {
        Self {
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            total: order.total,
            status: order.status.to_string(),
            tracking_number: order.tracking_number.clone(),
            courier_name: order.courier_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// 千位分隔: 12500 -> "12,500"
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Clone)]
pub struct Mailer {
    client: Client,
    config: EmailConfig,
    currency_symbol: String,
}

impl Mailer {
    pub fn new(config: EmailConfig, currency_symbol: &str) -> Self {
        Self {
            client: Client::new(),
            config,
            currency_symbol: currency_symbol.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    pub fn order_confirmation(&self, order: &OrderNotification) -> SendEmailRequest {
        SendEmailRequest {
            from: self.config.from_address.clone(),
            to: vec![order.customer_email.clone()],
            subject: format!("Your order {} is confirmed!", order.order_number),
            text: format!(
                "Hello {}, Thank you for shopping with Faroo. Your order total is {}{}.",
                order.customer_name,
                self.currency_symbol,
                format_amount(order.total)
            ),
        }
    }

    pub fn shipping_update(&self, order: &OrderNotification) -> SendEmailRequest {
        SendEmailRequest {
            from: self.config.from_address.clone(),
            to: vec![order.customer_email.clone()],
            subject: format!("Your order {} has been shipped!", order.order_number),
            text: format!(
                "Hello {}, Your order is on its way via {}. Tracking ID: {}",
                order.customer_name,
                order.courier_name.as_deref().unwrap_or("our courier"),
                order.tracking_number.as_deref().unwrap_or("N/A")
            ),
        }
    }

    pub async fn send_order_confirmation(&self, order: &OrderNotification) -> AppResult<()> {
        let email = self.order_confirmation(order);
        self.send(email).await
    }

    pub async fn send_shipping_update(&self, order: &OrderNotification) -> AppResult<()> {
        let email = self.shipping_update(order);
        self.send(email).await
    }

    async fn send(&self, email: SendEmailRequest) -> AppResult<()> {
        if !self.is_enabled() {
            // 未配置 API key，仅记录
            log::info!(
                "Email (not sent, no api key) to {:?}: subject={}, body={}",
                email.to,
                email.subject,
                email.text
            );
            return Ok(());
        }

        let url = format!("{}/emails", self.config.api_base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&email)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Email sent successfully: {:?} {}", email.to, email.subject);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "Email failed to send: {:?}, Status: {}, Error: {}",
                email.to,
                status,
                error_text
            );
            Err(AppError::ExternalApiError(format!(
                "Email sending failed: {}",
                error_text
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> OrderNotification {
        OrderNotification {
            order_number: "ORD-2026-0007".into(),
            customer_name: "Ayesha".into(),
            customer_email: "ayesha@example.com".into(),
            total: 12500,
            status: "shipped".into(),
            tracking_number: Some("PTH123".into()),
            courier_name: Some("Pathao".into()),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(950), "950");
        assert_eq!(format_amount(12500), "12,500");
        assert_eq!(format_amount(1234567), "1,234,567");
        assert_eq!(format_amount(-4500), "-4,500");
    }

    #[test]
    fn test_confirmation_email_content() {
        let mailer = Mailer::new(EmailConfig::default(), "৳");
        let email = mailer.order_confirmation(&notification());
        assert_eq!(email.subject, "Your order ORD-2026-0007 is confirmed!");
        assert!(email.text.contains("৳12,500"));
        assert_eq!(email.to, vec!["ayesha@example.com".to_string()]);
    }

    #[test]
    fn test_shipping_email_mentions_courier_and_tracking() {
        let mailer = Mailer::new(EmailConfig::default(), "৳");
        let email = mailer.shipping_update(&notification());
        assert_eq!(email.subject, "Your order ORD-2026-0007 has been shipped!");
        assert!(email.text.contains("Pathao"));
        assert!(email.text.contains("PTH123"));
    }

    #[tokio::test]
    async fn test_send_without_api_key_only_logs() {
        let mailer = Mailer::new(EmailConfig::default(), "৳");
        assert!(!mailer.is_enabled());
        assert!(mailer.send_order_confirmation(&notification()).await.is_ok());
    }
}
