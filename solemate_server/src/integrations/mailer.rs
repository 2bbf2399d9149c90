//! Order-confirmation mail, delivered through an HTTP transactional mail relay.
//!
//! The mailer subscribes to the engine's order-confirmed event. It runs strictly post-commit:
//! a mail failure is logged and dropped, it can never roll back a payment confirmation.
use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use solemate_engine::{
    db_types::Order,
    events::{EventHandlers, EventHooks},
};
use thiserror::Error;

use crate::config::MailerConfig;

pub const MAIL_EVENT_BUFFER_SIZE: usize = 25;
const MAIL_SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Could not initialize mailer client: {0}")]
    Initialization(String),
    #[error("Could not send mail: {0}")]
    Send(String),
    #[error("Mail relay rejected the message. Status {status}. {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Clone)]
pub struct MailerApi {
    config: MailerConfig,
    client: Arc<Client>,
}

impl MailerApi {
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| MailerError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(MAIL_SEND_TIMEOUT)
            .build()
            .map_err(|e| MailerError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let payload = serde_json::json!({
            "from": self.config.sender,
            "to": to,
            "subject": subject,
            "text": body,
        });
        let url = format!("{}/messages", self.config.api_url);
        let response =
            self.client.post(url).json(&payload).send().await.map_err(|e| MailerError::Send(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(MailerError::Rejected { status, message })
        }
    }
}

/// Subscribes the confirmation mailer to the order-confirmed event.
pub fn create_mailer_event_handlers(config: MailerConfig) -> Result<EventHandlers, MailerError> {
    let mut hooks = EventHooks::default();
    let mailer = MailerApi::new(config)?;
    hooks.on_order_confirmed(move |ev| {
        let order = ev.order;
        let mailer = mailer.clone();
        Box::pin(async move {
            let to = order.user_data.email.clone();
            let body = confirmation_body(&order);
            match mailer.send(&to, "Order Confirmation", &body).await {
                Ok(()) => info!("📧️ Confirmation for order {} sent to {to}", order.order_number),
                Err(e) => error!("📧️ Could not send confirmation for order {}: {e}", order.order_number),
            }
        })
    });
    Ok(EventHandlers::new(MAIL_EVENT_BUFFER_SIZE, hooks))
}

fn confirmation_body(order: &Order) -> String {
    let mut lines = vec![
        format!("Hi {},", order.user_data.first_name),
        String::new(),
        format!("Your payment for order {} has been confirmed.", order.order_number),
        String::new(),
    ];
    for item in &order.cart_data.items {
        lines.push(format!("  {} (Size: {}) x{} — {}", item.product_name, item.size, item.quantity, item.line_total));
    }
    lines.push(String::new());
    lines.push(format!("Total: {}", order.cart_data.total_amount));
    lines.push(String::new());
    lines.push("Thank you for shopping with Solemate.".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use sm_common::Naira;
    use solemate_engine::db_types::{
        CartItem,
        CartSnapshot,
        DeliveryStatus,
        Order,
        OrderId,
        OrderStatusType,
        ShippingInfo,
        UserInfo,
    };

    use super::confirmation_body;

    #[test]
    fn confirmation_lists_items_and_total() {
        let order = Order {
            id: 1,
            order_number: OrderId("ORD-1724316850112-381".to_string()),
            user_id: "user-1".to_string(),
            user_data: UserInfo {
                user_id: "user-1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                email: "ada@example.com".to_string(),
            },
            shipping_data: ShippingInfo {
                address: "12 Allen Avenue".to_string(),
                city: "Ikeja".to_string(),
                state: "Lagos".to_string(),
                postal_code: "100271".to_string(),
                delivery_status: DeliveryStatus::Pending,
                tracking_number: None,
            },
            cart_data: CartSnapshot {
                items: vec![CartItem {
                    product_id: "air-strider".to_string(),
                    variant_id: "us-9".to_string(),
                    product_name: "Air Strider".to_string(),
                    size: "US 9".to_string(),
                    quantity: 2,
                    unit_price: Naira::from(2500),
                    line_total: Naira::from(5000),
                }],
                total_amount: Naira::from(5000),
            },
            payment_data: None,
            delivery_mode: 1,
            status: OrderStatusType::PaymentConfirmed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            activity: Vec::new(),
        };
        let body = confirmation_body(&order);
        assert!(body.starts_with("Hi Ada,"));
        assert!(body.contains("ORD-1724316850112-381"));
        assert!(body.contains("Air Strider (Size: US 9) x2"));
        assert!(body.contains("Total: ₦5000"));
    }
}
