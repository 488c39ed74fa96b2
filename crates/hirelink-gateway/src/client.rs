// HTTP client for the Razorpay order API.

use rand::Rng;
use reqwest::StatusCode;

use crate::error::GatewayError;
use crate::types::{GatewayOrder, NewOrderRequest};

/// Default production endpoint for the gateway API.
const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Client for the payment gateway's order API.
///
/// Authenticates with HTTP basic auth (key id / key secret), which is the
/// gateway's server-to-server scheme.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl GatewayClient {
    /// Creates a client against the production gateway endpoint.
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self::with_base_url(key_id, key_secret, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom endpoint (sandbox or test double).
    pub fn with_base_url(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        }
    }

    /// The shared secret used for confirmation signature verification.
    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    /// Creates an order with the gateway.
    ///
    /// The returned order id is what the client-side checkout flow needs to
    /// collect payment, and what the confirmation signature is bound to.
    pub async fn create_order(&self, request: &NewOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(order)
    }
}

/// Generates a receipt identifier for a new order.
///
/// The gateway caps receipts at 40 characters, so this stays well inside:
/// `rcpt_` plus 16 hex characters.
pub fn generate_receipt_id() -> String {
    let mut rng = rand::thread_rng();
    let nonce: u64 = rng.gen();
    format!("rcpt_{:016x}", nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GatewayClient::with_base_url(
            "key".to_string(),
            "secret".to_string(),
            "https://sandbox.example.com/".to_string(),
        );
        assert_eq!(client.base_url, "https://sandbox.example.com");
    }

    #[test]
    fn test_generate_receipt_id_format() {
        let receipt = generate_receipt_id();
        assert!(receipt.starts_with("rcpt_"));
        assert_eq!(receipt.len(), 21);
        assert!(receipt.len() <= 40);
    }

    #[test]
    fn test_generate_receipt_id_is_random() {
        let r1 = generate_receipt_id();
        let r2 = generate_receipt_id();
        assert_ne!(r1, r2);
    }
}
