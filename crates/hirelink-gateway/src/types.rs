// Wire types for the Razorpay order API.

use serde::{Deserialize, Serialize};

/// Request body for creating an order with the gateway.
///
/// Amounts are in minor currency units (paise for INR), which is what the
/// gateway expects on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderRequest {
    /// Amount in minor units (e.g. 50000 = 500.00 INR).
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Caller-supplied receipt identifier, echoed back by the gateway.
    pub receipt: String,
}

/// An order as returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway-assigned order identifier (order_...).
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// The receipt identifier we supplied at creation.
    pub receipt: Option<String>,
    /// Gateway-side order status (created, attempted, paid).
    pub status: String,
}

/// The confirmation payload a client posts back after completing payment.
///
/// The signature is an HMAC-SHA256 over `"<order_id>|<payment_id>"` keyed
/// with the gateway shared secret.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}
