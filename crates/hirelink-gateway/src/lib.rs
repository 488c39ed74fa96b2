//! Hirelink Gateway - payment gateway integration for the Hirelink platform.
//!
//! This crate wraps the Razorpay order API and verifies the signatures the
//! gateway attaches to payment confirmations. It is the trust boundary for
//! money entering the platform: nothing is credited to a wallet unless the
//! confirmation payload verifies here.

pub mod client;
pub mod error;
pub mod signature;
pub mod types;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use signature::{sign_payment_payload, verify_payment_signature};
pub use types::{GatewayOrder, NewOrderRequest, PaymentConfirmation};
