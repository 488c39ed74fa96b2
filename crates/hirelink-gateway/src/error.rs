// Error types for gateway operations.

/// Errors returned by the payment gateway client and signature checks.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Payment signature verification failed")]
    InvalidSignature,

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}
