//! Shared application state handed to every route handler.

use hirelink_gateway::GatewayClient;
use sqlx::PgPool;

/// The application state.
#[derive(Clone)]
pub struct AppState {
    /// The database pool.
    pub pool: PgPool,
    /// Payment gateway client; its secret also verifies confirmations.
    pub gateway: GatewayClient,
}

impl AppState {
    pub fn new(pool: PgPool, gateway: GatewayClient) -> Self {
        Self { pool, gateway }
    }
}
