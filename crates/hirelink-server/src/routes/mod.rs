//! API routes for the Hirelink server.

pub mod recharge;
pub mod referrals;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Creates the main API router with all routes mounted.
pub fn create_router(state: AppState) -> Router {
    Router::new().nest("/api/v1", api_v1_routes(state))
}

/// Creates the v1 API routes.
fn api_v1_routes(state: AppState) -> Router {
    Router::new()
        .nest("/wallet", wallet::router(state.clone()))
        .nest("/referrals", referrals::router(state))
}
