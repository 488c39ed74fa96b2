//! Hirelink Server - API for the wallet and referral marketplace.
//!
//! This crate provides the REST API server for Hirelink's wallet ledger,
//! hold/settlement flow, and paid-referral lifecycle.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod response;
pub mod routes;
pub mod state;
pub mod wallet_ops;

pub use config::Config;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
