//! Upbit Open API client
//!
//! - Signed request builder (JWT HS256 with SHA512 query hash)
//! - REST quotation, order and wallet endpoints
//! - WebSocket subscriptions for public and private streams

pub mod adapters;
pub mod config;
pub mod error;

pub use adapters::upbit::{Params, UpbitClient, UpbitConfig};
pub use adapters::{ExchangeError, ExchangeResult};
pub use error::AppError;
