//! Exchange adapters
//!
//! The Upbit client lives in [`upbit`]; transport helpers it builds on are
//! in [`shared`].

pub mod errors;
pub mod shared;
pub mod upbit;

pub use errors::{ExchangeError, ExchangeResult};
pub use upbit::{UpbitClient, UpbitConfig};
