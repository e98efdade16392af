//! HTTP inbound adapter exposing the winrate endpoint and health checks.

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod winrate;

pub use crate::domain::ApiResult;
