//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::WinrateLookup;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Gateway answering winrate lookups.
    pub winrate: Arc<dyn WinrateLookup>,
}

impl HttpState {
    /// Bundle the lookup port for handlers.
    pub fn new(winrate: Arc<dyn WinrateLookup>) -> Self {
        Self { winrate }
    }
}
