//! File-backed persistence adapters.
//!
//! Wide match rows are stored one JSON object per line. The file is only
//! ever appended to; the in-memory store owns de-duplication, so a line
//! repeating an earlier `match_id` is skipped when the store is rebuilt.
//! A running server follows the file through [`JsonlMatchFeed`] and picks up
//! rows other writers append.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between row DTOs and domain
//!   records. No business logic resides here.
//! - **Internal models**: the on-disk row shape ([`WideRow`]) is separate
//!   from the domain type so either can evolve independently.
//! - **Capability-scoped I/O**: files are reached through a `cap_std` `Dir`
//!   opened once at construction.

mod jsonl_match_feed;
mod jsonl_match_repository;
mod wide_row;

pub use jsonl_match_feed::JsonlMatchFeed;
pub use jsonl_match_repository::JsonlMatchRepository;
pub use wide_row::{WideRow, WideRowError};
