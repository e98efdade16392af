//! Domain primitives, use-cases and ports.
//!
//! Purpose: hold the match tables, the aggregation engine and the use-cases
//! built on them, independent of any transport or storage technology.
//! Adapters in `inbound` and `outbound` depend on this module, never the
//! other way round.
//!
//! Public surface:
//! - [`MatchStore`] and [`TableSnapshot`]: the wide table and its derived
//!   narrow snapshot.
//! - [`compute_winrate`]: aggregation over either [`TableVersion`].
//! - [`WinrateQueryService`], [`WinrateGateway`], [`IngestionService`]:
//!   use-cases implementing the driving ports in [`ports`].
//! - [`FeedFollower`]: background task landing rows other writers append.
//! - [`Error`] and [`ErrorCode`]: transport agnostic error payload.

pub mod aggregation;
pub mod champion;
pub mod error;
pub mod feed_follower;
pub mod gateway;
pub mod ingestion;
pub mod match_table;
pub mod matches;
pub mod ports;
pub mod trace_id;
pub mod winrate_service;

pub use self::aggregation::{
    AggregationError, ParseTableVersionError, TableVersion, Winrate, compute_winrate,
};
pub use self::champion::{CHAMPION_ID_MAX_LEN, ChampionId, ChampionIdValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed_follower::{DEFAULT_FEED_INTERVAL, FeedFollower};
pub use self::gateway::{DEFAULT_QUERY_TIMEOUT, GatewayPorts, GatewaySettings, WinrateGateway};
pub use self::ingestion::{IngestionService, IngestionSummary};
pub use self::match_table::{AppendOutcome, MatchStore, TableSnapshot};
pub use self::matches::{
    Lineup, MatchId, MatchPayload, MatchPayloadError, MatchRecordError, MatchRecordNarrow,
    MatchRecordWide, Role, Team,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::winrate_service::WinrateQueryService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use winrate::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::bad_request("champion_name is required"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
