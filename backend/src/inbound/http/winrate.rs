//! Winrate lookup endpoint.
//!
//! ```text
//! GET /winrate?champion_name=Ahri
//! GET /api/v1/winrate?champion_name=Ahri
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::ports::WinrateAnswer;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Query parameters accepted by [`get_winrate`].
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WinrateParams {
    /// Champion to look up, matched case-sensitively after trimming.
    #[param(example = "Ahri")]
    pub champion_name: Option<String>,
}

/// Response payload for a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WinrateResponse {
    /// Champion the winrate belongs to.
    #[schema(example = "Ahri")]
    pub champion_name: String,
    /// Wins divided by appearances, in `[0, 1]`.
    #[schema(example = 0.5123)]
    pub winrate: f64,
}

impl From<WinrateAnswer> for WinrateResponse {
    fn from(answer: WinrateAnswer) -> Self {
        Self {
            champion_name: answer.champion_name,
            winrate: answer.winrate.value(),
        }
    }
}

fn missing_champion_name() -> Error {
    Error::bad_request("champion_name is required").with_details(json!({
        "field": "champion_name",
        "code": "missing_field",
    }))
}

/// Look up the winrate of a champion.
#[utoipa::path(
    get,
    path = "/winrate",
    params(WinrateParams),
    description = "Return the share of recorded appearances the champion won. Example request: GET /winrate?champion_name=Ahri",
    responses(
        (status = 200, description = "Winrate of the champion", body = WinrateResponse),
        (status = 400, description = "Missing or invalid champion name", body = ErrorSchema),
        (status = 404, description = "No recorded appearances", body = ErrorSchema),
        (status = 504, description = "Aggregation timed out", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["winrate"],
    operation_id = "getWinrate"
)]
#[get("/winrate")]
pub async fn get_winrate(
    state: web::Data<HttpState>,
    params: web::Query<WinrateParams>,
) -> ApiResult<web::Json<WinrateResponse>> {
    let champion_name = params
        .into_inner()
        .champion_name
        .ok_or_else(missing_champion_name)?;
    let answer = state.winrate.lookup(&champion_name).await?;
    Ok(web::Json(answer.into()))
}
