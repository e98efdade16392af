//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the winrate lookup and the health checks together
//! with the error payload schemas from [`crate::inbound::http::schemas`].
//! The generated document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::winrate::WinrateResponse;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Champion winrate API",
        description = "Per-champion winrates aggregated from ranked solo queue matches."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::winrate::get_winrate,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(WinrateResponse, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "winrate", description = "Champion winrate lookups"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn winrate_response_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let response = schemas.get("WinrateResponse").expect("WinrateResponse schema");

        assert_object_schema_has_field(response, "champion_name");
        assert_object_schema_has_field(response, "winrate");
    }

    #[test]
    fn document_lists_winrate_and_health_checks() {
        let doc = ApiDoc::openapi();
        for path in ["/winrate", "/health/ready", "/health/live"] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }
}
