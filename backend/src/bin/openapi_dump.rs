//! Print the OpenAPI document as JSON.

use std::io;

use utoipa::OpenApi;
use winrate::doc::ApiDoc;

fn main() -> io::Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(|error| io::Error::other(format!("serialise OpenAPI document: {error}")))?;
    println!("{document}");
    Ok(())
}
