//! Writes the OpenAPI document as pretty JSON, to the path given as the
//! first argument or to stdout.

use std::io::Write;

use gw2_build::ApiDoc;
use utoipa::OpenApi;

fn main() -> std::io::Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(std::io::Error::other)?;
    match std::env::args_os().nth(1) {
        Some(path) => std::fs::write(path, document + "\n"),
        None => writeln!(std::io::stdout().lock(), "{document}"),
    }
}
