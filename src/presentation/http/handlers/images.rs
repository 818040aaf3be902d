//! Image variant endpoint.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tracing::trace;

use crate::application::dto::ImageQuery;
use crate::domain::errors::ImageError;
use crate::presentation::http::error::ImageFailure;
use crate::presentation::http::state::AppState;

/// Whether an `If-None-Match` header value matches `etag`.
fn etag_matches(header: &str, etag: &str) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag)
    })
}

/// `GET /{prefix}/image/{filename}?fm=&q=&w=&h=&fit=`
pub async fn serve_image(
    State(state): State<AppState>,
    uri: Uri,
    filename: Result<Path<String>, PathRejection>,
    query: Result<Query<ImageQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ImageFailure> {
    let Path(filename) =
        filename.map_err(|e| ImageError::invalid_filename(uri.path(), e.body_text()))?;
    let Query(query) = query.map_err(|e| {
        ImageError::invalid_parameter("query", uri.query().unwrap_or_default(), e.body_text())
    })?;
    let request = query.into_request(&filename)?;
    let rendered = state.images.execute(&request).await?;

    let etag = rendered.etag();
    let cache_control = format!("public, max-age={}", state.max_age_secs);

    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| etag_matches(value, &etag));
    if not_modified {
        trace!(filename = %filename, "Client copy is current");
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(ETAG, etag), (CACHE_CONTROL, cache_control)],
        )
            .into_response());
    }

    Ok((
        [
            (CONTENT_TYPE, rendered.content_type.to_string()),
            (ETAG, etag),
            (CACHE_CONTROL, cache_control),
        ],
        rendered.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("\"abc\"", true ; "exact")]
    #[test_case("W/\"abc\"", true ; "weak")]
    #[test_case("\"x\", \"abc\"", true ; "list")]
    #[test_case("*", true ; "wildcard")]
    #[test_case("\"abd\"", false ; "different")]
    fn test_etag_matches(header: &str, expected: bool) {
        assert_eq!(etag_matches(header, "\"abc\""), expected);
    }
}
