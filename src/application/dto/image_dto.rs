//! Image request DTOs.

use serde::Deserialize;

use crate::domain::entities::{TransformRequest, parse_dimension, parse_quality};
use crate::domain::errors::ImageError;

/// Raw `fm`, `q`, `w`, `h`, `fit` query parameters.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageQuery {
    /// Output format token.
    pub fm: Option<String>,
    /// Lossy quality, 1 to 100.
    pub q: Option<String>,
    /// Target width in pixels.
    pub w: Option<String>,
    /// Target height in pixels.
    pub h: Option<String>,
    /// Fit mode token.
    pub fit: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl ImageQuery {
    /// Validates the query against `filename` and builds a transform request.
    ///
    /// # Errors
    /// Returns the first invalid filename or parameter.
    pub fn into_request(self, filename: &str) -> Result<TransformRequest, ImageError> {
        let mut request = TransformRequest::new(filename)?;

        if let Some(raw) = present(self.w.as_ref()) {
            request = request.with_width(parse_dimension("w", raw)?)?;
        }
        if let Some(raw) = present(self.h.as_ref()) {
            request = request.with_height(parse_dimension("h", raw)?)?;
        }
        if let Some(raw) = present(self.q.as_ref()) {
            request = request.with_quality(parse_quality(raw)?)?;
        }
        if let Some(raw) = present(self.fm.as_ref()) {
            request = request.with_format(raw.parse()?);
        }
        if let Some(raw) = present(self.fit.as_ref()) {
            request = request.with_fit(raw.parse()?);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{FitMode, OutputFormat};

    fn query(fm: &str, q: &str, w: &str, h: &str, fit: &str) -> ImageQuery {
        let opt = |s: &str| Some(s.to_string());
        ImageQuery {
            fm: opt(fm),
            q: opt(q),
            w: opt(w),
            h: opt(h),
            fit: opt(fit),
        }
    }

    #[test]
    fn test_full_query() {
        let request = query("jpg", "80", "100", "50", "contain")
            .into_request("a.png")
            .unwrap();

        assert_eq!(request.width(), Some(100));
        assert_eq!(request.height(), Some(50));
        assert_eq!(request.quality(), Some(80));
        assert_eq!(request.format(), Some(OutputFormat::Jpeg));
        assert_eq!(request.fit(), Some(FitMode::Contain));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let request = query("", "", "", " ", "").into_request("a.png").unwrap();
        assert_eq!(request, TransformRequest::new("a.png").unwrap());
    }

    #[test]
    fn test_invalid_values() {
        let err = query("", "", "abc", "", "").into_request("a.png").unwrap_err();
        assert!(err.is_client_error());

        let err = query("", "0", "", "", "").into_request("a.png").unwrap_err();
        assert!(matches!(err, ImageError::InvalidParameter { parameter: "q", .. }));

        let err = query("bmp", "", "", "", "").into_request("a.png").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat(_)));

        let err = query("", "", "", "", "stretch").into_request("a.png").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFit(_)));

        let err = ImageQuery::default().into_request("../a.png").unwrap_err();
        assert!(matches!(err, ImageError::InvalidFilename { .. }));
    }
}
