//! Transform request value objects.

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ImageError;

/// Largest width or height a transform may request.
pub const MAX_DIMENSION: u32 = 8192;

/// Encoding used for a rendered variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossless PNG, the canonical format.
    #[default]
    Png,
    /// Lossy JPEG.
    Jpeg,
    /// Lossless WebP.
    Webp,
    /// Single-frame GIF.
    Gif,
}

impl OutputFormat {
    /// Canonical token, also used inside cache keys.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    /// File suffix for cached payloads, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.token(),
        }
    }

    /// File suffix with the leading dot.
    #[must_use]
    pub fn dotted_extension(self) -> String {
        format!(".{}", self.extension())
    }

    /// MIME type for responses. `jpg` is always reported as `image/jpeg`.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "gif" => Ok(Self::Gif),
            _ => Err(ImageError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How a source image is mapped into the requested width x height box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FitMode {
    /// Scale to fill the box, cropping the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the box and letterbox the remainder.
    Contain,
    /// Stretch to the exact box, ignoring aspect ratio.
    Fill,
    /// Scale to fit inside the box without letterboxing.
    Inside,
    /// Scale until both sides reach the box without cropping.
    Outside,
}

impl FitMode {
    /// Canonical token.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::Inside => "inside",
            Self::Outside => "outside",
        }
    }
}

impl FromStr for FitMode {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "inside" => Ok(Self::Inside),
            "outside" => Ok(Self::Outside),
            _ => Err(ImageError::UnsupportedFit(s.to_string())),
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single request to render one variant of one stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    source_filename: String,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<OutputFormat>,
    quality: Option<u8>,
    fit: Option<FitMode>,
}

impl TransformRequest {
    /// Creates a request for the original asset with no transforms.
    ///
    /// # Errors
    /// Returns `ImageError::InvalidFilename` if the name is not a single,
    /// non-traversing path segment.
    pub fn new(source_filename: impl Into<String>) -> Result<Self, ImageError> {
        let source_filename = source_filename.into();
        validate_asset_name(&source_filename)?;

        Ok(Self {
            source_filename,
            width: None,
            height: None,
            format: None,
            quality: None,
            fit: None,
        })
    }

    /// Sets the target width.
    ///
    /// # Errors
    /// Returns error if width is zero or above [`MAX_DIMENSION`].
    pub fn with_width(mut self, width: u32) -> Result<Self, ImageError> {
        self.width = Some(check_dimension("w", width)?);
        Ok(self)
    }

    /// Sets the target height.
    ///
    /// # Errors
    /// Returns error if height is zero or above [`MAX_DIMENSION`].
    pub fn with_height(mut self, height: u32) -> Result<Self, ImageError> {
        self.height = Some(check_dimension("h", height)?);
        Ok(self)
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the encoder quality.
    ///
    /// # Errors
    /// Returns error if quality is outside 1..=100.
    pub fn with_quality(mut self, quality: u8) -> Result<Self, ImageError> {
        if !(1..=100).contains(&quality) {
            return Err(ImageError::invalid_parameter(
                "q",
                quality.to_string(),
                "must be between 1 and 100",
            ));
        }
        self.quality = Some(quality);
        Ok(self)
    }

    /// Sets the fit mode.
    #[must_use]
    pub const fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = Some(fit);
        self
    }

    /// Logical asset name.
    #[must_use]
    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    /// Requested width, if any.
    #[must_use]
    pub const fn width(&self) -> Option<u32> {
        self.width
    }

    /// Requested height, if any.
    #[must_use]
    pub const fn height(&self) -> Option<u32> {
        self.height
    }

    /// Explicitly requested format, if any.
    #[must_use]
    pub const fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// Explicitly requested quality, if any.
    #[must_use]
    pub const fn quality(&self) -> Option<u8> {
        self.quality
    }

    /// Explicitly requested fit mode, if any.
    #[must_use]
    pub const fn fit(&self) -> Option<FitMode> {
        self.fit
    }

    /// Format the variant is encoded with.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Fit mode the resize uses.
    #[must_use]
    pub fn effective_fit(&self) -> FitMode {
        self.fit.unwrap_or_default()
    }

    /// Whether any resize was requested.
    #[must_use]
    pub const fn wants_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// Parses a `w`/`h` query value.
///
/// # Errors
/// Returns `ImageError::InvalidParameter` for non-numeric, zero, or oversized values.
pub fn parse_dimension(parameter: &'static str, raw: &str) -> Result<u32, ImageError> {
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ImageError::invalid_parameter(parameter, raw, "expected a positive integer"))?;
    check_dimension(parameter, value)
}

/// Parses a `q` query value.
///
/// # Errors
/// Returns `ImageError::InvalidParameter` unless the value is an integer in 1..=100.
pub fn parse_quality(raw: &str) -> Result<u8, ImageError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|q| (1..=100).contains(q))
        .ok_or_else(|| ImageError::invalid_parameter("q", raw, "must be between 1 and 100"))
}

fn check_dimension(parameter: &'static str, value: u32) -> Result<u32, ImageError> {
    if value == 0 {
        return Err(ImageError::invalid_parameter(
            parameter,
            "0",
            "must be a positive integer",
        ));
    }
    if value > MAX_DIMENSION {
        return Err(ImageError::invalid_parameter(
            parameter,
            value.to_string(),
            format!("must not exceed {MAX_DIMENSION}"),
        ));
    }
    Ok(value)
}

/// Rejects names that could escape the storage directories.
///
/// # Errors
/// Returns `ImageError::InvalidFilename` describing the first violation.
pub fn validate_asset_name(name: &str) -> Result<(), ImageError> {
    if name.trim().is_empty() {
        return Err(ImageError::invalid_filename(name, "must not be empty"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(ImageError::invalid_filename(
            name,
            "must not contain path separators",
        ));
    }
    if name == "." || name == ".." {
        return Err(ImageError::invalid_filename(
            name,
            "must not reference parent directories",
        ));
    }
    Ok(())
}
