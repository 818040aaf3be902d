//! Resize, fit and encode pipeline built on the `image` crate.

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, GenericImageView, Rgba, RgbaImage};
use tracing::{debug, trace};

use crate::domain::entities::{EncodedImage, FitMode, MAX_DIMENSION, OutputFormat, TransformRequest};
use crate::domain::errors::ImageError;
use crate::domain::ports::ImageTransformPort;

use super::placeholder::{self, DEFAULT_PLACEHOLDER_WIDTH};

/// Default encoder quality for lossy formats.
pub const DEFAULT_QUALITY: u8 = 60;

const FILTER: FilterType = FilterType::Lanczos3;

/// Transform engine settings.
#[derive(Debug, Clone, Copy)]
pub struct ImageTransformer {
    default_quality: u8,
    placeholder_width: u32,
    placeholder_height: Option<u32>,
}

impl ImageTransformer {
    /// Creates a transformer. A `placeholder_height` of `None` makes
    /// placeholders square.
    #[must_use]
    pub const fn new(
        default_quality: u8,
        placeholder_width: u32,
        placeholder_height: Option<u32>,
    ) -> Self {
        Self {
            default_quality,
            placeholder_width,
            placeholder_height,
        }
    }

    fn placeholder_dimensions(&self, request: &TransformRequest) -> (u32, u32) {
        match (request.width(), request.height()) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w),
            (None, Some(h)) => (self.placeholder_width, h),
            (None, None) => (
                self.placeholder_width,
                self.placeholder_height.unwrap_or(self.placeholder_width),
            ),
        }
    }
}

impl Default for ImageTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY, DEFAULT_PLACEHOLDER_WIDTH, None)
    }
}

impl ImageTransformPort for ImageTransformer {
    fn transform(
        &self,
        source: Option<&[u8]>,
        request: &TransformRequest,
    ) -> Result<EncodedImage, ImageError> {
        let base = if let Some(bytes) = source {
            image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?
        } else {
            let (width, height) = self.placeholder_dimensions(request);
            debug!(
                filename = request.source_filename(),
                width, height, "Rendering placeholder"
            );
            DynamicImage::ImageRgba8(placeholder::render(width, height)?)
        };

        let img = if request.wants_resize() {
            resize(base, request.width(), request.height(), request.effective_fit())
        } else {
            base
        };

        let format = request.output_format();
        let quality = request.quality().unwrap_or(self.default_quality);
        let bytes = encode(&img, format, quality)?;

        trace!(
            filename = request.source_filename(),
            format = %format,
            width = img.width(),
            height = img.height(),
            size = bytes.len(),
            "Encoded variant"
        );

        Ok(EncodedImage {
            content_type: format.mime_type(),
            bytes,
        })
    }
}

/// Maps `img` into the requested box according to `fit`.
///
/// With a single dimension the other follows the source aspect ratio,
/// whatever the fit mode.
#[must_use]
pub fn resize(
    img: DynamicImage,
    width: Option<u32>,
    height: Option<u32>,
    fit: FitMode,
) -> DynamicImage {
    let (src_w, src_h) = img.dimensions();

    match (width, height) {
        (Some(w), Some(h)) => match fit {
            FitMode::Cover => img.resize_to_fill(w, h, FILTER),
            FitMode::Fill => img.resize_exact(w, h, FILTER),
            FitMode::Inside => img.resize(w, h, FILTER),
            FitMode::Contain => letterbox(&img.resize(w, h, FILTER), w, h),
            FitMode::Outside => {
                let (tw, th) = outside_dimensions(src_w, src_h, w, h);
                img.resize_exact(tw, th, FILTER)
            }
        },
        (Some(w), None) => img.resize_exact(w, scaled_length(src_w, src_h, w), FILTER),
        (None, Some(h)) => img.resize_exact(scaled_length(src_h, src_w, h), h, FILTER),
        (None, None) => img,
    }
}

/// Length across an axis after scaling the other axis from `src_along` to
/// `target_along`, rounded and kept within `1..=MAX_DIMENSION`.
#[must_use]
pub fn scaled_length(src_along: u32, src_across: u32, target_along: u32) -> u32 {
    let src_along = u64::from(src_along.max(1));
    let scaled = (u64::from(src_across) * u64::from(target_along) + src_along / 2) / src_along;
    u32::try_from(scaled.clamp(1, u64::from(MAX_DIMENSION))).unwrap_or(MAX_DIMENSION)
}

/// Smallest aspect-preserving size that covers `w` x `h` without cropping.
#[must_use]
pub fn outside_dimensions(src_w: u32, src_h: u32, w: u32, h: u32) -> (u32, u32) {
    if u64::from(w) * u64::from(src_h) >= u64::from(h) * u64::from(src_w) {
        (w, scaled_length(src_w, src_h, w))
    } else {
        (scaled_length(src_h, src_w, h), h)
    }
}

fn letterbox(fitted: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let x = (width.saturating_sub(fitted.width())) / 2;
    let y = (height.saturating_sub(fitted.height())) / 2;
    image::imageops::overlay(&mut canvas, &fitted.to_rgba8(), i64::from(x), i64::from(y));
    DynamicImage::ImageRgba8(canvas)
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();

    let result = match format {
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut buf)),
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality)),
        OutputFormat::Webp => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf)),
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut buf);
            encoder.encode_frame(Frame::new(img.to_rgba8()))
        }
    };

    result.map_err(|e| ImageError::Encode(format!("{format}: {e}")))?;
    Ok(buf)
}
