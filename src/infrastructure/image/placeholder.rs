//! "Image not found" placeholder rasterization.

use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use crate::domain::errors::ImageError;

/// Default placeholder width when the request names no width.
pub const DEFAULT_PLACEHOLDER_WIDTH: u32 = 300;

/// Neutral gray behind the glyph.
pub const BACKGROUND: [u8; 3] = [200, 200, 200];

/// Side of the glyph's square viewBox.
const GLYPH_SIZE: f32 = 100.0;

const GLYPH_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100" fill="none">
    <rect width="100" height="100" fill="#f7f7f7"/>
    <g>
        <path d="M70 65L62 55C61 53 59.5 52 58 52C56.5 52 55 53 54 55L50 60C49.5 61 48.5 61.5 47.5 61.5C46.5 61.5 45.5 61 45 60L44.5 59.5C43.5 58.5 42.5 58 41.5 58.2C40.5 58.4 39.5 59 39 60L35 66C34 68 34.2 70 35.5 71.5C36.8 73 38.8 74 41 74H59C61 74 63 73 64.5 71.5C66 70 66.2 67.8 70 65Z" fill="#AEB7BE"/>
        <circle cx="45" cy="42" r="6" fill="#AEB7BE"/>
    </g>
</svg>"##;

/// Rasterizes the placeholder glyph at `width` x `height`.
///
/// The glyph is scaled uniformly and centred; the rest of the canvas keeps
/// the gray background.
///
/// # Errors
/// Returns `ImageError::Placeholder` if a dimension is zero.
pub fn render(width: u32, height: u32) -> Result<RgbaImage, ImageError> {
    let tree = usvg::Tree::from_str(GLYPH_SVG, &usvg::Options::default())
        .map_err(|e| ImageError::Placeholder(format!("invalid glyph: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ImageError::Placeholder(format!("cannot allocate {width}x{height} canvas"))
    })?;
    let [r, g, b] = BACKGROUND;
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (width as f32, height as f32);
    let scale = w.min(h) / GLYPH_SIZE;
    let offset_x = GLYPH_SIZE.mul_add(-scale, w) / 2.0;
    let offset_y = GLYPH_SIZE.mul_add(-scale, h) / 2.0;
    let transform = tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, offset_x, offset_y);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ImageError::Placeholder("pixel buffer size mismatch".to_string()))
}
