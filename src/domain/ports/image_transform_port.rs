//! Port for the CPU-bound transform engine.

use crate::domain::entities::{EncodedImage, TransformRequest};
use crate::domain::errors::ImageError;

/// Renders one variant from optional source bytes.
///
/// Called from the blocking pool; implementations must not block on async work.
pub trait ImageTransformPort: Send + Sync {
    /// Produces the encoded variant. `None` means the source file is missing
    /// and a placeholder must be rendered instead.
    ///
    /// # Errors
    /// Returns `ImageError` if decoding, resizing or encoding fails.
    fn transform(
        &self,
        source: Option<&[u8]>,
        request: &TransformRequest,
    ) -> Result<EncodedImage, ImageError>;
}
