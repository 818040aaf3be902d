//! Domain entity definitions.

mod cache_entry;
mod cache_key;
mod rendered_image;
mod stored_file;
mod transform;

pub use cache_entry::{CacheMetadata, DEFAULT_TTL_SECS};
pub use cache_key::CacheKey;
pub use rendered_image::{EncodedImage, RenderOrigin, RenderedImage};
pub use stored_file::{EntryKind, FolderEntry, MovedFile, SearchHit, StoredFile};
pub use transform::{
    FitMode, MAX_DIMENSION, OutputFormat, TransformRequest, parse_dimension, parse_quality,
    validate_asset_name,
};
