//! Shared handler state.

use std::sync::Arc;

use crate::application::use_cases::{ServeImageUseCase, UploadFilesUseCase};
use crate::domain::ports::FileStoragePort;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Image serving pipeline.
    pub images: ServeImageUseCase,
    /// Upload workflow.
    pub uploads: UploadFilesUseCase,
    /// Search, preview and folder listing.
    pub storage: Arc<dyn FileStoragePort>,
    /// `Cache-Control: max-age` for image responses.
    pub max_age_secs: u64,
}
