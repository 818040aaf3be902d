//! Image serving use case: cache lookup, source resolution, render, store.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CacheKey, RenderOrigin, RenderedImage, TransformRequest};
use crate::domain::errors::ImageError;
use crate::domain::ports::{
    ImageCachePort, ImageTransformPort, NotificationPort, SourceLocatorPort,
};

/// Serves one rendered variant per request, rendering and caching on miss.
#[derive(Clone)]
pub struct ServeImageUseCase {
    cache: Arc<dyn ImageCachePort>,
    locator: Arc<dyn SourceLocatorPort>,
    transformer: Arc<dyn ImageTransformPort>,
    notifier: Option<Arc<dyn NotificationPort>>,
}

impl ServeImageUseCase {
    /// Creates new serve image use case.
    #[must_use]
    pub const fn new(
        cache: Arc<dyn ImageCachePort>,
        locator: Arc<dyn SourceLocatorPort>,
        transformer: Arc<dyn ImageTransformPort>,
    ) -> Self {
        Self {
            cache,
            locator,
            transformer,
            notifier: None,
        }
    }

    /// Fires `notifier` after every variant written to the cache.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns the variant described by `request`.
    ///
    /// A missing source renders the placeholder instead. Failing to store the
    /// result is logged and does not fail the request.
    ///
    /// # Errors
    /// Returns error if the source cannot be read, decoded, or encoded.
    pub async fn execute(&self, request: &TransformRequest) -> Result<RenderedImage, ImageError> {
        let key = CacheKey::derive(request);
        let format = request.output_format();
        let extension = format.dotted_extension();

        if let Some(bytes) = self.cache.get(&key, &extension).await {
            trace!(key = %key, "Serving cached variant");
            return Ok(RenderedImage::new(
                format.mime_type(),
                bytes,
                RenderOrigin::Cache,
            ));
        }

        let source = self.read_source(request.source_filename()).await?;
        let origin = if source.is_some() {
            RenderOrigin::Source
        } else {
            debug!(filename = %request.source_filename(), "Source not found, rendering placeholder");
            RenderOrigin::Placeholder
        };

        let transformer = Arc::clone(&self.transformer);
        let job = request.clone();
        let encoded =
            tokio::task::spawn_blocking(move || transformer.transform(source.as_deref(), &job))
                .await
                .map_err(|e| ImageError::Internal(format!("transform task failed: {e}")))??;

        match self.cache.put(&key, &encoded.bytes, &extension).await {
            Ok(()) => {
                if let Some(notifier) = &self.notifier {
                    notifier.notify(key.as_str());
                }
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to store rendered variant");
            }
        }

        debug!(
            key = %key,
            origin = %origin,
            size = encoded.bytes.len(),
            "Rendered variant"
        );

        Ok(RenderedImage::new(
            encoded.content_type,
            Bytes::from(encoded.bytes),
            origin,
        ))
    }

    /// Reads the source bytes, or `None` when no directory holds the file.
    async fn read_source(&self, filename: &str) -> Result<Option<Vec<u8>>, ImageError> {
        let Some(path) = self.locator.locate(filename).await else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Source vanished before read");
                Ok(None)
            }
            Err(e) => Err(ImageError::SourceRead(format!("{}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OutputFormat;
    use crate::domain::ports::mocks::{MockImageCache, MockNotificationPort, MockSourceLocator};
    use crate::infrastructure::image::{DiskImageCache, ImageTransformer};
    use chrono::{Duration, Utc};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    fn use_case(cache: Arc<MockImageCache>, locator: MockSourceLocator) -> ServeImageUseCase {
        ServeImageUseCase::new(
            cache,
            Arc::new(locator),
            Arc::new(ImageTransformer::default()),
        )
    }

    fn request(name: &str) -> TransformRequest {
        TransformRequest::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_miss_renders_and_stores_then_hits() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 40, 20);
        let cache = Arc::new(MockImageCache::new());
        let use_case = use_case(cache.clone(), MockSourceLocator::empty().with_file("a.png", path));

        let req = request("a.png").with_width(20).unwrap();
        let first = use_case.execute(&req).await.unwrap();
        assert_eq!(first.origin, RenderOrigin::Source);
        assert_eq!(first.content_type, "image/png");
        assert_eq!(cache.len().await, 1);

        let second = use_case.execute(&req).await.unwrap();
        assert_eq!(second.origin, RenderOrigin::Cache);
        assert_eq!(second.bytes, first.bytes);
        assert_eq!(cache.put_count(), 1);
    }

    #[tokio::test]
    async fn test_jpg_alias_yields_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 16, 16);
        let use_case = use_case(
            Arc::new(MockImageCache::new()),
            MockSourceLocator::empty().with_file("a.png", path),
        );

        let format: OutputFormat = "jpg".parse().unwrap();
        let rendered = use_case
            .execute(&request("a.png").with_format(format))
            .await
            .unwrap();

        assert_eq!(rendered.content_type, "image/jpeg");
        assert_eq!(
            image::guess_format(&rendered.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[tokio::test]
    async fn test_missing_source_renders_placeholder() {
        let cache = Arc::new(MockImageCache::new());
        let use_case = use_case(cache.clone(), MockSourceLocator::empty());

        let req = request("missing.png")
            .with_width(100)
            .unwrap()
            .with_height(100)
            .unwrap();
        let rendered = use_case.execute(&req).await.unwrap();

        assert_eq!(rendered.origin, RenderOrigin::Placeholder);
        let img = image::load_from_memory(&rendered.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (100, 100));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_vanished_source_renders_placeholder() {
        let dir = TempDir::new().unwrap();
        let use_case = use_case(
            Arc::new(MockImageCache::new()),
            MockSourceLocator::empty().with_file("gone.png", dir.path().join("gone.png")),
        );

        let rendered = use_case.execute(&request("gone.png")).await.unwrap();
        assert_eq!(rendered.origin, RenderOrigin::Placeholder);
    }

    #[tokio::test]
    async fn test_zero_byte_source_fails_to_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        let cache = Arc::new(MockImageCache::new());
        let use_case = use_case(cache.clone(), MockSourceLocator::empty().with_file("empty.png", path));

        let result = use_case.execute(&request("empty.png")).await;

        match result {
            Err(ImageError::Decode(message)) => assert!(!message.is_empty()),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(cache.put_count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_source_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let use_case = use_case(
            Arc::new(MockImageCache::new()),
            MockSourceLocator::empty().with_file("dir.png", dir.path().to_path_buf()),
        );

        let result = use_case.execute(&request("dir.png")).await;
        assert!(matches!(result, Err(ImageError::SourceRead(_))));
    }

    #[tokio::test]
    async fn test_cache_failure_still_serves() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let notifier = Arc::new(MockNotificationPort::new());
        let use_case = use_case(
            Arc::new(MockImageCache::failing()),
            MockSourceLocator::empty().with_file("a.png", path),
        )
        .with_notifier(notifier.clone());

        let rendered = use_case.execute(&request("a.png")).await.unwrap();

        assert_eq!(rendered.origin, RenderOrigin::Source);
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_notifier_fires_after_store() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let notifier = Arc::new(MockNotificationPort::new());
        let use_case = use_case(
            Arc::new(MockImageCache::new()),
            MockSourceLocator::empty().with_file("a.png", path),
        )
        .with_notifier(notifier.clone());

        use_case.execute(&request("a.png")).await.unwrap();
        use_case.execute(&request("a.png")).await.unwrap();

        assert_eq!(notifier.count(), 1);
        assert_eq!(
            notifier.notifications.lock().unwrap()[0],
            "a.png-w-h-fm-q-fit"
        );
    }

    #[tokio::test]
    async fn test_expired_entry_is_regenerated() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 16, 16);
        let cache = Arc::new(DiskImageCache::new(dir.path().join("cache"), 1));
        let use_case = ServeImageUseCase::new(
            cache.clone(),
            Arc::new(MockSourceLocator::empty().with_file("a.png", path)),
            Arc::new(ImageTransformer::default()),
        );

        let req = request("a.png");
        let key = CacheKey::derive(&req);
        cache
            .write_entry(&key, b"stale", ".png", Utc::now() - Duration::seconds(2))
            .await
            .unwrap();

        let rendered = use_case.execute(&req).await.unwrap();
        assert_eq!(rendered.origin, RenderOrigin::Source);
        assert_ne!(rendered.bytes.as_ref(), b"stale");

        let on_disk = std::fs::read(cache.cache_dir().join(format!("{key}.png"))).unwrap();
        assert_eq!(on_disk, rendered.bytes.as_ref());

        let again = use_case.execute(&req).await.unwrap();
        assert_eq!(again.origin, RenderOrigin::Cache);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_requests() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", 64, 64);
        let use_case = Arc::new(use_case(
            Arc::new(MockImageCache::new()),
            MockSourceLocator::empty().with_file("a.png", path),
        ));
        let req = request("a.png").with_width(32).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let use_case = Arc::clone(&use_case);
                let req = req.clone();
                tokio::spawn(async move { use_case.execute(&req).await })
            })
            .collect();

        let mut payloads = Vec::new();
        for handle in handles {
            payloads.push(handle.await.unwrap().unwrap().bytes);
        }
        assert!(payloads.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
