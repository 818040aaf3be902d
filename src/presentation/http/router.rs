//! Route table and middleware.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use regex::Regex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{files, images, system};
use super::state::AppState;
use crate::infrastructure::config::{AppConfig, ServerConfig};

const DEFAULT_ROUTE_PREFIX: &str = "assets";

/// Room for JSON framing around the base64 payloads.
const UPLOAD_BODY_SLACK: u64 = 64 * 1024;

/// Builds the CORS layer from `server.allowed_origins`.
///
/// An empty list allows any origin. Entries prefixed with `regex:` are
/// matched as regular expressions; invalid patterns are skipped.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if server.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let mut exact = Vec::new();
    let mut patterns = Vec::new();
    for origin in &server.allowed_origins {
        match origin.strip_prefix("regex:") {
            Some(pattern) => match Regex::new(pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => warn!(pattern, error = %e, "Ignoring invalid CORS origin pattern"),
            },
            None => exact.push(origin.clone()),
        }
    }

    layer.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts: &Parts| {
            let Ok(origin) = origin.to_str() else {
                return false;
            };
            exact.iter().any(|allowed| allowed == origin)
                || patterns.iter().any(|re| re.is_match(origin))
        },
    ))
}

fn image_route(prefix: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let prefix = if prefix.is_empty() {
        DEFAULT_ROUTE_PREFIX
    } else {
        prefix
    };
    format!("/{prefix}/image/{{filename}}")
}

/// Builds the application router.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let upload_limit = config
        .storage
        .max_upload_bytes
        .saturating_mul(4)
        .div_ceil(3)
        .saturating_add(UPLOAD_BODY_SLACK);
    let upload_limit = usize::try_from(upload_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(system::welcome))
        .route("/version", get(system::version))
        .route(&image_route(&config.server.route_prefix), get(images::serve_image))
        .route(
            "/file/upload",
            post(files::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/file/search", get(files::search))
        .route("/file/preview/{filename}", get(files::preview))
        .route("/file/download/{filename}", get(files::download))
        .route("/file/move/{filename}", put(files::move_file))
        .route("/file/delete/{filename}", delete(files::delete_file))
        .route("/folder", get(files::folder_root))
        .route("/folder/{*path}", get(files::folder))
        .fallback(system::not_found)
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, ETAG,
        IF_NONE_MATCH, ORIGIN,
    };
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{ImageFormat, Rgba, RgbaImage};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::application::use_cases::{ServeImageUseCase, UploadFilesUseCase, UploadPolicy};
    use crate::infrastructure::image::{DiskImageCache, ImageTransformer};
    use crate::infrastructure::storage::{DirectoryLocator, LocalFileStore};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([30, 90, 160, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn test_config(root: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.directories = vec![root.join("storage")];
        config.storage.upload_dir = root.join("storage");
        config.cache.dir = root.join("cache");
        config
    }

    fn test_app(root: &Path, config: &AppConfig) -> Router {
        let storage_dir = root.join("storage");
        std::fs::create_dir_all(&storage_dir).unwrap();
        std::fs::write(storage_dir.join("photo.png"), png_bytes(80, 40)).unwrap();
        std::fs::write(storage_dir.join("broken.png"), b"").unwrap();

        let cache = Arc::new(DiskImageCache::new(
            config.cache.dir.clone(),
            config.cache.ttl_secs,
        ));
        let locator = Arc::new(DirectoryLocator::new(config.storage.directories.clone()));
        let store = Arc::new(LocalFileStore::new(
            config.storage.directories.clone(),
            config.storage.upload_dir.clone(),
        ));
        let policy = UploadPolicy {
            max_bytes: config.storage.max_upload_bytes,
            keep_original_name: config.storage.upload_original_name,
        };

        let state = AppState {
            images: ServeImageUseCase::new(cache, locator, Arc::new(ImageTransformer::default())),
            uploads: UploadFilesUseCase::new(store.clone(), policy),
            storage: store,
            max_age_secs: config.cache.max_age_header_secs,
        };
        build_router(state, config)
    }

    fn setup() -> (Router, TempDir) {
        let temp = TempDir::new().unwrap();
        let config = test_config(temp.path());
        (test_app(temp.path(), &config), temp)
    }

    async fn get_uri(app: &Router, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[test]
    fn test_image_route() {
        assert_eq!(image_route("assets"), "/assets/image/{filename}");
        assert_eq!(image_route("/media/"), "/media/image/{filename}");
        assert_eq!(image_route(""), "/assets/image/{filename}");
    }

    #[tokio::test]
    async fn test_jpg_request_yields_jpeg() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/photo.png?fm=jpg&w=40&q=80").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/jpeg");
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age=3600");
        assert!(resp.headers().contains_key(ETAG));
        let bytes = body_bytes(resp).await;
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[tokio::test]
    async fn test_missing_source_returns_placeholder() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/missing.png?w=100&h=100").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
        let img = image::load_from_memory(&body_bytes(resp).await).unwrap();
        assert_eq!((img.width(), img.height()), (100, 100));
    }

    #[tokio::test]
    async fn test_corrupt_source_is_server_error() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/broken.png").await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let (app, temp) = setup();
        let uri = "/assets/image/photo.png?fm=webp&w=30&h=30&fit=contain";

        let first = body_bytes(get_uri(&app, uri).await).await;
        let second = body_bytes(get_uri(&app, uri).await).await;

        assert_eq!(first, second);
        assert!(
            temp.path()
                .join("cache/photo.png-w30-h30-fmwebp-q-fitcontain.webp")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_if_none_match_returns_not_modified() {
        let (app, _temp) = setup();
        let uri = "/assets/image/photo.png?w=20";

        let first = get_uri(&app, uri).await;
        let etag = first.headers()[ETAG].clone();

        let req = Request::builder()
            .uri(uri)
            .header(IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_client_errors() {
        let (app, _temp) = setup();

        for uri in [
            "/assets/image/photo.png?w=abc",
            "/assets/image/photo.png?h=0",
            "/assets/image/photo.png?q=101",
            "/assets/image/bad%5Cname.png",
            "/assets/image/%2E%2E",
        ] {
            let resp = get_uri(&app, uri).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = body_json(resp).await;
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_error() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/photo.png?w=10&w=20").await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        let body = body_json(resp).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("duplicate field"), "{message}");
    }

    #[tokio::test]
    async fn test_malformed_filename_encoding_is_json_error() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/%FF.png").await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_double_dot_inside_name_is_served() {
        let (app, temp) = setup();
        std::fs::write(temp.path().join("storage/photo..v2.png"), png_bytes(10, 10)).unwrap();

        let resp = get_uri(&app, "/assets/image/photo..v2.png").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_unsupported_format_is_server_error() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/assets/image/photo.png?fm=bmp").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_custom_route_prefix() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.server.route_prefix = "media".to_string();
        let app = test_app(temp.path(), &config);

        assert_eq!(get_uri(&app, "/media/image/photo.png").await.status(), StatusCode::OK);
        assert_eq!(
            get_uri(&app, "/assets/image/photo.png").await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_version_and_welcome() {
        let (app, _temp) = setup();

        let body = body_json(get_uri(&app, "/version").await).await;
        assert_eq!(body["name"], crate::NAME);
        assert_eq!(body["version"], crate::VERSION);

        let body = body_json(get_uri(&app, "/?hello=world").await).await;
        assert_eq!(body["status"], 200);
        assert_eq!(body["result"]["query"]["hello"], "world");
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped_404() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/nope").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_upload_then_search_and_preview() {
        let (app, temp) = setup();
        let payload = serde_json::json!({
            "base64": STANDARD.encode(b"%PDF-1.4 report"),
            "filename": "Quarterly Report.pdf",
            "mimetype": "application/pdf",
            "dir": "docs",
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri("/file/upload")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let stored = body["result"][0]["filename"].as_str().unwrap().to_string();
        assert!(stored.ends_with(".pdf"));
        assert!(temp.path().join("storage/docs").join(&stored).exists());

        let body = body_json(get_uri(&app, "/file/search?q=PDF&type=office").await).await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);

        let resp = get_uri(&app, "/file/preview/photo.png").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "image/png");
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let (app, _temp) = setup();
        let payload = serde_json::json!({
            "base64": STANDARD.encode(b"<script>"),
            "filename": "x.html",
            "mimetype": "text/html",
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri("/file/upload")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["status"], 400);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let (app, _temp) = setup();

        let resp = get_uri(&app, "/file/search?q=").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = get_uri(&app, "/file/preview/absent.png").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_move_and_delete() {
        let (app, temp) = setup();

        let resp = get_uri(&app, "/file/download/photo.png").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"photo.png\""
        );
        assert_eq!(body_bytes(resp).await, png_bytes(80, 40));

        let req = Request::builder()
            .method(Method::PUT)
            .uri("/file/move/photo.png")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"destination": "gallery"}"#))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["result"]["to"].as_str().unwrap().ends_with("storage/gallery/photo.png"));
        assert!(temp.path().join("storage/gallery/photo.png").exists());
        assert!(!temp.path().join("storage/photo.png").exists());

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/file/delete/broken.png")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!temp.path().join("storage/broken.png").exists());

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/file/delete/broken.png")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["message"], "File not found.");
    }

    #[tokio::test]
    async fn test_move_rejects_traversal_and_bad_body() {
        let (app, temp) = setup();

        for body in [r#"{"destination": "../outside"}"#, "not json"] {
            let req = Request::builder()
                .method(Method::PUT)
                .uri("/file/move/photo.png")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(body_json(resp).await["status"], 400);
        }
        assert!(temp.path().join("storage/photo.png").exists());
    }

    #[tokio::test]
    async fn test_folder_listing() {
        let (app, temp) = setup();
        std::fs::create_dir_all(temp.path().join("storage/nested")).unwrap();
        std::fs::write(temp.path().join("storage/nested/a.txt"), b"a").unwrap();

        let body = body_json(get_uri(&app, "/folder").await).await;
        let names: Vec<_> = body["result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["broken.png", "nested", "photo.png"]);

        let body = body_json(get_uri(&app, "/folder/nested").await).await;
        assert_eq!(body["result"][0]["type"], "file");

        assert_eq!(
            get_uri(&app, "/folder/missing").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_uri(&app, "/folder/nested/../../etc").await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_cors_origin_patterns() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.server.allowed_origins = vec![
            "https://exact.test".to_string(),
            r"regex:^https://[a-z]+\.example\.com$".to_string(),
        ];
        let app = test_app(temp.path(), &config);

        for (origin, allowed) in [
            ("https://exact.test", true),
            ("https://app.example.com", true),
            ("https://evil.test", false),
        ] {
            let req = Request::builder()
                .uri("/version")
                .header(ORIGIN, origin)
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(
                resp.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN),
                allowed,
                "{origin}"
            );
        }
    }
}
