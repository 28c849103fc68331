use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::shared::config;
use crate::{handlers, system};

/// Multipart overhead allowed on top of the configured file limits
const MULTIPART_SLACK_BYTES: usize = 1024 * 1024;

/// Body limits large enough that oversized files reach the use case and get a
/// readable rejection instead of a bare 413
fn upload_body_limits(limits: &config::BulkUploadConfig) -> (usize, usize) {
    let excel = usize::try_from(limits.max_excel_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(2)
        .saturating_add(MULTIPART_SLACK_BYTES);
    let images = usize::try_from(limits.max_image_bytes)
        .unwrap_or(usize::MAX)
        .saturating_mul(2)
        .saturating_mul(limits.max_images.max(1))
        .saturating_add(MULTIPART_SLACK_BYTES);
    (excel, images)
}

/// All application routes
pub fn configure_routes() -> Router {
    let cfg = config::get();
    let (excel_limit, images_limit) = upload_body_limits(&cfg.bulk_upload);

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // U501 BULK UPLOAD
        // ========================================
        .route(
            "/api/u501/bulk-upload/images",
            post(handlers::u501_bulk_upload::upload_images)
                .layer(DefaultBodyLimit::max(images_limit))
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/u501/bulk-upload/validate",
            post(handlers::u501_bulk_upload::validate)
                .layer(DefaultBodyLimit::max(excel_limit))
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/u501/bulk-upload/commit",
            post(handlers::u501_bulk_upload::commit)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/u501/bulk-upload/template",
            get(handlers::u501_bulk_upload::template),
        )
        .route(
            "/api/u501/bulk-upload/error-report",
            post(handlers::u501_bulk_upload::error_report),
        )
        // ========================================
        // A002 AUDIT LOG (admin only)
        // ========================================
        .route(
            "/api/a002/audit-log",
            get(handlers::a002_audit_log::list)
                .layer(middleware::from_fn(system::auth::middleware::require_admin)),
        );

    // Uploaded images are served locally only when the public URL is a path
    let public_base = cfg.server.public_base_url.trim_end_matches('/');
    if public_base.starts_with('/') && public_base.len() > 1 {
        let upload_dir = config::resolve_path(&cfg.server.upload_dir);
        router.nest_service(public_base, ServeDir::new(upload_dir))
    } else {
        router
    }
}
