use std::sync::Arc;

use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use contracts::usecases::u501_bulk_upload::{
    BulkUploadResult, CommitRequest, ImageUploadResponse, TemplateData, UploadedImage,
    ValidateResponse, ValidationError,
};
use once_cell::sync::Lazy;

use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u501_bulk_upload::{
    self, authorize, AuditLogSink, BulkUploadError, BulkUploadExecutor, ImageRegistry,
    IncomingImage, LocalImageStorage, SpreadsheetUpload, VehicleStore,
};

static BULK_UPLOAD_EXECUTOR: Lazy<Arc<BulkUploadExecutor>> = Lazy::new(|| {
    let db = get_connection().clone();
    Arc::new(BulkUploadExecutor::new(
        Arc::new(VehicleStore::new(db.clone())),
        Arc::new(AuditLogSink::new(db)),
        config::get().bulk_upload.clone(),
    ))
});

static IMAGE_REGISTRY: Lazy<Arc<ImageRegistry>> = Lazy::new(|| {
    let server = &config::get().server;
    let storage = LocalImageStorage::new(
        config::resolve_path(&server.upload_dir),
        server.public_base_url.clone(),
    );
    Arc::new(ImageRegistry::new(
        Arc::new(storage),
        config::get().bulk_upload.clone(),
    ))
});

/// POST /api/u501/bulk-upload/images
pub async fn upload_images(
    CurrentUser(claims): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, (StatusCode, Json<ImageUploadResponse>)> {
    if let Err(e) = authorize(&claims) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ImageUploadResponse::failed(e.message)),
        ));
    }

    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read image upload: {}", e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ImageUploadResponse::failed(
                        "No se pudo leer la carga de imágenes",
                    )),
                ));
            }
        };
        if field.name() != Some("images") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => files.push(IncomingImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            }),
            Err(e) => {
                tracing::error!("Failed to read image {}: {}", file_name, e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ImageUploadResponse::failed(format!(
                        "No se pudo leer la imagen {}",
                        file_name
                    ))),
                ));
            }
        }
    }

    Ok(Json(IMAGE_REGISTRY.upload(files).await))
}

/// POST /api/u501/bulk-upload/validate
///
/// Multipart: `excel` (file) and `images` (JSON list of uploaded images).
pub async fn validate(
    CurrentUser(claims): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ValidateResponse>, (StatusCode, Json<ValidateResponse>)> {
    if let Err(e) = authorize(&claims) {
        return Err((StatusCode::FORBIDDEN, Json(ValidateResponse::failed(e.message))));
    }

    let mut upload: Option<SpreadsheetUpload> = None;
    let mut images: Vec<UploadedImage> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read spreadsheet upload: {}", e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ValidateResponse::failed("No se pudo leer el formulario")),
                ));
            }
        };

        match field.name() {
            Some("excel") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read spreadsheet {}: {}", file_name, e);
                    (
                        StatusCode::BAD_REQUEST,
                        Json(ValidateResponse::failed("No se pudo leer el archivo Excel")),
                    )
                })?;
                upload = Some(SpreadsheetUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("images") => {
                let text = field.text().await.unwrap_or_default();
                if !text.trim().is_empty() {
                    images = serde_json::from_str(&text).map_err(|e| {
                        tracing::warn!("Invalid images list: {}", e);
                        (
                            StatusCode::BAD_REQUEST,
                            Json(ValidateResponse::failed("Lista de imágenes inválida")),
                        )
                    })?;
                }
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        return Ok(Json(ValidateResponse::failed(
            BulkUploadError::MissingFile.to_string(),
        )));
    };

    match BULK_UPLOAD_EXECUTOR.validate(upload, &images).await {
        Ok(result) => Ok(Json(ValidateResponse::ok(result))),
        Err(BulkUploadError::Store(e)) => {
            tracing::error!("Bulk upload validation could not read the catalog: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateResponse::failed(
                    "Error al procesar el archivo Excel",
                )),
            ))
        }
        Err(e) => {
            tracing::warn!("Spreadsheet rejected: {}", e);
            Ok(Json(ValidateResponse::failed(e.to_string())))
        }
    }
}

/// POST /api/u501/bulk-upload/commit
pub async fn commit(
    CurrentUser(claims): CurrentUser,
    Json(request): Json<CommitRequest>,
) -> Result<Json<BulkUploadResult>, (StatusCode, Json<BulkUploadResult>)> {
    let context = authorize(&claims).map_err(|e| {
        (
            StatusCode::FORBIDDEN,
            Json(BulkUploadResult::rejected("auth", e.message)),
        )
    })?;

    tracing::info!(
        "Bulk upload commit of {} products by user {}",
        request.products.len(),
        claims.username
    );
    Ok(Json(
        BULK_UPLOAD_EXECUTOR.commit(&request.products, &context).await,
    ))
}

/// GET /api/u501/bulk-upload/template
pub async fn template() -> Json<TemplateData> {
    Json(u501_bulk_upload::template::template_data())
}

/// POST /api/u501/bulk-upload/error-report
pub async fn error_report(
    Json(errors): Json<Vec<ValidationError>>,
) -> Result<impl IntoResponse, StatusCode> {
    let csv = u501_bulk_upload::report::render_error_report(&errors).map_err(|e| {
        tracing::error!("Failed to render error report: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let file_name = u501_bulk_upload::report::report_file_name(chrono::Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        csv,
    ))
}
