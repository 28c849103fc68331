use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use contracts::usecases::u501_bulk_upload::{ImageUploadResponse, UploadedImage};
use uuid::Uuid;

use super::ports::ImageStorage;
use crate::shared::config::BulkUploadConfig;

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Folder under the upload root for bulk-upload images
pub const IMAGE_FOLDER: &str = "carga-masiva";

/// One file from the images multipart field
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// `fileName → url` as seen by the rows of one spreadsheet.
/// On repeated file names the last upload wins.
pub fn image_lookup(images: &[UploadedImage]) -> HashMap<&str, &str> {
    images
        .iter()
        .map(|img| (img.file_name.as_str(), img.url.as_str()))
        .collect()
}

fn check_image(image: &IncomingImage, limits: &BulkUploadConfig) -> Result<(), String> {
    let type_ok = image
        .content_type
        .as_deref()
        .map(|ct| ALLOWED_IMAGE_TYPES.contains(&ct))
        .unwrap_or(false);
    if !type_ok {
        return Err("Tipo de archivo no válido. Use JPG, PNG, GIF o WebP.".into());
    }
    if image.bytes.len() as u64 > limits.max_image_bytes {
        return Err(format!(
            "El archivo es demasiado grande. Máximo {}.",
            crate::shared::format::format_bytes(limits.max_image_bytes)
        ));
    }
    Ok(())
}

/// Storage key `carga-masiva/<millis>-<random>.<ext>`
pub fn storage_key(file_name: &str, now_millis: i64) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    let random = Uuid::new_v4().simple().to_string();
    format!("{}/{}-{}.{}", IMAGE_FOLDER, now_millis, &random[..8], extension)
}

/// Accepts raw images, checks them and hands them to storage
pub struct ImageRegistry {
    storage: Arc<dyn ImageStorage>,
    limits: BulkUploadConfig,
}

impl ImageRegistry {
    pub fn new(storage: Arc<dyn ImageStorage>, limits: BulkUploadConfig) -> Self {
        Self { storage, limits }
    }

    pub async fn upload(&self, files: Vec<IncomingImage>) -> ImageUploadResponse {
        if files.is_empty() {
            return ImageUploadResponse::failed("No se recibieron imágenes");
        }
        if files.len() > self.limits.max_images {
            return ImageUploadResponse::failed(format!(
                "Máximo {} imágenes por carga",
                self.limits.max_images
            ));
        }

        let mut uploaded = Vec::new();
        let mut errors = Vec::new();

        for file in files {
            if let Err(e) = check_image(&file, &self.limits) {
                errors.push(format!("{}: {}", file.file_name, e));
                continue;
            }

            let key = storage_key(&file.file_name, chrono::Utc::now().timestamp_millis());
            match self.storage.store(&key, &file.bytes).await {
                Ok(url) => uploaded.push(UploadedImage {
                    file_name: file.file_name,
                    url,
                    size: file.bytes.len() as u64,
                }),
                Err(e) => {
                    tracing::error!("Failed to store image {}: {}", file.file_name, e);
                    errors.push(format!("{}: {}", file.file_name, e));
                }
            }
        }

        tracing::info!(
            "Image upload finished: {} stored, {} rejected",
            uploaded.len(),
            errors.len()
        );

        if uploaded.is_empty() && !errors.is_empty() {
            return ImageUploadResponse::failed(format!(
                "No se pudo subir ninguna imagen. Errores: {}",
                errors.join(", ")
            ));
        }

        ImageUploadResponse {
            success: true,
            images: Some(uploaded),
            error: if errors.is_empty() {
                None
            } else {
                Some(format!("Algunas imágenes fallaron: {}", errors.join(", ")))
            },
        }
    }
}

/// Writes images under a local directory served as static files
pub struct LocalImageStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(&self, key: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        ))
    }
}
