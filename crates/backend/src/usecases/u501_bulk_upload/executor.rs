use std::collections::HashMap;
use std::sync::Arc;

use chrono::Datelike;
use contracts::domain::a001_vehicle::{NewVehicle, VehicleIdentity, VehicleStatus};
use contracts::domain::a002_audit_log::AuditContext;
use contracts::system::auth::TokenClaims;
use contracts::usecases::common::{UseCaseError, UseCaseMetadata};
use contracts::usecases::u501_bulk_upload::{
    BulkUpload, BulkUploadResult, DuplicateProduct, ExcelRow, UploadedImage, ValidatedProduct,
    ValidationError, ValidationResult,
};

use super::duplicates::{DuplicateCheck, DuplicateResolver};
use super::error::BulkUploadError;
use super::images::image_lookup;
use super::ports::{AuditSink, ProductStore};
use super::row_rules::validate_row;
use super::spreadsheet::{check_file, parse_workbook, SpreadsheetUpload};
use super::storage_keys::{build_specifications, StorageKeys};
use crate::shared::config::BulkUploadConfig;

pub const AUDIT_ENTITY: &str = crate::domain::a001_vehicle::service::ENTITY_NAME;
pub const AUDIT_COMMENT: &str = "Carga masiva de productos";

/// Admin gate shared by every bulk-upload operation
pub fn authorize(claims: &TokenClaims) -> Result<AuditContext, UseCaseError> {
    if !claims.is_admin() {
        return Err(UseCaseError::unauthorized("Solo administradores"));
    }
    Ok(AuditContext {
        user_id: claims.user_id(),
        user_email: claims.email.clone(),
        comment: Some(AUDIT_COMMENT.to_string()),
    })
}

/// Partition parsed rows into create / duplicate / error.
///
/// Per row: field rules, then the database check, then the in-file check.
/// A repeat inside the file is an error; a database match is a duplicate.
pub fn classify_rows(
    rows: &[ExcelRow],
    images: &HashMap<&str, &str>,
    identities: &[VehicleIdentity],
    current_year: i32,
) -> ValidationResult {
    let mut resolver = DuplicateResolver::new(identities);
    let mut result = ValidationResult::default();

    for row in rows {
        let product = match validate_row(row, images, current_year) {
            Ok(product) => product,
            Err(errors) => {
                result.errors.extend(errors);
                continue;
            }
        };

        match resolver.check(&product.marca, &product.modelo, &product.categoria) {
            DuplicateCheck::Existing(existing_id) => result.duplicates.push(DuplicateProduct {
                row_number: product.row_number,
                nombre: product.nombre,
                categoria: product.categoria,
                existing_id,
            }),
            DuplicateCheck::RepeatedInFile => result.errors.push(ValidationError::new(
                product.row_number,
                "modelo",
                "Este producto (misma marca, modelo y categoría) está duplicado dentro del mismo archivo",
                Some(format!(
                    "{} {} - {}",
                    product.marca, product.modelo, product.categoria
                )),
            )),
            DuplicateCheck::Unique => result.to_create.push(product),
        }
    }

    result
}

/// Values to persist for one accepted row
fn new_vehicle(
    product: &ValidatedProduct,
    keys: &mut StorageKeys,
    context: &AuditContext,
    now_millis: u64,
) -> NewVehicle {
    NewVehicle {
        placa: keys.placa(now_millis),
        marca: product.marca.clone(),
        modelo: product.modelo.clone(),
        model_label: keys.model_label(&product.marca, &product.modelo, now_millis),
        categoria: product.categoria.clone(),
        anio: product.anio,
        precio_dia: product.precio_dia,
        precio_hora: product.precio_hora,
        peso: product.peso,
        potencia: product.potencia,
        capacidad: product.capacidad.clone(),
        especificaciones: Some(build_specifications(product)),
        stock: product.stock,
        disponible: product.disponible,
        descripcion: product.descripcion.clone(),
        imagen_url: product.imagen_url.clone(),
        estado: VehicleStatus::for_availability(product.disponible),
        owner_id: context.user_id,
        created_by: context.user_id,
    }
}

/// Validate (preview) and commit for the bulk catalog upload
pub struct BulkUploadExecutor {
    store: Arc<dyn ProductStore>,
    audit: Arc<dyn AuditSink>,
    limits: BulkUploadConfig,
}

impl BulkUploadExecutor {
    pub fn new(
        store: Arc<dyn ProductStore>,
        audit: Arc<dyn AuditSink>,
        limits: BulkUploadConfig,
    ) -> Self {
        Self {
            store,
            audit,
            limits,
        }
    }

    /// Check, parse and classify a spreadsheet. Reads the catalog, never writes it.
    pub async fn validate(
        &self,
        upload: SpreadsheetUpload,
        images: &[UploadedImage],
    ) -> Result<ValidationResult, BulkUploadError> {
        let started = std::time::Instant::now();
        check_file(&upload, &self.limits)?;

        let file_name = upload.file_name;
        let rows = parse_workbook(upload.bytes, self.limits.max_rows)?;
        tracing::info!("Parsed {} rows from {}", rows.len(), file_name);

        let lookup = image_lookup(images);
        let identities = self
            .store
            .list_identities()
            .await
            .map_err(BulkUploadError::Store)?;

        let current_year = chrono::Utc::now().year();
        let result = classify_rows(&rows, &lookup, &identities, current_year);

        tracing::info!(
            "[{}] validated {}: {} to create, {} duplicates, {} errors in {:.2?}",
            BulkUpload::full_name(),
            file_name,
            result.to_create.len(),
            result.duplicates.len(),
            result.errors.len(),
            started.elapsed()
        );
        Ok(result)
    }

    /// Create every accepted row on its own. One failing row never stops the rest.
    pub async fn commit(
        &self,
        products: &[ValidatedProduct],
        context: &AuditContext,
    ) -> BulkUploadResult {
        if products.is_empty() {
            return BulkUploadResult::rejected("products", "No hay productos para crear");
        }
        if products.len() > self.limits.max_rows {
            return BulkUploadResult::rejected(
                "products",
                format!("Máximo {} productos por carga", self.limits.max_rows),
            );
        }

        let started = std::time::Instant::now();
        let batch_size = self.limits.batch_size.max(1);
        let total_batches = products.len().div_ceil(batch_size);
        let mut keys = StorageKeys::default();
        let mut created_ids = Vec::new();
        let mut error_details = Vec::new();

        for (batch_index, batch) in products.chunks(batch_size).enumerate() {
            for product in batch {
                let now_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
                let vehicle = new_vehicle(product, &mut keys, context, now_millis);

                match self.store.create(&vehicle).await {
                    Ok(created) => {
                        self.audit_created(product, &created, context).await;
                        created_ids.push(created.id);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to create product from row {}: {}",
                            product.row_number,
                            e
                        );
                        error_details.push(ValidationError::new(
                            product.row_number,
                            "create",
                            e.to_string(),
                            Some(product.nombre.clone()),
                        ));
                    }
                }
            }
            tracing::info!(
                "Batch {}/{} done: {} created, {} failed so far",
                batch_index + 1,
                total_batches,
                created_ids.len(),
                error_details.len()
            );
        }

        tracing::info!(
            "[{}] committed {} products ({} failed) in {:.2?}",
            BulkUpload::full_name(),
            created_ids.len(),
            error_details.len(),
            started.elapsed()
        );

        BulkUploadResult {
            success: error_details.is_empty(),
            created: created_ids.len(),
            duplicates_skipped: 0,
            errors: error_details.len(),
            created_ids,
            error_details: if error_details.is_empty() {
                None
            } else {
                Some(error_details)
            },
        }
    }

    async fn audit_created(
        &self,
        product: &ValidatedProduct,
        created: &contracts::domain::a001_vehicle::Vehicle,
        context: &AuditContext,
    ) {
        let snapshot = match serde_json::to_value(created) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Could not snapshot vehicle {} for audit: {}", created.id, e);
                return;
            }
        };
        let comment = format!(
            "Producto creado vía carga masiva: {} {} ({})",
            product.marca, product.modelo, product.categoria
        );
        if let Err(e) = self
            .audit
            .record_create(AUDIT_ENTITY, created.id, &snapshot, &comment, context)
            .await
        {
            tracing::warn!("Audit record for vehicle {} failed: {}", created.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_bulk_upload::test_support::{
        header_row, valid_row, xlsx, FakeAudit, FakeStore, C,
    };

    const YEAR: i32 = 2025;

    fn identity(id: i64, marca: &str, modelo: &str, categoria: &str) -> VehicleIdentity {
        VehicleIdentity {
            id,
            marca: marca.into(),
            modelo: modelo.into(),
            categoria: categoria.into(),
        }
    }

    fn admin_context() -> AuditContext {
        AuditContext {
            user_id: Some(5),
            user_email: Some("admin@example.com".into()),
            comment: Some(AUDIT_COMMENT.into()),
        }
    }

    fn executor(store: Arc<FakeStore>, audit: Arc<FakeAudit>) -> BulkUploadExecutor {
        BulkUploadExecutor::new(store, audit, BulkUploadConfig::default())
    }

    fn sheet(rows: Vec<Vec<C>>) -> SpreadsheetUpload {
        SpreadsheetUpload {
            file_name: "productos.xlsx".into(),
            content_type: None,
            bytes: xlsx(rows),
        }
    }

    fn sheet_row(marca: &'static str, modelo: &'static str, precio_dia: Option<f64>) -> Vec<C> {
        vec![
            C::S("Excavadora Hidráulica"),
            C::S(marca),
            C::S(modelo),
            C::S("Excavadora"),
            C::N(2020.0),
            precio_dia.map(C::N).unwrap_or(C::E),
            C::E,
            C::E,
            C::E,
            C::E,
            C::E,
            C::E,
            C::E,
            C::N(3.0),
            C::S("TRUE"),
            C::E,
            C::E,
        ]
    }

    fn products(n: u32) -> Vec<ValidatedProduct> {
        let images = HashMap::new();
        (0..n)
            .map(|i| {
                let modelo = format!("M{}", i + 1);
                validate_row(&valid_row(i + 2, "CAT", &modelo, "Excavadora"), &images, YEAR)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_partition_is_complete_and_ordered() {
        let mut bad = valid_row(4, "JCB", "3CX", "Retroexcavadora");
        bad.stock = None;
        bad.nombre = None;
        let rows = vec![
            valid_row(2, "CAT", "320D", "Excavadora"),
            valid_row(3, "Komatsu", "PC200", "Excavadora"),
            bad,
            valid_row(5, "cat", "320d", "excavadora"),
            valid_row(6, "Bomag", "BW120", "Compactadora"),
            valid_row(7, "komatsu", "pc200", "EXCAVADORA"),
        ];
        let result = classify_rows(
            &rows,
            &HashMap::new(),
            &[identity(11, "Komatsu", "PC200", "Excavadora")],
            YEAR,
        );

        let created: Vec<u32> = result.to_create.iter().map(|p| p.row_number).collect();
        let duplicates: Vec<u32> = result.duplicates.iter().map(|d| d.row_number).collect();
        let errors: Vec<(u32, &str)> = result
            .errors
            .iter()
            .map(|e| (e.row_number, e.field.as_str()))
            .collect();

        assert_eq!(created, vec![2, 6]);
        assert_eq!(duplicates, vec![3, 7]);
        assert_eq!(errors, vec![(4, "nombre"), (4, "stock"), (5, "modelo")]);
        assert_eq!(result.row_count(), rows.len());
        assert!(result.duplicates.iter().all(|d| d.existing_id == 11));
    }

    #[test]
    fn test_in_file_repeat_is_error_with_identity_value() {
        let rows = vec![
            valid_row(2, "CAT", "320D", "Excavadora"),
            valid_row(3, " Cat ", "320D", "Excavadora"),
        ];
        let result = classify_rows(&rows, &HashMap::new(), &[], YEAR);
        assert_eq!(result.to_create.len(), 1);
        assert!(result.duplicates.is_empty());
        assert_eq!(result.errors[0].row_number, 3);
        assert_eq!(result.errors[0].field, "modelo");
        assert_eq!(
            result.errors[0].value.as_deref(),
            Some(" Cat  320D - Excavadora")
        );
    }

    #[test]
    fn test_rows_with_errors_do_not_claim_identity() {
        let mut first = valid_row(2, "CAT", "320D", "Excavadora");
        first.precio_dia = Some(-1.0);
        let rows = vec![first, valid_row(3, "CAT", "320D", "Excavadora")];
        let result = classify_rows(&rows, &HashMap::new(), &[], YEAR);
        assert_eq!(result.to_create.len(), 1);
        assert_eq!(result.to_create[0].row_number, 3);
    }

    #[tokio::test]
    async fn test_validate_scenario_batch_repeat_and_missing_price() {
        let store = Arc::new(FakeStore::default());
        let exec = executor(store.clone(), Arc::new(FakeAudit::default()));

        let upload = sheet(vec![
            header_row(),
            sheet_row("CAT", "320D", Some(1500.0)),
            sheet_row("cat", "320d", Some(1500.0)),
            sheet_row("Komatsu", "PC200", None),
        ]);
        let result = exec.validate(upload, &[]).await.unwrap();

        assert_eq!(result.to_create.len(), 1);
        assert_eq!(result.to_create[0].row_number, 2);
        assert!(result.duplicates.is_empty());
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].row_number, 3);
        assert_eq!(result.errors[1].row_number, 4);
        assert_eq!(result.errors[1].field, "precio_dia");
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn test_validate_scenario_existing_product() {
        let store = Arc::new(FakeStore::with_identities(vec![identity(
            77,
            " cat",
            "320D ",
            "EXCAVADORA",
        )]));
        let exec = executor(store, Arc::new(FakeAudit::default()));

        let upload = sheet(vec![header_row(), sheet_row("CAT", "320D", Some(1500.0))]);
        let result = exec.validate(upload, &[]).await.unwrap();

        assert!(result.to_create.is_empty());
        assert_eq!(
            result.duplicates,
            vec![DuplicateProduct {
                row_number: 2,
                nombre: "Excavadora Hidráulica".into(),
                categoria: "Excavadora".into(),
                existing_id: 77,
            }]
        );
    }

    #[tokio::test]
    async fn test_validate_resolves_uploaded_images() {
        let exec = executor(Arc::new(FakeStore::default()), Arc::new(FakeAudit::default()));
        let mut with_image = sheet_row("CAT", "320D", Some(1500.0));
        with_image[16] = C::S("foo.jpg");
        let mut missing_image = sheet_row("JCB", "3CX", Some(800.0));
        missing_image[16] = C::S("bar.jpg");

        let images = vec![UploadedImage {
            file_name: "foo.jpg".into(),
            url: "https://x/foo.jpg".into(),
            size: 10,
        }];
        let result = exec
            .validate(sheet(vec![header_row(), with_image, missing_image]), &images)
            .await
            .unwrap();

        assert_eq!(result.to_create.len(), 1);
        assert_eq!(
            result.to_create[0].imagen_url.as_deref(),
            Some("https://x/foo.jpg")
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "imagen");
        assert_eq!(result.errors[0].row_number, 3);
    }

    #[tokio::test]
    async fn test_validate_rejects_501_rows() {
        let exec = executor(Arc::new(FakeStore::default()), Arc::new(FakeAudit::default()));
        let mut rows = vec![header_row()];
        for _ in 0..501 {
            rows.push(sheet_row("CAT", "320D", Some(1500.0)));
        }
        let err = exec.validate(sheet(rows), &[]).await.unwrap_err();
        assert!(matches!(err, BulkUploadError::TooManyRows { found: 501, max: 500 }));
    }

    #[tokio::test]
    async fn test_validate_rejects_wrong_file_type_before_parsing() {
        let exec = executor(Arc::new(FakeStore::default()), Arc::new(FakeAudit::default()));
        let upload = SpreadsheetUpload {
            file_name: "productos.csv".into(),
            content_type: Some("text/csv".into()),
            bytes: b"nombre,marca".to_vec(),
        };
        assert!(matches!(
            exec.validate(upload, &[]).await,
            Err(BulkUploadError::InvalidFileType)
        ));
    }

    #[tokio::test]
    async fn test_validate_aborts_when_store_unavailable() {
        let store = Arc::new(FakeStore {
            unavailable: true,
            ..Default::default()
        });
        let exec = executor(store, Arc::new(FakeAudit::default()));
        let upload = sheet(vec![header_row(), sheet_row("CAT", "320D", Some(1500.0))]);
        assert!(matches!(
            exec.validate(upload, &[]).await,
            Err(BulkUploadError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_commit_isolates_failing_row() {
        let store = Arc::new(FakeStore {
            failing_models: ["M3".to_string()].into_iter().collect(),
            ..Default::default()
        });
        let audit = Arc::new(FakeAudit::default());
        let exec = BulkUploadExecutor::new(
            store.clone(),
            audit.clone(),
            BulkUploadConfig {
                batch_size: 2,
                ..Default::default()
            },
        );

        let result = exec.commit(&products(5), &admin_context()).await;

        assert!(!result.success);
        assert_eq!(result.created, 4);
        assert_eq!(result.errors, 1);
        assert_eq!(result.created_ids, vec![101, 102, 103, 104]);
        let details = result.error_details.unwrap();
        assert_eq!(details[0].row_number, 4);
        assert_eq!(details[0].field, "create");
        assert_eq!(details[0].value.as_deref(), Some("Excavadora CAT M3"));

        let created: Vec<String> = store.created().iter().map(|v| v.modelo.clone()).collect();
        assert_eq!(created, vec!["M1", "M2", "M4", "M5"]);
        assert_eq!(audit.records().len(), 4);
    }

    #[tokio::test]
    async fn test_commit_fills_storage_fields() {
        let store = Arc::new(FakeStore::default());
        let audit = Arc::new(FakeAudit::default());
        let exec = executor(store.clone(), audit.clone());

        let mut items = products(2);
        items[1].disponible = false;
        items[1].precio_semana = Some(4800.0);
        let result = exec.commit(&items, &admin_context()).await;
        assert!(result.success);
        assert_eq!(result.error_details, None);

        let created = store.created();
        assert_eq!(created[0].estado, VehicleStatus::Disponible);
        assert_eq!(created[1].estado, VehicleStatus::FueraServicio);
        assert_eq!(created[0].modelo, "M1");
        assert!(created[0].model_label.starts_with("CAT-M1-"));
        assert!(created[0].placa.starts_with("AUTO-"));
        assert_ne!(created[0].placa, created[1].placa);
        assert_eq!(created[0].owner_id, Some(5));
        assert_eq!(created[0].created_by, Some(5));
        assert_eq!(
            created[1].especificaciones.as_deref(),
            Some("Precio Semana: S/ 4800|Nombre Comercial: Excavadora CAT M2")
        );

        let records = audit.records();
        assert_eq!(records[0].entity, AUDIT_ENTITY);
        assert_eq!(records[0].id, 101);
        assert_eq!(
            records[0].comment,
            "Producto creado vía carga masiva: CAT M1 (Excavadora)"
        );
        assert_eq!(records[0].context.user_email.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_commit_survives_audit_failures() {
        let store = Arc::new(FakeStore::default());
        let audit = Arc::new(FakeAudit {
            broken: true,
            ..Default::default()
        });
        let exec = executor(store, audit);
        let result = exec.commit(&products(3), &admin_context()).await;
        assert!(result.success);
        assert_eq!(result.created, 3);
    }

    #[tokio::test]
    async fn test_commit_rejects_empty_and_oversized_input() {
        let store = Arc::new(FakeStore::default());
        let exec = BulkUploadExecutor::new(
            store.clone(),
            Arc::new(FakeAudit::default()),
            BulkUploadConfig {
                max_rows: 2,
                ..Default::default()
            },
        );

        let empty = exec.commit(&[], &admin_context()).await;
        assert!(!empty.success);
        assert_eq!(empty.errors, 1);
        assert_eq!(empty.error_details.unwrap()[0].field, "products");

        let too_many = exec.commit(&products(3), &admin_context()).await;
        assert!(!too_many.success);
        assert_eq!(too_many.created, 0);
        assert!(store.created().is_empty());
    }

    #[test]
    fn test_authorize_requires_admin_role() {
        let mut claims = TokenClaims {
            sub: "5".into(),
            username: "ops".into(),
            email: Some("ops@example.com".into()),
            rol: Some("CLIENTE".into()),
            exp: 0,
            iat: 0,
        };
        let err = authorize(&claims).unwrap_err();
        assert_eq!(err.code, "UNAUTHORIZED");

        claims.rol = Some("Administrador".into());
        let ctx = authorize(&claims).unwrap();
        assert_eq!(ctx.user_id, Some(5));
        assert_eq!(ctx.user_email.as_deref(), Some("ops@example.com"));
        assert_eq!(ctx.comment.as_deref(), Some(AUDIT_COMMENT));
    }
}
