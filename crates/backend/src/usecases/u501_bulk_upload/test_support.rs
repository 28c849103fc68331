//! In-memory workbooks and collaborator fakes shared by the u501 tests

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use contracts::domain::a001_vehicle::{NewVehicle, Vehicle, VehicleIdentity};
use contracts::domain::a002_audit_log::AuditContext;
use contracts::domain::common::EntityMetadata;
use contracts::usecases::u501_bulk_upload::ExcelRow;
use zip::write::SimpleFileOptions;

use super::ports::{AuditSink, ProductStore};

/// Test cell
#[derive(Debug, Clone)]
pub enum C {
    S(&'static str),
    N(f64),
    B(bool),
    E,
}

/// Every known column in template order
pub fn header_row() -> Vec<C> {
    [
        "nombre",
        "marca",
        "modelo",
        "categoria",
        "anio",
        "precio_dia",
        "precio_hora",
        "precio_semana",
        "precio_mes",
        "peso",
        "potencia",
        "capacidad",
        "especificaciones",
        "stock",
        "disponible",
        "descripcion",
        "imagen",
    ]
    .into_iter()
    .map(C::S)
    .collect()
}

/// Single-sheet workbook named "Productos"
pub fn xlsx(rows: Vec<Vec<C>>) -> Vec<u8> {
    xlsx_with_sheets(vec![("Productos", rows)])
}

pub fn xlsx_with_sheets(sheets: Vec<(&str, Vec<Vec<C>>)>) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let mut overrides = String::new();
    let mut sheet_entries = String::new();
    let mut relationships = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(name)
        ));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let files = vec![
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
            ),
        ),
    ];

    for (path, body) in files {
        zip.start_file(path, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    for (i, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(sheet_xml(rows).as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn sheet_xml(rows: &[Vec<C>]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let r = r + 1;
        let cells: String = row
            .iter()
            .enumerate()
            .filter_map(|(c, cell)| {
                let reference = format!("{}{}", column_letters(c), r);
                match cell {
                    C::S(text) => Some(format!(
                        r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        escape(text)
                    )),
                    C::N(value) => Some(format!(r#"<c r="{reference}"><v>{value}</v></c>"#)),
                    C::B(value) => Some(format!(
                        r#"<c r="{reference}" t="b"><v>{}</v></c>"#,
                        u8::from(*value)
                    )),
                    C::E => None,
                }
            })
            .collect();
        if !cells.is_empty() {
            data.push_str(&format!(r#"<row r="{r}">{cells}</row>"#));
        }
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Row that passes every rule
pub fn valid_row(row_number: u32, marca: &str, modelo: &str, categoria: &str) -> ExcelRow {
    ExcelRow {
        row_number,
        nombre: Some(format!("{} {} {}", categoria, marca, modelo)),
        marca: Some(marca.to_string()),
        modelo: Some(modelo.to_string()),
        categoria: Some(categoria.to_string()),
        anio: Some(2020),
        precio_dia: Some(1500.0),
        precio_hora: Some(200.0),
        precio_semana: None,
        precio_mes: None,
        peso: Some(20.5),
        potencia: Some(150.0),
        capacidad: Some("1.2 m³".to_string()),
        especificaciones: None,
        stock: Some(3),
        disponible: Some(true),
        descripcion: None,
        imagen: None,
    }
}

/// Product store kept in memory. Creating a unit whose `modelo` is listed in
/// `failing_models` fails.
#[derive(Default)]
pub struct FakeStore {
    pub identities: Vec<VehicleIdentity>,
    pub created: Mutex<Vec<NewVehicle>>,
    pub failing_models: HashSet<String>,
    pub unavailable: bool,
}

impl FakeStore {
    pub fn with_identities(identities: Vec<VehicleIdentity>) -> Self {
        Self {
            identities,
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<NewVehicle> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductStore for FakeStore {
    async fn list_identities(&self) -> anyhow::Result<Vec<VehicleIdentity>> {
        if self.unavailable {
            anyhow::bail!("database is locked");
        }
        Ok(self.identities.clone())
    }

    async fn create(&self, vehicle: &NewVehicle) -> anyhow::Result<Vehicle> {
        if self.failing_models.contains(&vehicle.modelo) {
            anyhow::bail!("UNIQUE constraint failed: a001_vehicle.placa");
        }

        let mut created = self.created.lock().unwrap();
        created.push(vehicle.clone());
        let id = 100 + created.len() as i64;
        Ok(Vehicle {
            id,
            placa: vehicle.placa.clone(),
            marca: vehicle.marca.clone(),
            modelo: vehicle.modelo.clone(),
            model_label: vehicle.model_label.clone(),
            categoria: vehicle.categoria.clone(),
            anio: vehicle.anio,
            precio_dia: vehicle.precio_dia,
            precio_hora: vehicle.precio_hora,
            peso: vehicle.peso,
            potencia: vehicle.potencia,
            capacidad: vehicle.capacidad.clone(),
            especificaciones: vehicle.especificaciones.clone(),
            stock: vehicle.stock,
            disponible: vehicle.disponible,
            descripcion: vehicle.descripcion.clone(),
            imagen_url: vehicle.imagen_url.clone(),
            estado: vehicle.estado,
            owner_id: vehicle.owner_id,
            metadata: EntityMetadata::new(vehicle.created_by),
        })
    }
}

/// Captured `record_create` call
#[derive(Debug, Clone)]
pub struct RecordedAudit {
    pub entity: String,
    pub id: i64,
    pub comment: String,
    pub context: AuditContext,
}

#[derive(Default)]
pub struct FakeAudit {
    pub records: Mutex<Vec<RecordedAudit>>,
    pub broken: bool,
}

impl FakeAudit {
    pub fn records(&self) -> Vec<RecordedAudit> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for FakeAudit {
    async fn record_create(
        &self,
        entity: &str,
        id: i64,
        _snapshot: &serde_json::Value,
        comment: &str,
        context: &AuditContext,
    ) -> anyhow::Result<()> {
        if self.broken {
            anyhow::bail!("audit table unavailable");
        }
        self.records.lock().unwrap().push(RecordedAudit {
            entity: entity.to_string(),
            id,
            comment: comment.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}
