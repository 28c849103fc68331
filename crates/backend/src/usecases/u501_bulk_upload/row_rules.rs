use std::collections::HashMap;

use contracts::usecases::u501_bulk_upload::{ExcelRow, ValidatedProduct, ValidationError};

pub const MIN_YEAR: i64 = 1980;

/// Over-long values are echoed back shortened to this many characters
const ECHO_CHARS: usize = 50;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn echo(s: &str) -> String {
    if char_len(s) > ECHO_CHARS {
        format!("{}...", s.chars().take(ECHO_CHARS).collect::<String>())
    } else {
        s.to_string()
    }
}

struct RowErrors {
    row_number: u32,
    errors: Vec<ValidationError>,
}

impl RowErrors {
    fn push(&mut self, field: &str, message: impl Into<String>, value: Option<String>) {
        self.errors
            .push(ValidationError::new(self.row_number, field, message, value));
    }

    /// Required text with a character length window
    fn text(
        &mut self,
        field: &str,
        value: &Option<String>,
        min: usize,
        max: Option<usize>,
        required_msg: &str,
        too_long_msg: &str,
    ) {
        match value.as_deref() {
            None => self.push(field, required_msg, Some(String::new())),
            Some(v) if char_len(v) < min => self.push(field, required_msg, Some(v.to_string())),
            Some(v) if max.is_some_and(|m| char_len(v) > m) => {
                self.push(field, too_long_msg, Some(echo(v)))
            }
            Some(_) => {}
        }
    }

    fn max_len(&mut self, field: &str, value: &Option<String>, max: usize, msg: &str) {
        if let Some(v) = value.as_deref() {
            if char_len(v) > max {
                self.push(field, msg, Some(echo(v)));
            }
        }
    }

    fn positive(&mut self, field: &str, value: Option<f64>, msg: &str) {
        if let Some(v) = value {
            if v <= 0.0 {
                self.push(field, msg, Some(v.to_string()));
            }
        }
    }
}

/// Apply every field rule to one row.
///
/// All rules run; a row with any violation yields only errors. `images` maps
/// uploaded file names to their URLs (exact, case-sensitive match).
pub fn validate_row(
    row: &ExcelRow,
    images: &HashMap<&str, &str>,
    current_year: i32,
) -> Result<ValidatedProduct, Vec<ValidationError>> {
    let mut e = RowErrors {
        row_number: row.row_number,
        errors: Vec::new(),
    };
    let max_year = i64::from(current_year) + 1;

    e.text(
        "nombre",
        &row.nombre,
        3,
        Some(100),
        "El nombre es requerido y debe tener al menos 3 caracteres",
        "El nombre no puede exceder 100 caracteres",
    );
    e.text(
        "marca",
        &row.marca,
        2,
        Some(50),
        "La marca es requerida y debe tener al menos 2 caracteres (ej: CAT, Komatsu, JCB)",
        "La marca no puede exceder 50 caracteres",
    );
    e.text(
        "modelo",
        &row.modelo,
        2,
        Some(50),
        "El modelo es requerido y debe tener al menos 2 caracteres (ej: 320D, PC200)",
        "El modelo no puede exceder 50 caracteres",
    );
    e.text(
        "categoria",
        &row.categoria,
        3,
        None,
        "La categoría es requerida y debe tener al menos 3 caracteres (ej: Excavadora, Retroexcavadora)",
        "",
    );

    match row.anio {
        None => e.push(
            "anio",
            "El año de fabricación es requerido y debe ser un número",
            None,
        ),
        Some(y) if !(MIN_YEAR..=max_year).contains(&y) => e.push(
            "anio",
            format!("El año debe estar entre {} y {}", MIN_YEAR, max_year),
            Some(y.to_string()),
        ),
        Some(_) => {}
    }

    match row.precio_dia {
        None => e.push(
            "precio_dia",
            "El precio por día es requerido y debe ser un número",
            None,
        ),
        Some(p) if p <= 0.0 => e.push(
            "precio_dia",
            "El precio por día debe ser mayor a 0",
            Some(p.to_string()),
        ),
        Some(_) => {}
    }
    e.positive("precio_hora", row.precio_hora, "El precio por hora debe ser mayor a 0");
    e.positive(
        "precio_semana",
        row.precio_semana,
        "El precio por semana debe ser mayor a 0",
    );
    e.positive("precio_mes", row.precio_mes, "El precio por mes debe ser mayor a 0");

    e.positive("peso", row.peso, "El peso (toneladas) debe ser mayor a 0");
    e.positive("potencia", row.potencia, "La potencia (HP) debe ser mayor a 0");
    e.max_len(
        "capacidad",
        &row.capacidad,
        100,
        "La capacidad no puede exceder 100 caracteres",
    );

    let stock = match row.stock {
        None => {
            e.push(
                "stock",
                "El stock es requerido y debe ser un número entero",
                None,
            );
            None
        }
        Some(s) if s < 0 => {
            e.push("stock", "El stock no puede ser negativo", Some(s.to_string()));
            None
        }
        Some(s) => match i32::try_from(s) {
            Ok(s) => Some(s),
            Err(_) => {
                e.push(
                    "stock",
                    "El stock es requerido y debe ser un número entero",
                    Some(s.to_string()),
                );
                None
            }
        },
    };

    if row.disponible.is_none() {
        e.push(
            "disponible",
            "El campo disponible es requerido (TRUE o FALSE)",
            Some(String::new()),
        );
    }

    e.max_len(
        "descripcion",
        &row.descripcion,
        500,
        "La descripción no puede exceder 500 caracteres",
    );

    let mut imagen_url = None;
    if let Some(imagen) = row.imagen.as_deref().filter(|s| !s.is_empty()) {
        match images.get(imagen) {
            Some(url) => imagen_url = Some(url.to_string()),
            None => e.push(
                "imagen",
                format!(
                    "La imagen \"{}\" no fue subida. Verifique el nombre exacto (case-sensitive)",
                    imagen
                ),
                Some(imagen.to_string()),
            ),
        }
    }

    if !e.errors.is_empty() {
        return Err(e.errors);
    }

    // Every required field is present once no rule fired
    match (
        &row.nombre,
        &row.marca,
        &row.modelo,
        &row.categoria,
        row.anio.and_then(|y| i32::try_from(y).ok()),
        row.precio_dia,
        stock,
        row.disponible,
    ) {
        (
            Some(nombre),
            Some(marca),
            Some(modelo),
            Some(categoria),
            Some(anio),
            Some(precio_dia),
            Some(stock),
            Some(disponible),
        ) => Ok(ValidatedProduct {
            row_number: row.row_number,
            nombre: nombre.clone(),
            marca: marca.clone(),
            modelo: modelo.clone(),
            categoria: categoria.clone(),
            anio,
            precio_dia,
            precio_hora: row.precio_hora,
            precio_semana: row.precio_semana,
            precio_mes: row.precio_mes,
            peso: row.peso,
            potencia: row.potencia,
            capacidad: row.capacidad.clone(),
            especificaciones: row.especificaciones.clone(),
            stock,
            disponible,
            descripcion: row.descripcion.clone(),
            imagen: row.imagen.clone(),
            imagen_url,
        }),
        _ => Err(vec![ValidationError::new(
            row.row_number,
            "fila",
            "Fila incompleta",
            None,
        )]),
    }
}
