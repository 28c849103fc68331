use chrono::NaiveDate;
use contracts::usecases::u501_bulk_upload::ValidationError;

/// Download name for the error report of a given day
pub fn report_file_name(date: NaiveDate) -> String {
    format!("errores_carga_{}.csv", date.format("%Y-%m-%d"))
}

/// CSV with one line per error: `Fila,Campo,Error,Valor`
pub fn render_error_report(errors: &[ValidationError]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Fila", "Campo", "Error", "Valor"])?;
    for error in errors {
        writer.write_record([
            error.row_number.to_string().as_str(),
            error.field.as_str(),
            error.message.as_str(),
            error.value.as_deref().unwrap_or(""),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush error report: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(report_file_name(date), "errores_carga_2024-03-09.csv");
    }

    #[test]
    fn test_report_quotes_embedded_separators() {
        let errors = vec![
            ValidationError::new(3, "modelo", "Duplicado, misma marca", Some("CAT 320D - \"Excavadora\"".into())),
            ValidationError::new(4, "precio_dia", "El precio por día es requerido y debe ser un número", None),
        ];
        let csv = String::from_utf8(render_error_report(&errors).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Fila,Campo,Error,Valor");
        assert_eq!(
            lines[1],
            "3,modelo,\"Duplicado, misma marca\",\"CAT 320D - \"\"Excavadora\"\"\""
        );
        assert_eq!(
            lines[2],
            "4,precio_dia,El precio por día es requerido y debe ser un número,"
        );
    }
}
