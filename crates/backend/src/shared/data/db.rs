use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Catalog units. `model_label` and `placa` are the storage-level unique keys;
/// the business identity (marca, modelo, categoria) is deliberately not unique.
const CREATE_VEHICLE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a001_vehicle (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        placa TEXT NOT NULL UNIQUE,
        marca TEXT NOT NULL,
        modelo TEXT NOT NULL,
        model_label TEXT NOT NULL UNIQUE,
        categoria TEXT NOT NULL,
        anio INTEGER NOT NULL,
        precio_dia REAL NOT NULL,
        precio_hora REAL,
        peso REAL,
        potencia REAL,
        capacidad TEXT,
        especificaciones TEXT,
        stock INTEGER NOT NULL DEFAULT 0,
        disponible INTEGER NOT NULL DEFAULT 1,
        descripcion TEXT,
        imagen_url TEXT,
        estado TEXT NOT NULL DEFAULT 'DISPONIBLE',
        owner_id INTEGER,
        created_by INTEGER,
        updated_by INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    );
"#;

const CREATE_VEHICLE_IDENTITY_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_a001_vehicle_identity
        ON a001_vehicle (marca, modelo, categoria);
"#;

const CREATE_AUDIT_LOG_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a002_audit_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tabla TEXT NOT NULL,
        registro_id TEXT NOT NULL,
        operacion TEXT NOT NULL,
        datos_anteriores TEXT,
        datos_nuevos TEXT,
        usuario_id INTEGER,
        usuario_email TEXT,
        comentario TEXT,
        fecha_cambio TEXT NOT NULL
    );
"#;

const CREATE_AUDIT_LOG_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_a002_audit_log_record
        ON a002_audit_log (tabla, registro_id);
"#;

/// Create the tables this service owns when they do not exist yet
pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for sql in [
        CREATE_VEHICLE_TABLE,
        CREATE_VEHICLE_IDENTITY_INDEX,
        CREATE_AUDIT_LOG_TABLE,
        CREATE_AUDIT_LOG_INDEX,
    ] {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

pub fn sqlite_url(db_file: &std::path::Path) -> anyhow::Result<String> {
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

pub async fn initialize_database(db_file: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = sqlite_url(db_file)?;
    tracing::info!("Connecting to database: {}", db_url);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    tracing::info!("Database schema is up to date");

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Single-connection in-memory database with the full schema
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // Every pooled connection would otherwise open its own empty database
    options.max_connections(1).min_connections(1);
    let conn = Database::connect(options).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_for_absolute_path() {
        let url = sqlite_url(std::path::Path::new("/var/lib/app.db")).unwrap();
        assert_eq!(url, "sqlite:///var/lib/app.db?mode=rwc");
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = connect_in_memory().await.unwrap();
        bootstrap_schema(&conn).await.unwrap();

        let tables = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'a00%' ORDER BY name"
                    .to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = tables
            .iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect();
        assert_eq!(names, vec!["a001_vehicle", "a002_audit_log"]);
    }
}
