use contracts::usecases::u501_bulk_upload::TemplateData;
use serde_json::{json, Value};

/// Column order of the downloadable template
const TEMPLATE_COLUMNS: [&str; 17] = [
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
];

fn example_rows() -> Vec<Vec<Value>> {
    vec![
        vec![
            json!("Excavadora Hidráulica 320D"), json!("CAT"), json!("320D"), json!("Excavadora"),
            json!(2020), json!(1500), json!(200), json!(9000), json!(35000), json!(20.5), json!(150),
            json!("1.2 m³"), json!("Alcance: 10m|Profundidad: 6.5m"), json!(3), json!("TRUE"),
            json!("Excavadora hidráulica de alto rendimiento para obras medianas y grandes"),
            json!("excavadora-cat-320.jpg"),
        ],
        vec![
            json!("Retroexcavadora Versátil"), json!("JCB"), json!("3CX"), json!("Retroexcavadora"),
            json!(2021), json!(800), json!(120), json!(4800), json!(18000), json!(8.5), json!(92),
            json!("0.25 m³"), json!("Profundidad excavación: 5.5m"), json!(5), json!("TRUE"),
            json!("Retroexcavadora versátil para múltiples trabajos de construcción"),
            json!("retroexcavadora-jcb.jpg"),
        ],
        vec![
            json!("Rodillo Compactador"), json!("Bomag"), json!("BW120"), json!("Compactadora"),
            json!(2019), json!(450), json!(70), json!(2700), json!(10000), json!(2.5), json!(25),
            json!(""), json!("Ancho tambor: 1.2m|Vibración: Si"), json!(2), json!("TRUE"),
            json!("Rodillo compactador vibratorio para suelos y asfalto"), json!(""),
        ],
        vec![
            json!("Grúa Torre Industrial"), json!("Liebherr"), json!("280EC-H"), json!("Grúa"),
            json!(2022), json!(3500), json!(500), json!(21000), json!(80000), json!(45), json!(75),
            json!("12 ton"), json!("Altura máx: 60m|Alcance: 50m"), json!(1), json!("FALSE"),
            json!("Grúa torre para grandes construcciones de edificios"), json!("grua-torre.png"),
        ],
        vec![
            json!("Cargador Frontal"), json!("Komatsu"), json!("WA320"), json!("Cargador"),
            json!(2020), json!(1200), json!(180), json!(7200), json!(28000), json!(15.8), json!(165),
            json!("2.5 m³"), json!("Capacidad cuchara: 2.5m³"), json!(4), json!("TRUE"),
            json!("Cargador frontal de ruedas para movimiento de materiales"),
            json!("cargador-komatsu.jpg"),
        ],
    ]
}

const INSTRUCTIONS: &[&str] = &[
    "INSTRUCCIONES DE USO - CARGA MASIVA DE MAQUINARIA",
    "",
    "=== PASO 1: SUBIR IMÁGENES ===",
    "- Suba primero las imágenes de los productos en la sección \"Subir Imágenes\"",
    "- Anote los nombres exactos de los archivos (son case-sensitive)",
    "- Formatos aceptados: JPG, PNG, GIF, WEBP (máx 5MB por imagen)",
    "",
    "=== PASO 2: COMPLETAR PLANTILLA ===",
    "- Complete la hoja \"Productos\" con los datos de cada máquina",
    "- No modifique los nombres de las columnas de la fila 1",
    "",
    "=== CAMPOS ESENCIALES (REQUERIDOS) ===",
    "- nombre: Nombre comercial del producto (mín 3, máx 100 caracteres)",
    "- marca: Fabricante de la máquina (ej: CAT, Komatsu, JCB, Liebherr, Bobcat)",
    "- modelo: Modelo específico (ej: 320D, PC200, 3CX)",
    "- categoria: Tipo de máquina (ej: Excavadora, Retroexcavadora, Grúa, Cargador)",
    "- anio: Año de fabricación (entre 1980 y año actual + 1)",
    "",
    "=== PRICING (precio_dia REQUERIDO) ===",
    "- precio_dia: Precio de alquiler por día en soles (requerido, > 0)",
    "- precio_hora: Precio por hora (opcional, > 0)",
    "- precio_semana: Precio por semana (opcional, > 0)",
    "- precio_mes: Precio por mes (opcional, > 0)",
    "",
    "=== ESPECIFICACIONES (OPCIONALES) ===",
    "- peso: Peso operativo en toneladas (ej: 20.5 para 20.5 ton)",
    "- potencia: Potencia del motor en HP (ej: 150)",
    "- capacidad: Capacidad de carga o cuchara (ej: \"1.2 m³\" o \"12 ton\")",
    "- especificaciones: Otras especificaciones formato \"Clave: Valor|Clave: Valor\"",
    "",
    "=== CONTROL (stock y disponible REQUERIDOS) ===",
    "- stock: Cantidad de unidades disponibles (número entero >= 0)",
    "- disponible: TRUE si está disponible, FALSE si no (exactamente así)",
    "- descripcion: Descripción detallada del producto (máx 500 caracteres)",
    "",
    "=== IMAGEN (OPCIONAL) ===",
    "- imagen: Nombre EXACTO del archivo de imagen subido previamente (case-sensitive)",
    "",
    "=== DETECCIÓN DE DUPLICADOS ===",
    "- Un producto se considera duplicado si ya existe con misma MARCA + MODELO + CATEGORÍA",
    "- La comparación ignora mayúsculas/minúsculas",
    "- Los duplicados se mostrarán en amarillo pero NO se crearán",
    "",
    "=== LÍMITES ===",
    "- Máximo 500 productos por archivo",
    "- Tamaño máximo del Excel: 5MB",
];

pub fn template_data() -> TemplateData {
    TemplateData {
        headers: TEMPLATE_COLUMNS.iter().map(|h| h.to_string()).collect(),
        examples: example_rows(),
        instructions: INSTRUCTIONS.iter().map(|l| l.to_string()).collect(),
    }
}
