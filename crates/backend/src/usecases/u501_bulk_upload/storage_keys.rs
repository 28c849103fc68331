use std::collections::HashSet;

use contracts::usecases::u501_bulk_upload::ValidatedProduct;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    digits.iter().rev().collect()
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..36)] as char)
        .collect()
}

/// Storage-unique keys for the units created by one commit.
///
/// Placa is `AUTO-<MILLIS>-<XYZ>` in uppercase base36, the model label is
/// `<marca>-<modelo>-<millis>`. Neither takes part in duplicate detection.
#[derive(Default)]
pub struct StorageKeys {
    placas: HashSet<String>,
    labels: HashSet<String>,
}

impl StorageKeys {
    pub fn placa(&mut self, now_millis: u64) -> String {
        let stamp = to_base36(now_millis).to_uppercase();
        loop {
            let placa = format!("AUTO-{}-{}", stamp, random_base36(3).to_uppercase());
            if self.placas.insert(placa.clone()) {
                return placa;
            }
        }
    }

    pub fn model_label(&mut self, marca: &str, modelo: &str, now_millis: u64) -> String {
        let base = format!("{}-{}-{}", marca, modelo, to_base36(now_millis));
        let mut label = base.clone();
        let mut n = 1;
        while !self.labels.insert(label.clone()) {
            n += 1;
            label = format!("{}-{}", base, n);
        }
        label
    }
}

/// Free-text specs plus the weekly/monthly price and commercial name, `|`-joined
pub fn build_specifications(product: &ValidatedProduct) -> String {
    let mut specs = Vec::new();
    if let Some(user_specs) = product.especificaciones.as_deref().filter(|s| !s.is_empty()) {
        specs.push(user_specs.to_string());
    }
    if let Some(semana) = product.precio_semana {
        specs.push(format!("Precio Semana: S/ {}", semana));
    }
    if let Some(mes) = product.precio_mes {
        specs.push(format!("Precio Mes: S/ {}", mes));
    }
    if !product.nombre.is_empty() {
        specs.push(format!("Nombre Comercial: {}", product.nombre));
    }
    specs.join("|")
}
