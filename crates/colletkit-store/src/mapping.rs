//! Row mapping for the hosted tables
//!
//! The `bits` and `collets` tables use snake_case columns and are loosely
//! typed: numbers may come back as strings, nullable columns as `null`.
//! Rows are read from `serde_json::Value` so one bad column never loses
//! the whole record.

use colletkit_core::{Bit, BitPatch, Collet, NewBit, NewCollet, ShankDiameter};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Hyphenated UUID, the id format of rows in the hosted tables
pub fn is_valid_uuid(id: &str) -> bool {
    id.len() == 36 && uuid::Uuid::try_parse(id).is_ok()
}

fn text(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn optional_text(row: &Value, key: &str) -> Option<String> {
    Some(text(row, key)).filter(|s| !s.is_empty())
}

fn count(row: &Value, key: &str) -> u32 {
    let value = match row.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() && value > 0.0 {
        value as u32
    } else {
        0
    }
}

fn flag(row: &Value, key: &str) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

fn nested<T: serde::de::DeserializeOwned + Default>(row: &Value, key: &str) -> T {
    match row.get(key) {
        Some(value) if !value.is_null() => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::debug!("Ignoring malformed '{}' column: {}", key, e);
            T::default()
        }),
        _ => T::default(),
    }
}

/// Shank diameter column: `diam_haste` first, then the legacy `collet_size`
fn shank_from_row(row: &Value) -> ShankDiameter {
    match row.get("diam_haste") {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(ShankDiameter::Number)
            .unwrap_or_default(),
        Some(Value::String(s)) => ShankDiameter::Text(s.clone()),
        Some(Value::Null) | None => ShankDiameter::Text(text(row, "collet_size")),
        Some(other) => ShankDiameter::Text(other.to_string()),
    }
}

/// Map a `bits` row
pub fn bit_from_row(row: &Value) -> Bit {
    Bit {
        id: text(row, "id"),
        name: text(row, "name"),
        tool_type: text(row, "type"),
        diameter: text(row, "diameter"),
        image_url: optional_text(row, "image_url"),
        stock: count(row, "stock"),
        min_stock: count(row, "min_stock"),
        material: text(row, "material"),
        shank_diameter: shank_from_row(row),
        recommended_collet: optional_text(row, "pinca_recomendada"),
        has_collet: flag(row, "has_collet"),
        specs: nested(row, "specs"),
        application: nested(row, "application"),
    }
}

/// Map a `collets` row
pub fn collet_from_row(row: &Value) -> Collet {
    Collet {
        id: text(row, "id"),
        name: text(row, "name"),
        size: text(row, "size"),
        collet_type: text(row, "type"),
        description: text(row, "description"),
        stock: count(row, "stock"),
        min_stock: count(row, "min_stock"),
        is_imperial: flag(row, "is_imperial"),
        image_url: optional_text(row, "image_url"),
    }
}

static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();

/// Leading decimal of a string, the way a lenient float reader sees it
fn leading_number(s: &str) -> Option<f64> {
    let regex = LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+))")
            .expect("invalid leading number pattern")
    });
    regex
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Value written to `diam_haste`: numeric when it reads as a number
pub fn shank_to_column(shank: &ShankDiameter) -> Value {
    match shank {
        ShankDiameter::Number(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ShankDiameter::Text(s) => {
            let normalized = s.replacen(',', ".", 1);
            match leading_number(&normalized).and_then(serde_json::Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String(normalized),
            }
        }
    }
}

fn json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Columns touched by a bit patch
///
/// `pinca_recomendada` is never written; the database derives it.
pub fn bit_patch_columns(patch: &BitPatch) -> Map<String, Value> {
    let mut columns = Map::new();
    if let Some(v) = &patch.name {
        columns.insert("name".into(), v.clone().into());
    }
    if let Some(v) = &patch.tool_type {
        columns.insert("type".into(), v.clone().into());
    }
    if let Some(v) = &patch.diameter {
        columns.insert("diameter".into(), v.clone().into());
    }
    if let Some(v) = &patch.image_url {
        columns.insert("image_url".into(), v.clone().into());
    }
    if let Some(v) = patch.stock {
        columns.insert("stock".into(), v.into());
    }
    if let Some(v) = patch.min_stock {
        columns.insert("min_stock".into(), v.into());
    }
    if let Some(v) = &patch.material {
        columns.insert("material".into(), v.clone().into());
    }
    if let Some(v) = &patch.shank_diameter {
        columns.insert("diam_haste".into(), shank_to_column(v));
    }
    if let Some(v) = patch.has_collet {
        columns.insert("has_collet".into(), v.into());
    }
    if let Some(v) = &patch.specs {
        columns.insert("specs".into(), json(v));
    }
    if let Some(v) = &patch.application {
        columns.insert("application".into(), json(v));
    }
    columns
}

/// Insert payload for a new bit
pub fn new_bit_columns(bit: &NewBit) -> Value {
    serde_json::json!({
        "name": bit.name,
        "type": bit.tool_type,
        "diameter": bit.diameter,
        "image_url": bit.image_url,
        "stock": bit.stock,
        "min_stock": bit.min_stock,
        "material": bit.material,
        "diam_haste": shank_to_column(&bit.shank_diameter),
        "has_collet": bit.has_collet,
        "specs": json(&bit.specs),
        "application": json(&bit.application),
    })
}

/// Insert payload for a new collet
pub fn new_collet_columns(collet: &NewCollet) -> Value {
    serde_json::json!({
        "name": collet.name,
        "size": collet.size,
        "type": collet.collet_type,
        "description": collet.description,
        "stock": collet.stock,
        "min_stock": collet.min_stock,
        "is_imperial": collet.is_imperial,
        "image_url": collet.image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uuid_check() {
        assert!(is_valid_uuid("3f2504e0-4f89-11d3-9a0c-0305e82c3301"));
        assert!(is_valid_uuid("3F2504E0-4F89-11D3-9A0C-0305E82C3301"));
        assert!(!is_valid_uuid("1"));
        assert!(!is_valid_uuid("3f2504e04f8911d39a0c0305e82c3301"));
        assert!(!is_valid_uuid(""));
    }

    #[test]
    fn test_bit_row_prefers_diam_haste() {
        let row = json!({
            "id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "name": "Topo reto",
            "diam_haste": 6,
            "collet_size": "3",
            "stock": "4",
            "min_stock": null,
            "has_collet": 1,
            "pinca_recomendada": "",
            "specs": {"rpm": 18000, "feedRate": 1500.0}
        });
        let bit = bit_from_row(&row);
        assert_eq!(bit.shank_diameter, ShankDiameter::Number(6.0));
        assert_eq!(bit.stock, 4);
        assert_eq!(bit.min_stock, 0);
        assert!(bit.has_collet);
        assert_eq!(bit.recommended_collet, None);
        assert_eq!(bit.specs.rpm, 18000);
        assert_eq!(bit.image_url, None);
    }

    #[test]
    fn test_bit_row_falls_back_to_collet_size() {
        let row = json!({"id": 7, "collet_size": "3,175", "diam_haste": null});
        let bit = bit_from_row(&row);
        assert_eq!(bit.id, "7");
        assert_eq!(bit.shank_diameter, ShankDiameter::Text("3,175".to_string()));
        assert_eq!(bit.name, "");
        assert!(!bit.has_collet);
    }

    #[test]
    fn test_malformed_nested_column_defaults() {
        let row = json!({"specs": {"rpm": "fast"}, "application": null});
        let bit = bit_from_row(&row);
        assert_eq!(bit.specs.rpm, 0);
        assert!(bit.application.materials.is_empty());
    }

    #[test]
    fn test_collet_row() {
        let row = json!({
            "id": "c1", "name": "ER11 1/8", "size": "3.175mm", "type": "ER11",
            "stock": 2, "min_stock": 1, "is_imperial": true, "image_url": "http://x/y.png"
        });
        let collet = collet_from_row(&row);
        assert_eq!(collet.collet_type, "ER11");
        assert_eq!(collet.stock, 2);
        assert!(collet.is_imperial);
        assert_eq!(collet.image_url.as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn test_negative_stock_clamps_to_zero() {
        assert_eq!(count(&json!({"stock": -3}), "stock"), 0);
        assert_eq!(count(&json!({"stock": 2.7}), "stock"), 2);
    }

    #[test]
    fn test_shank_column_coercion() {
        assert_eq!(shank_to_column(&ShankDiameter::from("3,175")), json!(3.175));
        assert_eq!(shank_to_column(&ShankDiameter::from("6mm")), json!(6.0));
        assert_eq!(shank_to_column(&ShankDiameter::from(5.0)), json!(5.0));
        assert_eq!(shank_to_column(&ShankDiameter::from("abc")), json!("abc"));
        assert_eq!(shank_to_column(&ShankDiameter::from("Ø6")), json!("Ø6"));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("  6.35mm"), Some(6.35));
        assert_eq!(leading_number("-2.5"), Some(-2.5));
        assert_eq!(leading_number(".5"), Some(0.5));
        assert_eq!(leading_number("6."), Some(6.0));
        assert_eq!(leading_number("mm6"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_patch_columns_only_present_fields() {
        let patch = BitPatch {
            stock: Some(3),
            shank_diameter: Some(ShankDiameter::from("5,0")),
            ..Default::default()
        };
        let columns = bit_patch_columns(&patch);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns["stock"], json!(3));
        assert_eq!(columns["diam_haste"], json!(5.0));
        assert!(!columns.contains_key("pinca_recomendada"));
    }

    #[test]
    fn test_new_bit_payload() {
        let bit = NewBit {
            name: "V 60".to_string(),
            shank_diameter: ShankDiameter::from("6"),
            stock: 2,
            ..Default::default()
        };
        let payload = new_bit_columns(&bit);
        assert_eq!(payload["diam_haste"], json!(6.0));
        assert_eq!(payload["stock"], json!(2));
        assert!(payload.get("pinca_recomendada").is_none());
    }
}
