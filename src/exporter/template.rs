// file: src/exporter/template.rs
// description: maps a sealed material entity onto the target JSON template
// reference: fixed field mapping agreed with the downstream data consumer

use crate::models::MaterialEntity;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
    static ref NUMBER: Regex = Regex::new(r"[\d.]+").unwrap();
}

/// Convert one sealed entity into the external JSON shape.
///
/// Top-level keys: provenance (`_source_pdf`, `_chunks`, `role`) plus
/// `Composition_Info`, `Process_Info` and `Properties_Info`.
pub fn entity_to_target_json(entity: &MaterialEntity, source_pdf: &str) -> Value {
    let safe_name = sanitize_identifier(&entity.material_name);
    let mat_id = format!("M_{}", safe_name);
    let sample_id = format!("S_{}_AsBuilt", safe_name);

    let mut composition_map = Map::new();
    for element in &entity.composition {
        let value = if element.is_balance { -1.0 } else { element.value };
        composition_map.insert(element.symbol.clone(), json!(value));
    }

    let composition_info = json!({
        "Mat_ID": mat_id,
        "Alloy_Name_Raw": entity.material_name,
        "Formula_Normalized": entity.formula,
        "Composition_JSON": Value::Object(composition_map).to_string(),
        "Source_DOI": source_pdf,
    });

    let process = &entity.process;
    let process_text = process
        .details
        .clone()
        .or_else(|| process.heat_treatment.clone())
        .unwrap_or_else(|| process.method.clone());

    let process_info = json!({
        "Sample_ID": sample_id,
        "Mat_ID": mat_id,
        "Process_Category": process.method,
        "Process_Text_For_AI": process_text,
        "Key_Params_JSON": "{}",
        "Main_Phase": "",
        "Microstructure_Text_For_AI": entity.microstructure.clone().unwrap_or_default(),
        "Has_Precipitates": false,
        "Grain_Size_avg_um": Value::Null,
    });

    let properties: Vec<Value> = entity
        .properties
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "Test_ID": format!("T_{}_{:02}", safe_name, i + 1),
                "Sample_ID": sample_id,
                "Test_Temperature_K": parse_temperature_k(p.test_temperature.as_deref()),
                "Property_Type": p.property_type,
                "Property_Value": p.value,
                "Property_Unit": p.unit,
            })
        })
        .collect();

    json!({
        "_source_pdf": source_pdf,
        "_chunks": entity.chunks,
        "role": entity.role.as_str(),
        "Composition_Info": composition_info,
        "Process_Info": process_info,
        "Properties_Info": properties,
    })
}

/// Strip an identifier down to alphanumerics, capped at 15 chars.
fn sanitize_identifier(name: &str) -> String {
    let cleaned: String = NON_ALNUM.replace_all(name, "").chars().take(15).collect();
    if cleaned.is_empty() {
        "Unknown".to_string()
    } else {
        cleaned
    }
}

/// Normalize a free-text test temperature to Kelvin.
///
/// RT / "room temperature" → 298.0; a number followed by K is taken as
/// Kelvin; anything else numeric is read as Celsius. Missing or
/// unparseable strings default to room temperature.
fn parse_temperature_k(temp: Option<&str>) -> f64 {
    let Some(raw) = temp else {
        return 298.0;
    };
    let lowered = raw.to_lowercase();
    let lowered = lowered.trim();

    if lowered.contains("rt") || lowered.contains("room") {
        return 298.0;
    }

    let Some(m) = NUMBER.find(lowered) else {
        return 298.0;
    };
    let Ok(value) = m.as_str().parse::<f64>() else {
        return 298.0;
    };

    if lowered.contains('k') && !lowered.contains('c') {
        value
    } else {
        value + 273.15
    }
}
