// file: src/models/record.rs
// description: flat extraction records and boundary validation of raw model output
// reference: duck-typed backend output becomes a closed set of typed variants here

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One extraction item as returned by the backend, prior to validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawExtraction {
    pub extraction_class: String,
    #[serde(default)]
    pub extraction_text: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Chemical composition of one alloy, as stated in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionRecord {
    pub material_id: String,
    pub formula: String,
    /// JSON string mapping element symbols to values; balance elements are -1.
    pub elements_json: String,
    pub unit: String,
    pub role: String,
    pub evidence: String,
    pub chunk: String,
}

/// Fabrication / processing step for one alloy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub material_id: String,
    pub method: String,
    pub heat_treatment: Option<String>,
    pub details: Option<String>,
    pub evidence: String,
    pub chunk: String,
}

/// One mechanical property measurement for one alloy. `value` stays a
/// string here; numeric validation happens during aggregation so a single
/// bad value excludes one record, not the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub material_id: String,
    pub property_type: String,
    pub value: String,
    pub unit: String,
    pub test_temperature: Option<String>,
    pub evidence: String,
    pub chunk: String,
}

/// The flat unit returned by one successful chunk extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractionRecord {
    Composition(CompositionRecord),
    Process(ProcessRecord),
    Property(PropertyRecord),
}

impl ExtractionRecord {
    /// Validate one raw extraction into a typed record.
    ///
    /// An unrecognized extraction class is a parse failure of the whole
    /// response: the model did not follow the schema, and a split-retry on
    /// smaller text is the appropriate repair.
    pub fn from_raw(raw: RawExtraction) -> Result<Self> {
        let attrs = &raw.attributes;
        match raw.extraction_class.as_str() {
            "composition" => Ok(ExtractionRecord::Composition(CompositionRecord {
                material_id: attr_string(attrs, "material_id"),
                formula: attr_string(attrs, "formula"),
                elements_json: attr_string(attrs, "elements_json"),
                unit: non_empty_or(attr_string(attrs, "unit"), "at.%"),
                role: attr_string(attrs, "role"),
                evidence: raw.extraction_text,
                chunk: String::new(),
            })),
            "process" => Ok(ExtractionRecord::Process(ProcessRecord {
                material_id: attr_string(attrs, "material_id"),
                method: attr_string(attrs, "method"),
                heat_treatment: attr_option(attrs, "heat_treatment"),
                details: attr_option(attrs, "details"),
                evidence: raw.extraction_text,
                chunk: String::new(),
            })),
            "property" => Ok(ExtractionRecord::Property(PropertyRecord {
                material_id: attr_string(attrs, "material_id"),
                property_type: attr_string(attrs, "property_type"),
                value: attr_string(attrs, "value"),
                unit: attr_string(attrs, "unit"),
                test_temperature: attr_option(attrs, "test_temperature"),
                evidence: raw.extraction_text,
                chunk: String::new(),
            })),
            other => Err(PipelineError::Parse(format!(
                "unknown extraction class: {:?}",
                other
            ))),
        }
    }

    pub fn material_id(&self) -> &str {
        match self {
            ExtractionRecord::Composition(r) => &r.material_id,
            ExtractionRecord::Process(r) => &r.material_id,
            ExtractionRecord::Property(r) => &r.material_id,
        }
    }

    pub fn chunk(&self) -> &str {
        match self {
            ExtractionRecord::Composition(r) => &r.chunk,
            ExtractionRecord::Process(r) => &r.chunk,
            ExtractionRecord::Property(r) => &r.chunk,
        }
    }

    /// Tag this record with the label of the chunk that produced it.
    pub fn set_chunk(&mut self, label: &str) {
        let chunk = match self {
            ExtractionRecord::Composition(r) => &mut r.chunk,
            ExtractionRecord::Process(r) => &mut r.chunk,
            ExtractionRecord::Property(r) => &mut r.chunk,
        };
        *chunk = label.to_string();
    }
}

/// Read an attribute as a trimmed string; numbers are accepted and
/// stringified since models alternate between `"1030"` and `1030`.
fn attr_string(attrs: &Map<String, Value>, key: &str) -> String {
    match attrs.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn attr_option(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    let s = attr_string(attrs, key);
    if s.is_empty() { None } else { Some(s) }
}

fn non_empty_or(s: String, default: &str) -> String {
    if s.is_empty() { default.to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(class: &str, attrs: Value) -> RawExtraction {
        RawExtraction {
            extraction_class: class.to_string(),
            extraction_text: "yield strength of 1030 MPa".to_string(),
            attributes: attrs.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_property_from_raw() {
        let record = ExtractionRecord::from_raw(raw(
            "property",
            json!({
                "material_id": "T42",
                "property_type": "Yield_Strength",
                "value": "1030",
                "unit": "MPa",
                "test_temperature": "298 K"
            }),
        ))
        .unwrap();

        match record {
            ExtractionRecord::Property(p) => {
                assert_eq!(p.material_id, "T42");
                assert_eq!(p.value, "1030");
                assert_eq!(p.test_temperature.as_deref(), Some("298 K"));
                assert_eq!(p.evidence, "yield strength of 1030 MPa");
            }
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_attribute_is_stringified() {
        let record = ExtractionRecord::from_raw(raw(
            "property",
            json!({"material_id": "A", "property_type": "UTS", "value": 853, "unit": "MPa"}),
        ))
        .unwrap();
        match record {
            ExtractionRecord::Property(p) => assert_eq!(p.value, "853"),
            other => panic!("expected property, got {:?}", other),
        }
    }

    #[test]
    fn test_composition_defaults_unit() {
        let record = ExtractionRecord::from_raw(raw(
            "composition",
            json!({"material_id": "T42", "formula": "Ti42Hf21Nb21V16",
                   "elements_json": "{\"Ti\": 42}"}),
        ))
        .unwrap();
        match record {
            ExtractionRecord::Composition(c) => assert_eq!(c.unit, "at.%"),
            other => panic!("expected composition, got {:?}", other),
        }
    }

    #[test]
    fn test_process_empty_optionals_are_none() {
        let record = ExtractionRecord::from_raw(raw(
            "process",
            json!({"material_id": "T42", "method": "DED", "heat_treatment": ""}),
        ))
        .unwrap();
        match record {
            ExtractionRecord::Process(p) => {
                assert_eq!(p.method, "DED");
                assert!(p.heat_treatment.is_none());
                assert!(p.details.is_none());
            }
            other => panic!("expected process, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_class_is_parse_error() {
        let result = ExtractionRecord::from_raw(raw("microstructure", json!({})));
        assert!(matches!(result, Err(PipelineError::Parse(_))));
    }

    #[test]
    fn test_set_chunk_tags_record() {
        let mut record =
            ExtractionRecord::from_raw(raw("process", json!({"material_id": "A", "method": "SLM"})))
                .unwrap();
        record.set_chunk("2b");
        assert_eq!(record.chunk(), "2b");
    }
}
