// file: src/models/entity.rs
// description: aggregated material entity and its component parts
// reference: aggregation target, sealed to target JSON after a document completes

use serde::{Deserialize, Serialize};

/// Role of a material in the paper, used downstream to filter out
/// comparison-only reference alloys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialRole {
    /// Prepared and studied by the paper's authors.
    Target,
    /// Cited for comparison only.
    Reference,
    Other,
}

impl MaterialRole {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Target" => MaterialRole::Target,
            "Reference" => MaterialRole::Reference,
            _ => MaterialRole::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialRole::Target => "Target",
            MaterialRole::Reference => "Reference",
            MaterialRole::Other => "Other",
        }
    }
}

/// A single alloy element and its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub symbol: String,
    pub value: f64,
    pub unit: String,
    /// True when the paper gives this element as "balance" / "rem.".
    pub is_balance: bool,
}

/// One mechanical property measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMeasurement {
    pub property_type: String,
    pub value: f64,
    pub unit: String,
    pub test_temperature: Option<String>,
}

/// Fabrication and processing description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    pub method: String,
    pub heat_treatment: Option<String>,
    pub details: Option<String>,
}

impl Default for Processing {
    fn default() -> Self {
        Self {
            method: "Unknown".to_string(),
            heat_treatment: None,
            details: None,
        }
    }
}

/// The complete record for one material, accumulated from extraction
/// records sharing its identifier. Mutable during aggregation; converted
/// to the external JSON template once the document batch completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialEntity {
    pub material_name: String,
    pub formula: String,
    pub composition: Vec<Element>,
    pub process: Processing,
    pub properties: Vec<PropertyMeasurement>,
    pub microstructure: Option<String>,
    pub role: MaterialRole,
    /// Labels of the chunks that contributed records to this entity.
    pub chunks: Vec<String>,
}

impl MaterialEntity {
    pub fn new(material_name: String) -> Self {
        Self {
            formula: material_name.clone(),
            material_name,
            composition: Vec::new(),
            process: Processing::default(),
            properties: Vec::new(),
            microstructure: None,
            role: MaterialRole::Other,
            chunks: Vec::new(),
        }
    }

    /// Record a contributing chunk label exactly once, preserving order.
    pub fn note_chunk(&mut self, label: &str) {
        if !self.chunks.iter().any(|c| c == label) {
            self.chunks.push(label.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_lenient() {
        assert_eq!(MaterialRole::parse("Target"), MaterialRole::Target);
        assert_eq!(MaterialRole::parse(" Reference "), MaterialRole::Reference);
        assert_eq!(MaterialRole::parse("target"), MaterialRole::Other);
        assert_eq!(MaterialRole::parse(""), MaterialRole::Other);
    }

    #[test]
    fn test_new_entity_defaults() {
        let entity = MaterialEntity::new("HEA-1".to_string());
        assert_eq!(entity.formula, "HEA-1");
        assert_eq!(entity.process.method, "Unknown");
        assert!(entity.properties.is_empty());
        assert_eq!(entity.role, MaterialRole::Other);
    }

    #[test]
    fn test_note_chunk_dedupes_in_order() {
        let mut entity = MaterialEntity::new("A".to_string());
        entity.note_chunk("0");
        entity.note_chunk("1a");
        entity.note_chunk("0");
        assert_eq!(entity.chunks, vec!["0", "1a"]);
    }
}
