// file: src/aggregator.rs
// description: groups flat extraction records into material entities by identifier
// reference: arrival order is preserved within each group; nothing is silently dropped

use crate::error::PipelineError;
use crate::models::{
    CompositionRecord, Element, ExtractionRecord, MaterialEntity, MaterialRole, ProcessRecord,
    PropertyMeasurement, PropertyRecord,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Reserved group for records whose material identifier is missing or
/// empty. Keeping them visible beats dropping them.
pub const UNASSIGNED_KEY: &str = "unassigned";

#[derive(Debug, Default)]
pub struct AggregationResult {
    /// Entities in first-seen identifier order.
    pub entities: Vec<MaterialEntity>,
    /// Records excluded by schema validation (bad numeric value etc).
    pub records_excluded: usize,
}

/// Group pooled extraction records by material identifier, appending
/// elements / processing / properties in the order records arrived. A
/// record failing its type constraints is excluded and counted, never
/// aborting the rest of the aggregation.
pub fn group_records(records: Vec<ExtractionRecord>) -> AggregationResult {
    let mut entities: Vec<MaterialEntity> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut excluded = 0usize;

    for record in records {
        let key = group_key(&record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            entities.push(MaterialEntity::new(key));
            entities.len() - 1
        });
        let entity = &mut entities[slot];
        entity.note_chunk(record.chunk());

        match record {
            ExtractionRecord::Composition(c) => apply_composition(entity, &c),
            ExtractionRecord::Process(p) => apply_process(entity, &p),
            ExtractionRecord::Property(p) => {
                if let Err(err) = apply_property(entity, &p) {
                    warn!(
                        "Excluding property record for {:?} (chunk {}): {}",
                        entity.material_name, p.chunk, err
                    );
                    excluded += 1;
                }
            }
        }
    }

    AggregationResult {
        entities,
        records_excluded: excluded,
    }
}

fn group_key(record: &ExtractionRecord) -> String {
    let mut id = record.material_id().trim().to_string();

    // A composition without an explicit id can still name its group:
    // the formula, or failing that the evidence span, identifies the alloy.
    if id.is_empty() {
        if let ExtractionRecord::Composition(c) = record {
            if !c.formula.trim().is_empty() {
                id = c.formula.trim().to_string();
            } else {
                id = c.evidence.chars().take(40).collect::<String>().trim().to_string();
            }
        }
    }

    if id.is_empty() {
        UNASSIGNED_KEY.to_string()
    } else {
        id
    }
}

fn apply_composition(entity: &mut MaterialEntity, record: &CompositionRecord) {
    if !record.formula.trim().is_empty() {
        entity.formula = record.formula.trim().to_string();
    }

    let role = MaterialRole::parse(&record.role);
    if role != MaterialRole::Other {
        entity.role = role;
    }

    let elements = parse_elements_json(&record.elements_json, &record.unit);
    if !elements.is_empty() {
        entity.composition = elements;
    }
}

fn apply_process(entity: &mut MaterialEntity, record: &ProcessRecord) {
    if !record.method.trim().is_empty() {
        entity.process.method = record.method.trim().to_string();
    }
    if let Some(ht) = &record.heat_treatment {
        entity.process.heat_treatment = Some(ht.clone());
    }
    if let Some(details) = &record.details {
        entity.process.details = match entity.process.details.take() {
            Some(existing) => Some(format!("{} {}", existing, details)),
            None => Some(details.clone()),
        };
    }
}

fn apply_property(
    entity: &mut MaterialEntity,
    record: &PropertyRecord,
) -> crate::error::Result<()> {
    let value: f64 = record.value.trim().parse().map_err(|_| {
        PipelineError::SchemaValidation(format!(
            "property value {:?} is not numeric",
            record.value
        ))
    })?;

    entity.properties.push(PropertyMeasurement {
        property_type: if record.property_type.trim().is_empty() {
            "Unknown".to_string()
        } else {
            record.property_type.trim().to_string()
        },
        value,
        unit: record.unit.clone(),
        test_temperature: record.test_temperature.clone(),
    });
    Ok(())
}

/// Parse an elements_json payload like `{"Ti": 42, "Hf": 21}` into typed
/// elements. A balance element is encoded upstream as -1. A malformed
/// payload yields no elements; the entity is still kept so the rest of its
/// records are not lost.
fn parse_elements_json(raw: &str, unit: &str) -> Vec<Element> {
    let parsed: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(err) => {
            if !raw.trim().is_empty() {
                debug!("Unparseable elements_json {:?}: {}", raw, err);
            }
            return Vec::new();
        }
    };

    parsed
        .into_iter()
        .filter_map(|(symbol, value)| {
            let number = value.as_f64()?;
            let is_balance = number == -1.0;
            Some(Element {
                symbol,
                value: if is_balance { 0.0 } else { number },
                unit: unit.to_string(),
                is_balance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn composition(material_id: &str, formula: &str, elements_json: &str) -> ExtractionRecord {
        ExtractionRecord::Composition(CompositionRecord {
            material_id: material_id.to_string(),
            formula: formula.to_string(),
            elements_json: elements_json.to_string(),
            unit: "at.%".to_string(),
            role: "Target".to_string(),
            evidence: formula.to_string(),
            chunk: "0".to_string(),
        })
    }

    fn property(material_id: &str, property_type: &str, value: &str, chunk: &str) -> ExtractionRecord {
        ExtractionRecord::Property(PropertyRecord {
            material_id: material_id.to_string(),
            property_type: property_type.to_string(),
            value: value.to_string(),
            unit: "MPa".to_string(),
            test_temperature: Some("298 K".to_string()),
            evidence: format!("{} of {} MPa", property_type, value),
            chunk: chunk.to_string(),
        })
    }

    fn process(material_id: &str, method: &str) -> ExtractionRecord {
        ExtractionRecord::Process(ProcessRecord {
            material_id: material_id.to_string(),
            method: method.to_string(),
            heat_treatment: None,
            details: Some("argon atmosphere".to_string()),
            evidence: method.to_string(),
            chunk: "1".to_string(),
        })
    }

    #[test]
    fn test_groups_by_identifier_across_chunks() {
        let result = group_records(vec![
            composition("HEA-1", "FeCoCrNi", r#"{"Fe": 25, "Co": 25, "Cr": 25, "Ni": 25}"#),
            property("HEA-1", "Yield_Strength", "1030", "0"),
            property("HEA-1", "UTS", "853", "1"),
        ]);

        assert_eq!(result.entities.len(), 1);
        let entity = &result.entities[0];
        assert_eq!(entity.material_name, "HEA-1");
        assert_eq!(entity.formula, "FeCoCrNi");
        assert_eq!(entity.composition.len(), 4);
        assert_eq!(entity.properties.len(), 2);
        assert_eq!(entity.chunks, vec!["0", "1"]);
        assert_eq!(entity.role, MaterialRole::Target);
    }

    #[test]
    fn test_arrival_order_preserved_within_group() {
        let result = group_records(vec![
            property("A", "Yield_Strength", "100", "0"),
            property("A", "UTS", "200", "0"),
            property("A", "Hardness", "300", "1"),
        ]);

        let types: Vec<&str> = result.entities[0]
            .properties
            .iter()
            .map(|p| p.property_type.as_str())
            .collect();
        assert_eq!(types, vec!["Yield_Strength", "UTS", "Hardness"]);
    }

    #[test]
    fn test_entities_in_first_seen_order() {
        let result = group_records(vec![
            property("B", "UTS", "1", "0"),
            property("A", "UTS", "2", "0"),
            property("B", "Hardness", "3", "0"),
        ]);

        let names: Vec<&str> = result
            .entities
            .iter()
            .map(|e| e.material_name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_missing_identifier_goes_to_unassigned() {
        let result = group_records(vec![
            property("", "UTS", "500", "2"),
            process("", "SLM"),
        ]);

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].material_name, UNASSIGNED_KEY);
        assert_eq!(result.entities[0].properties.len(), 1);
        assert_eq!(result.entities[0].process.method, "SLM");
    }

    #[test]
    fn test_composition_without_id_uses_formula() {
        let result = group_records(vec![composition("", "AlCoCrFeNi", r#"{"Al": 20}"#)]);
        assert_eq!(result.entities[0].material_name, "AlCoCrFeNi");
    }

    #[test]
    fn test_non_numeric_property_is_excluded_not_fatal() {
        let result = group_records(vec![
            property("A", "UTS", "853", "0"),
            property("A", "Hardness", "approximately high", "0"),
        ]);

        assert_eq!(result.records_excluded, 1);
        assert_eq!(result.entities[0].properties.len(), 1);
        assert_eq!(result.entities[0].properties[0].property_type, "UTS");
    }

    #[test]
    fn test_balance_element_parsed() {
        let elements = parse_elements_json(r#"{"Fe": -1, "Cr": 18}"#, "wt.%");
        let fe = elements.iter().find(|e| e.symbol == "Fe").unwrap();
        assert!(fe.is_balance);
        assert_eq!(fe.value, 0.0);
        let cr = elements.iter().find(|e| e.symbol == "Cr").unwrap();
        assert!(!cr.is_balance);
        assert_eq!(cr.value, 18.0);
    }

    #[test]
    fn test_malformed_elements_json_keeps_entity() {
        let result = group_records(vec![
            composition("A", "XYZ", "not json"),
            property("A", "UTS", "500", "0"),
        ]);

        assert_eq!(result.entities.len(), 1);
        assert!(result.entities[0].composition.is_empty());
        assert_eq!(result.entities[0].properties.len(), 1);
    }

    #[test]
    fn test_process_details_accumulate() {
        let result = group_records(vec![
            process("A", "DED"),
            process("A", ""),
        ]);

        let proc = &result.entities[0].process;
        assert_eq!(proc.method, "DED");
        assert_eq!(
            proc.details.as_deref(),
            Some("argon atmosphere argon atmosphere")
        );
    }
}
