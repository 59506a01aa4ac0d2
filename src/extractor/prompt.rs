// file: src/extractor/prompt.rs
// description: extraction prompt description and few-shot example turns
// reference: schema instructions mirrored from the target data model

use serde_json::json;

/// Instructions sent as the system message: the three extraction classes,
/// their required attributes, and the span / identifier rules.
pub fn system_prompt() -> String {
    r#"Extract ALL materials, their compositions, processing methods, and mechanical properties from the materials science text the user provides.

Respond with ONLY a JSON object of the form:
{"extractions": [{"extraction_class": "...", "extraction_text": "...", "attributes": {...}}]}

Extraction classes and required attributes:

1. "composition" — Chemical composition of each alloy.
   Attributes:
     material_id       — short identifier for this alloy (e.g. T42, Mo3)
     formula           — complete chemical formula (e.g. 'Ti42Hf21Nb21V16')
     elements_json     — a JSON string mapping element symbols to numeric values,
                         e.g. '{"Ti": 42, "Hf": 21, "Nb": 21, "V": 16}'.
                         If an element is given as 'balance' or 'rem.', set its value to -1.
     unit              — composition unit (e.g. 'at.%', 'wt.%')
     role              — 'Target' if the authors prepared and studied this material,
                         'Reference' if it is cited for comparison only, else 'Other'.

2. "process" — Fabrication / processing method.
   Attributes:
     material_id       — same id as the related composition
     method            — main fabrication method (e.g. 'Arc Melting', 'DED', 'SLM')
     heat_treatment    — heat treatment description (e.g. 'Annealed at 1100C for 2h')
     details           — other key parameters: power, speed, layer thickness, etc.

3. "property" — Each individual mechanical property measurement.
   Attributes:
     material_id       — same id as the related composition
     property_type     — property category (e.g. 'Yield_Strength', 'UTS',
                         'Elongation_Total', 'Elongation_Uniform', 'Hardness')
     value             — the numeric value, as a string
     unit              — measurement unit (e.g. 'MPa', '%', 'HV')
     test_temperature  — test temperature (e.g. 'Room Temperature', '298K', '600C'),
                         empty if not stated.

Rules:
- extraction_text must be an EXACT span from the source. Do NOT paraphrase.
- List extractions in order of appearance. Do NOT overlap spans.
- Use the SAME material_id across composition / process / property.
- Only extract data EXPLICITLY stated. Do NOT guess or calculate.
- If multiple materials are studied, extract ALL of them.
- For range values (e.g. 20-30), take the midpoint.
- Output ONLY the JSON object: no markdown, no code fences, no explanations."#
        .to_string()
}

/// Worked (user, assistant) example turns included in every request.
/// Spans are verbatim substrings of the example text, in order of
/// appearance, sharing one material_id — exactly what the rules demand.
pub fn example_turns() -> Vec<(String, String)> {
    let ded_text = "The Ti42Hf21Nb21V16 refractory high-entropy alloy was fabricated \
                    using directed energy deposition with a laser power of 550 W and \
                    a scanning speed of 5 mm/s. The alloy exhibited a yield strength \
                    of 1030 MPa and total elongation of 22.5% at room temperature. \
                    At 873 K, the yield strength was 636 MPa.";
    let ded_reply = json!({
        "extractions": [
            {
                "extraction_class": "composition",
                "extraction_text": "Ti42Hf21Nb21V16",
                "attributes": {
                    "material_id": "T42",
                    "formula": "Ti42Hf21Nb21V16",
                    "elements_json": "{\"Ti\": 42, \"Hf\": 21, \"Nb\": 21, \"V\": 16}",
                    "unit": "at.%",
                    "role": "Target"
                }
            },
            {
                "extraction_class": "process",
                "extraction_text": "directed energy deposition with a laser power of 550 W and a scanning speed of 5 mm/s",
                "attributes": {
                    "material_id": "T42",
                    "method": "DED",
                    "heat_treatment": "",
                    "details": "laser power 550 W, scanning speed 5 mm/s"
                }
            },
            {
                "extraction_class": "property",
                "extraction_text": "yield strength of 1030 MPa",
                "attributes": {
                    "material_id": "T42",
                    "property_type": "Yield_Strength",
                    "value": "1030",
                    "unit": "MPa",
                    "test_temperature": "298 K"
                }
            },
            {
                "extraction_class": "property",
                "extraction_text": "total elongation of 22.5%",
                "attributes": {
                    "material_id": "T42",
                    "property_type": "Elongation_Total",
                    "value": "22.5",
                    "unit": "%",
                    "test_temperature": "298 K"
                }
            },
            {
                "extraction_class": "property",
                "extraction_text": "yield strength was 636 MPa",
                "attributes": {
                    "material_id": "T42",
                    "property_type": "Yield_Strength",
                    "value": "636",
                    "unit": "MPa",
                    "test_temperature": "873 K"
                }
            }
        ]
    });

    let arc_text = "FeCoCrNiMo0.3 high entropy alloy was prepared by arc melting in \
                    argon atmosphere, followed by homogenization at 1200C for 24h. \
                    Tensile tests showed an ultimate tensile strength of 853 MPa and \
                    elongation of 35.2% at 298 K.";
    let arc_reply = json!({
        "extractions": [
            {
                "extraction_class": "composition",
                "extraction_text": "FeCoCrNiMo0.3",
                "attributes": {
                    "material_id": "FeCoCrNiMo0.3",
                    "formula": "FeCoCrNiMo0.3",
                    "elements_json": "{\"Fe\": 23.26, \"Co\": 23.26, \"Cr\": 23.26, \"Ni\": 23.26, \"Mo\": 6.98}",
                    "unit": "at.%",
                    "role": "Target"
                }
            },
            {
                "extraction_class": "process",
                "extraction_text": "arc melting in argon atmosphere, followed by homogenization at 1200C for 24h",
                "attributes": {
                    "material_id": "FeCoCrNiMo0.3",
                    "method": "Arc Melting",
                    "heat_treatment": "homogenization at 1200C for 24h",
                    "details": "argon atmosphere"
                }
            },
            {
                "extraction_class": "property",
                "extraction_text": "ultimate tensile strength of 853 MPa",
                "attributes": {
                    "material_id": "FeCoCrNiMo0.3",
                    "property_type": "UTS",
                    "value": "853",
                    "unit": "MPa",
                    "test_temperature": "298 K"
                }
            },
            {
                "extraction_class": "property",
                "extraction_text": "elongation of 35.2%",
                "attributes": {
                    "material_id": "FeCoCrNiMo0.3",
                    "property_type": "Elongation_Total",
                    "value": "35.2",
                    "unit": "%",
                    "test_temperature": "298 K"
                }
            }
        ]
    });

    vec![
        (ded_text.to_string(), ded_reply.to_string()),
        (arc_text.to_string(), arc_reply.to_string()),
    ]
}
