//! Response schema handed to the generation service as the structured-output
//! contract for monograph requests.
//!
//! Field names, nesting, required lists, and nullability mirror the
//! [`crate::entities::monograph::Monograph`] type exactly; the typed decode
//! enforces the same shape locally after the service responds.

use serde_json::{Value, json};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Builds the `generationConfig.responseSchema` value for monograph requests.
///
/// `blackBoxWarning` is the only nullable scalar; every list field is required
/// so the service emits empty arrays rather than omitting sections.
pub(crate) fn monograph_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "drugName": string(),
            "drugClassAndCategory": {
                "type": "OBJECT",
                "properties": {
                    "pharmacologicalClass": string(),
                    "therapeuticCategory": string(),
                },
                "required": ["pharmacologicalClass", "therapeuticCategory"]
            },
            "introduction": string(),
            "mechanismOfAction": string_list(),
            "therapeuticUses": {
                "type": "OBJECT",
                "properties": {
                    "fdaApproved": string_list(),
                    "globalGuidelines": string_list(),
                    "offLabel": string_list(),
                },
                "required": ["fdaApproved", "globalGuidelines", "offLabel"]
            },
            "adverseDrugReactions": {
                "type": "OBJECT",
                "properties": {
                    "common": string_list(),
                    "serious": string_list(),
                    "rare": string_list(),
                    "blackBoxWarning": { "type": "STRING", "nullable": true },
                },
                "required": ["common", "serious", "rare", "blackBoxWarning"]
            },
            "interactions": {
                "type": "OBJECT",
                "properties": {
                    "drugDrug": string_list(),
                    "drugFood": string_list(),
                    "drugHerbal": string_list(),
                },
                "required": ["drugDrug", "drugFood", "drugHerbal"]
            },
            "pharmacokinetics": {
                "type": "OBJECT",
                "properties": {
                    "absorption": string(),
                    "distribution": string(),
                    "metabolism": string(),
                    "excretion": string(),
                    "halfLife": string(),
                    "bioavailability": string(),
                },
                "required": [
                    "absorption", "distribution", "metabolism",
                    "excretion", "halfLife", "bioavailability"
                ]
            },
            "pharmacodynamics": {
                "type": "OBJECT",
                "properties": {
                    "pathway": string_list(),
                },
                "required": ["pathway"]
            },
            "dosageInformation": {
                "type": "OBJECT",
                "properties": {
                    "adult": string(),
                    "pediatric": string(),
                    "adjustments": string(),
                },
                "required": ["adult", "pediatric", "adjustments"]
            },
            "routesOfAdministration": string_list(),
            "commonBrandsInPakistan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "brandName": string(),
                        "company": string(),
                        "strengths": string(),
                    },
                    "required": ["brandName", "company", "strengths"]
                }
            },
            "clinicalCases": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "case": string(),
                        "solution": string(),
                    },
                    "required": ["case", "solution"]
                }
            },
            "counsellingTips": {
                "type": "OBJECT",
                "properties": {
                    "generalTips": string_list(),
                    "timeOfAdministration": string(),
                    "vehicle": string(),
                    "withFood": string(),
                    "foodsToAvoid": string(),
                },
                "required": [
                    "generalTips", "timeOfAdministration",
                    "vehicle", "withFood", "foodsToAvoid"
                ]
            },
            "references": string_list(),
        },
        "required": [
            "drugName", "drugClassAndCategory", "introduction",
            "mechanismOfAction", "therapeuticUses", "adverseDrugReactions", "interactions",
            "pharmacokinetics", "pharmacodynamics", "dosageInformation", "routesOfAdministration",
            "commonBrandsInPakistan", "clinicalCases", "counsellingTips", "references"
        ]
    })
}
