use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PharmographError;
use crate::prompts;
use crate::schema;
use crate::sources::genai::{GenAiClient, GenerateRequest};

/// The full reference document for one drug.
///
/// Field names follow the wire contract the generation service is held to;
/// a payload that drifts from this shape is rejected as a whole rather than
/// patched up. The one tolerated normalization: list fields arrive as
/// `null` or are missing entirely, and decode to empty vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monograph {
    pub drug_name: String,
    pub drug_class_and_category: DrugClassAndCategory,
    pub introduction: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub mechanism_of_action: Vec<String>,
    pub therapeutic_uses: TherapeuticUses,
    pub adverse_drug_reactions: AdverseDrugReactions,
    pub interactions: Interactions,
    pub pharmacokinetics: Pharmacokinetics,
    pub pharmacodynamics: Pharmacodynamics,
    pub dosage_information: DosageInformation,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub routes_of_administration: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub common_brands_in_pakistan: Vec<Brand>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub clinical_cases: Vec<ClinicalCase>,
    pub counselling_tips: CounsellingTips,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugClassAndCategory {
    pub pharmacological_class: String,
    pub therapeutic_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapeuticUses {
    #[serde(default, deserialize_with = "null_to_empty")]
    pub fda_approved: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub global_guidelines: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub off_label: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdverseDrugReactions {
    #[serde(default, deserialize_with = "null_to_empty")]
    pub common: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub serious: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub rare: Vec<String>,
    #[serde(default)]
    pub black_box_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactions {
    #[serde(default, deserialize_with = "null_to_empty")]
    pub drug_drug: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub drug_food: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub drug_herbal: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacokinetics {
    pub absorption: String,
    pub distribution: String,
    pub metabolism: String,
    pub excretion: String,
    pub half_life: String,
    pub bioavailability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacodynamics {
    #[serde(default, deserialize_with = "null_to_empty")]
    pub pathway: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageInformation {
    pub adult: String,
    pub pediatric: String,
    pub adjustments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub brand_name: String,
    pub company: String,
    pub strengths: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalCase {
    pub case: String,
    pub solution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounsellingTips {
    #[serde(default, deserialize_with = "null_to_empty")]
    pub general_tips: Vec<String>,
    pub time_of_administration: String,
    pub vehicle: String,
    pub with_food: String,
    pub foods_to_avoid: String,
}

/// Generates the monograph for `drug_name` as one structured call.
///
/// Any failure along the way, from transport to an off-contract payload,
/// collapses into `ContentGeneration`; callers never see a partially
/// decoded monograph.
pub(crate) async fn generate(
    client: &GenAiClient,
    drug_name: &str,
) -> Result<Monograph, PharmographError> {
    let drug_name = drug_name.trim();
    if drug_name.is_empty() {
        return Err(PharmographError::InvalidArgument(
            "Drug name is required. Example: pharmograph search paracetamol".into(),
        ));
    }

    let request = GenerateRequest::from_prompt(prompts::monograph_prompt(drug_name))
        .with_system_instruction(prompts::MONOGRAPH_SYSTEM_INSTRUCTION)
        .with_temperature(prompts::TEXT_TEMPERATURE)
        .with_json_schema(schema::monograph_response_schema());

    let response = client
        .generate(prompts::MONOGRAPH_MODEL, &request)
        .await
        .map_err(|err| content_failure(drug_name, err.to_string()))?;

    let payload = response.text();
    if payload.trim().is_empty() {
        return Err(content_failure(drug_name, "empty response payload".into()));
    }

    let cleaned = strip_code_fence(&payload);
    debug!(drug = drug_name, bytes = cleaned.len(), "decoding monograph payload");
    serde_json::from_str(&cleaned)
        .map_err(|err| content_failure(drug_name, format!("undecodable payload: {err}")))
}

fn content_failure(drug_name: &str, reason: String) -> PharmographError {
    PharmographError::ContentGeneration {
        drug: drug_name.to_string(),
        reason,
    }
}

/// Removes a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing ```` ``` ```` fence, leaving unfenced payloads untouched.
fn strip_code_fence(payload: &str) -> String {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE_RE.get_or_init(|| Regex::new(r"^```(?:json)?\s*|```\s*$").expect("valid regex"));
    re.replace_all(payload.trim(), "").into_owned()
}

fn null_to_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn sample_value(drug_name: &str) -> serde_json::Value {
    serde_json::json!({
        "drugName": drug_name,
        "drugClassAndCategory": {
            "pharmacologicalClass": "Para-aminophenol derivative",
            "therapeuticCategory": "Analgesic and antipyretic"
        },
        "introduction": "A widely used first-line analgesic and antipyretic.",
        "mechanismOfAction": [
            "Crosses the blood-brain barrier",
            "Inhibits central prostaglandin synthesis"
        ],
        "therapeuticUses": {
            "fdaApproved": ["Mild to moderate pain", "Fever"],
            "globalGuidelines": ["First-line antipyretic in children"],
            "offLabel": []
        },
        "adverseDrugReactions": {
            "common": ["Nausea"],
            "serious": ["Hepatotoxicity in overdose"],
            "rare": [],
            "blackBoxWarning": null
        },
        "interactions": {
            "drugDrug": ["Warfarin: may enhance anticoagulant effect"],
            "drugFood": [],
            "drugHerbal": []
        },
        "pharmacokinetics": {
            "absorption": "Rapid and almost complete after oral dosing",
            "distribution": "Widely distributed; low protein binding",
            "metabolism": "Hepatic glucuronidation and sulfation",
            "excretion": "Renal, mainly as conjugates",
            "halfLife": "2 to 3 hours",
            "bioavailability": "About 80%"
        },
        "pharmacodynamics": {
            "pathway": ["Reduces hypothalamic set point", "Net antipyretic effect"]
        },
        "dosageInformation": {
            "adult": "500-1000 mg every 4-6 hours, maximum 4 g/day",
            "pediatric": "10-15 mg/kg per dose every 4-6 hours",
            "adjustments": "Reduce total daily dose in hepatic impairment"
        },
        "routesOfAdministration": ["Oral", "Intravenous", "Rectal"],
        "commonBrandsInPakistan": [
            {"brandName": "Panadol", "company": "GSK", "strengths": "500 mg tablet"}
        ],
        "clinicalCases": [
            {
                "case": "Adult with fever and body aches after a viral illness.",
                "solution": "Standard adult dosing with adequate hydration; reassess at 48 hours."
            }
        ],
        "counsellingTips": {
            "generalTips": ["Do not exceed 4 g in 24 hours"],
            "timeOfAdministration": "Any time of day, spaced at least 4 hours apart",
            "vehicle": "Swallow whole with a glass of water",
            "withFood": "May be taken with or without food",
            "foodsToAvoid": "Avoid alcohol while taking this medicine"
        },
        "references": ["https://go.drugbank.com/drugs/DB00316"]
    })
}

#[cfg(test)]
pub(crate) fn sample(drug_name: &str) -> Monograph {
    serde_json::from_value(sample_value(drug_name)).expect("sample monograph should decode")
}
