//! System instructions and prompt builders for the generation-service calls.

/// Model for structured monograph generation.
pub(crate) const MONOGRAPH_MODEL: &str = "gemini-3-pro-preview";

/// Model for packaging-image generation.
pub(crate) const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model for free-text dose suggestions.
pub(crate) const DOSE_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature for the deterministic text calls (monograph, dose).
pub(crate) const TEXT_TEMPERATURE: f32 = 0.2;

pub(crate) const MONOGRAPH_SYSTEM_INSTRUCTION: &str = "You are an expert medical writer and pharmacologist specializing in creating drug reference materials. Your task is to generate a complete, medically accurate, copyright-free, and SEO-friendly drug monograph based on latest international guidelines (2024-2025). The language must be simple, clear, and professional. The output must be a structured JSON object. For 'mechanismOfAction' and 'pharmacodynamics.pathway', provide a simplified, step-by-step pathway as an array of strings, suitable for creating a visual flowchart. For 'counsellingTips', provide concise, practical advice for a patient. For 'references', provide full, direct URLs to high-authority sources like DrugBank, PubMed (ncbi.nih.gov), or official FDA/EMA drug labels. If a section has no information, provide an appropriate empty value (e.g., null for strings, empty array for lists).";

pub(crate) const DOSE_SYSTEM_INSTRUCTION: &str = "You are an expert clinical pharmacist. Your task is to calculate a suggested drug dose based on the provided patient information. The output should be a clear, concise statement about the suggested dose, including the rationale if applicable (e.g., based on weight). You must include a clear disclaimer that this is not medical advice and a healthcare professional should be consulted. Do not return JSON.";

pub(crate) fn monograph_prompt(drug_name: &str) -> String {
    format!("Generate a complete drug monograph for the following drug: \"{drug_name}\".")
}

pub(crate) fn image_prompt(drug_name: &str) -> String {
    format!(
        "Generate a high-quality, photorealistic, copyright-free image of a generic pharmaceutical product packaging for \"{drug_name}\". The box and blister pack should look professional and clinical. Do not include any real brand names or logos, but you can use the generic drug name on the box. Show the product on a clean, minimalist, white background."
    )
}

pub(crate) fn dose_prompt(drug_name: &str, age: u32, weight: f64) -> String {
    format!(
        "Calculate the dose for {drug_name} for a patient who is {age} years old and weighs {weight} kg. Provide a brief explanation."
    )
}
