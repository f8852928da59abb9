use tracing::warn;

use crate::entities::dose;
use crate::error::PharmographError;
use crate::render;
use crate::sources::genai::GenAiClient;

/// User-facing message for a failed dose call. Transport detail stays in logs.
const DOSE_FAILURE_ERROR: &str = "Failed to calculate dose. Please try again.";

#[derive(serde::Serialize)]
struct DoseOutput<'a> {
    drug: &'a str,
    age: u32,
    weight: f64,
    suggestion: String,
}

pub(crate) async fn run(drug: &str, age: u32, weight: f64, json: bool) -> anyhow::Result<String> {
    let client = GenAiClient::new()?;
    run_with_client(&client, drug, age, weight, json).await
}

async fn run_with_client(
    client: &GenAiClient,
    drug: &str,
    age: u32,
    weight: f64,
    json: bool,
) -> anyhow::Result<String> {
    let suggestion = match dose::suggest(client, drug, age, weight).await {
        Ok(suggestion) => suggestion,
        Err(err @ PharmographError::DoseGeneration { .. }) => {
            warn!(drug, "dose generation failed: {err}");
            anyhow::bail!(DOSE_FAILURE_ERROR);
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        let output = DoseOutput {
            drug,
            age,
            weight,
            suggestion,
        };
        Ok(render::json::to_pretty(&output)?)
    } else {
        Ok(render::markdown::dose_markdown(drug, &suggestion))
    }
}
