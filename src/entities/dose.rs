use crate::error::PharmographError;
use crate::prompts;
use crate::sources::genai::{GenAiClient, GenerateRequest};

/// Asks for an individualized dose suggestion as free text.
///
/// The reply is prose by contract (`Do not return JSON` is part of the
/// instruction), so the only post-processing is a trim.
pub(crate) async fn suggest(
    client: &GenAiClient,
    drug_name: &str,
    age: u32,
    weight: f64,
) -> Result<String, PharmographError> {
    let drug_name = drug_name.trim();
    if drug_name.is_empty() {
        return Err(PharmographError::InvalidArgument(
            "Drug name is required. Example: pharmograph dose paracetamol --age 35 --weight 70"
                .into(),
        ));
    }
    if age == 0 {
        return Err(PharmographError::InvalidArgument(
            "--age must be at least 1 year".into(),
        ));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(PharmographError::InvalidArgument(
            "--weight must be a positive number of kilograms".into(),
        ));
    }

    let request = GenerateRequest::from_prompt(prompts::dose_prompt(drug_name, age, weight))
        .with_system_instruction(prompts::DOSE_SYSTEM_INSTRUCTION)
        .with_temperature(prompts::TEXT_TEMPERATURE);

    let response = client
        .generate(prompts::DOSE_MODEL, &request)
        .await
        .map_err(|err| dose_failure(drug_name, err.to_string()))?;

    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        return Err(dose_failure(drug_name, "empty response payload".into()));
    }
    Ok(text.to_string())
}

fn dose_failure(drug_name: &str, reason: String) -> PharmographError {
    PharmographError::DoseGeneration {
        drug: drug_name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn suggest_rejects_zero_age_without_calling_out() {
        let client = GenAiClient::new_for_test("http://127.0.0.1".into(), "test-key").unwrap();
        let err = suggest(&client, "Paracetamol", 0, 70.0).await.unwrap_err();
        assert!(matches!(err, PharmographError::InvalidArgument(_)));
        assert!(err.to_string().contains("--age"));
    }

    #[tokio::test]
    async fn suggest_rejects_nonpositive_weight() {
        let client = GenAiClient::new_for_test("http://127.0.0.1".into(), "test-key").unwrap();
        let err = suggest(&client, "Paracetamol", 35, 0.0).await.unwrap_err();
        assert!(matches!(err, PharmographError::InvalidArgument(_)));

        let err = suggest(&client, "Paracetamol", 35, f64::NAN).await.unwrap_err();
        assert!(matches!(err, PharmographError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn suggest_rejects_blank_drug_name() {
        let client = GenAiClient::new_for_test("http://127.0.0.1".into(), "test-key").unwrap();
        let err = suggest(&client, "  ", 35, 70.0).await.unwrap_err();
        assert!(matches!(err, PharmographError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn suggest_trims_free_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:generateContent",
                prompts::DOSE_MODEL
            )))
            .and(body_string_contains("35 years old"))
            .and(body_string_contains("weighs 70 kg"))
            .and(body_string_contains("clinical pharmacist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"text": "\n  Suggested dose: 1000 mg every 6 hours.  \n"}
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenAiClient::new_for_test(server.uri(), "test-key").unwrap();
        let suggestion = suggest(&client, "Paracetamol", 35, 70.0).await.unwrap();
        assert_eq!(suggestion, "Suggested dose: 1000 mg every 6 hours.");
    }

    #[tokio::test]
    async fn suggest_fails_on_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:generateContent",
                prompts::DOSE_MODEL
            )))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GenAiClient::new_for_test(server.uri(), "test-key").unwrap();
        let err = suggest(&client, "Paracetamol", 35, 70.0).await.unwrap_err();
        match err {
            PharmographError::DoseGeneration { drug, reason } => {
                assert_eq!(drug, "Paracetamol");
                assert!(reason.contains("empty response payload"));
            }
            other => panic!("expected DoseGeneration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn suggest_collapses_http_failure_into_dose_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1beta/models/{}:generateContent",
                prompts::DOSE_MODEL
            )))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GenAiClient::new_for_test(server.uri(), "test-key").unwrap();
        let err = suggest(&client, "Paracetamol", 35, 70.0).await.unwrap_err();
        assert!(matches!(err, PharmographError::DoseGeneration { .. }));
    }
}
