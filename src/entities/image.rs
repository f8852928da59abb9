use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use serde::{Serialize, Serializer};

use crate::error::PharmographError;
use crate::prompts;
use crate::sources::genai::{GENAI_API, GenAiClient, GenerateRequest};

/// A generated packaging illustration, held as the base64 payload the
/// service returned. The payload is treated as PNG throughout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    data: String,
}

impl ImageRef {
    pub(crate) fn from_base64(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// The image as a `data:` URI, ready to embed in markup.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.data)
    }

    /// Decodes the payload into raw PNG bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, PharmographError> {
        general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|err| PharmographError::Api {
                api: GENAI_API.to_string(),
                message: format!("image payload is not valid base64: {err}"),
            })
    }

    /// Decodes the payload and writes it to `path` as a PNG file.
    pub fn write_to(&self, path: &Path) -> Result<(), PharmographError> {
        std::fs::write(path, self.decode_bytes()?)?;
        Ok(())
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri())
    }
}

/// Generates a brand-free packaging image for `drug_name`.
///
/// All failure modes, transport errors included, collapse into
/// `ImageGeneration`; the search treats that as a cosmetic loss.
pub(crate) async fn generate(
    client: &GenAiClient,
    drug_name: &str,
) -> Result<ImageRef, PharmographError> {
    let drug_name = drug_name.trim();
    if drug_name.is_empty() {
        return Err(PharmographError::InvalidArgument(
            "Drug name is required. Example: pharmograph search paracetamol".into(),
        ));
    }

    let request = GenerateRequest::from_prompt(prompts::image_prompt(drug_name));
    let response = client
        .generate(prompts::IMAGE_MODEL, &request)
        .await
        .map_err(|err| image_failure(drug_name, err.to_string()))?;

    match response.first_inline_data() {
        Some(inline) => Ok(ImageRef::from_base64(inline.data.clone())),
        None => Err(image_failure(
            drug_name,
            "no inline image data in any content part".into(),
        )),
    }
}

fn image_failure(drug_name: &str, reason: String) -> PharmographError {
    PharmographError::ImageGeneration {
        drug: drug_name.to_string(),
        reason,
    }
}
