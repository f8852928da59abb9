use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::render;
use crate::search::SearchSession;
use crate::sources::genai::GenAiClient;

pub(crate) async fn run(
    drug: &str,
    image_out: Option<&Path>,
    json: bool,
) -> anyhow::Result<String> {
    let session = SearchSession::new(GenAiClient::new()?);
    run_with_session(&session, drug, image_out, json).await
}

async fn run_with_session(
    session: &SearchSession,
    drug: &str,
    image_out: Option<&Path>,
    json: bool,
) -> anyhow::Result<String> {
    let state = session.search(drug).await;

    if let Some(error) = &state.error {
        anyhow::bail!("{error}");
    }

    if let Some(path) = image_out {
        match &state.image {
            Some(image) => image
                .write_to(path)
                .with_context(|| format!("writing image to {}", path.display()))?,
            None => warn!(path = %path.display(), "no image was generated; skipping --image-out"),
        }
    }

    if json {
        Ok(render::json::to_pretty(&state)?)
    } else {
        Ok(render::markdown::state_markdown(&state)?)
    }
}
