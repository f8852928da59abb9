//! Shared HTTP utilities and the client for the generation service.

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::PharmographError;

pub(crate) mod genai;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(Cow::Owned)
        .unwrap_or_else(|| Cow::Borrowed(default))
}

/// Returns the shared HTTP client.
///
/// Plain reqwest with transport timeouts only: requests are never retried
/// and responses are never cached.
pub(crate) fn shared_client() -> Result<reqwest::Client, PharmographError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("pharmograph/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PharmographError::HttpClientInit)?;

    match HTTP_CLIENT.set(client.clone()) {
        Ok(()) => Ok(client),
        Err(_) => HTTP_CLIENT
            .get()
            .cloned()
            .ok_or_else(|| PharmographError::Api {
                api: "http-client".into(),
                message: "Shared HTTP client initialization race".into(),
            }),
    }
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, PharmographError> {
    let mut body: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let next_len = body.len().saturating_add(chunk.len());
        if next_len > DEFAULT_MAX_BODY_BYTES {
            return Err(PharmographError::Api {
                api: api.to_string(),
                message: format!("Response body exceeded {DEFAULT_MAX_BODY_BYTES} bytes"),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn body_excerpt_collapses_newlines_in_short_bodies() {
        let excerpt = body_excerpt(b"{\n\"error\": \"bad\trequest\"\n}");
        assert_eq!(excerpt, "{ \"error\": \"bad request\" }");
        assert!(!excerpt.ends_with('…'));
    }

    #[test]
    fn body_excerpt_truncates_long_bodies_at_char_boundary() {
        // Two-byte chars so the byte cap lands mid-character.
        let body = "é".repeat(2_000);
        let excerpt = body_excerpt(body.as_bytes());
        assert!(excerpt.ends_with(" …"));
        assert!(excerpt.len() <= ERROR_BODY_MAX_BYTES + " …".len());
        assert!(excerpt.trim_end_matches(" …").chars().all(|c| c == 'é'));
    }

    #[test]
    fn env_base_falls_back_to_default_when_unset() {
        let base = env_base("https://example.org", "PHARMOGRAPH_TEST_UNSET_BASE");
        assert_eq!(base, "https://example.org");
    }

    #[tokio::test]
    async fn read_limited_body_returns_full_small_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/body"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
            .mount(&server)
            .await;

        let resp = reqwest::get(format!("{}/body", server.uri()))
            .await
            .expect("request should succeed");
        let body = read_limited_body(resp, "test-api")
            .await
            .expect("body should be under the limit");
        assert_eq!(body, b"hello world");
    }
}
