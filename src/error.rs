#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PharmographError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("API JSON error from {api}: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "API key required: {api} requires {env_var} environment variable.\n\nTo set:\n  export {env_var}=your-key\n\nMore info: {docs_url}"
    )]
    ApiKeyRequired {
        api: String,
        env_var: String,
        docs_url: String,
    },

    #[error("Monograph generation failed for '{drug}': {reason}")]
    ContentGeneration { drug: String, reason: String },

    #[error("Image generation failed for '{drug}': {reason}")]
    ImageGeneration { drug: String, reason: String },

    #[error("Dose calculation failed for '{drug}': {reason}")]
    DoseGeneration { drug: String, reason: String },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
