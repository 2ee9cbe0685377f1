use thiserror::Error;

/// Failures raised by an answer engine backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("api key not configured (set {env})")]
    MissingApiKey { env: String },

    #[error("unsupported backend provider: {0}")]
    UnsupportedProvider(String),

    #[error("failed to build http client")]
    Client(#[source] anyhow::Error),

    #[error("unauthorized (check api key)")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited,

    #[error("unexpected status: {status}: {body_snippet}")]
    HttpStatus { status: u16, body_snippet: String },

    #[error("transport error")]
    Transport(#[source] anyhow::Error),

    #[error("decode/serde error")]
    Decode(#[source] anyhow::Error),

    #[error("stream interrupted: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Validation(String),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to generate summary after retries")]
    Engine(#[source] EngineError),

    #[error("received empty summary after retries")]
    Empty,
}

/// Errors that abort the process before or outside of query execution.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration validation failed: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize answer engine: {0}")]
    EngineInit(#[source] EngineError),

    #[error("failed to encode output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
