use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaidanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech synthesis error: {0}")]
    Synth(String),

    #[error("Scene rendering error: {0}")]
    Render(String),

    #[error("Render failed and no fragment was salvageable: {0}")]
    RenderUnrecoverable(String),

    #[error("Audio/video combine error: {0}")]
    Combine(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Content fetch error: {0}")]
    Content(String),

    #[error("Dialogue script error: {0}")]
    Dialogue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, TaidanError>;
