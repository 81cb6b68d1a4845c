use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockupError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Gemini API error ({status}): {body}")]
    ProviderError { status: u16, body: String },
    #[error("Gemini API timed out: {0}")]
    ProviderTimeout(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("No image data in response")]
    NoImageData,
}

impl MockupError {
    /// Short reason shown to the caller when a placeholder is served instead.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            MockupError::ConfigError(_) => "API configuration needed",
            MockupError::ProviderError { .. } => "image provider returned an error",
            MockupError::ProviderTimeout(_) => "image provider timed out",
            MockupError::RequestError(_) => "image provider unreachable",
            MockupError::ResponseError(_) => "unreadable image provider response",
            MockupError::NoImageData => "no image returned by provider",
            MockupError::MalformedInput(_) => "incomplete form data",
            MockupError::MethodNotAllowed => "method not allowed",
        }
    }
}

pub type Result<T> = std::result::Result<T, MockupError>;
