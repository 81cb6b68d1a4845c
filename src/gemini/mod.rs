pub mod client;
pub mod extractor;

use crate::error::Result;
use async_trait::async_trait;

pub use client::{EndpointStyle, GeminiClient};
pub use extractor::extract_image_data;

/// Produces base64-encoded PNG bytes for a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
