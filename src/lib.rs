//! Turns a website description form into a homepage mockup image.
//!
//! A single POST endpoint builds a prompt from the form, asks the Gemini
//! image API for a render and answers with a `data:` URI. When generation is
//! unavailable the caller still receives a placeholder image URL coloured
//! from the form.

pub mod config;
pub mod error;
pub mod gemini;
pub mod handler;
pub mod logger;
pub mod models;
pub mod prompt;

pub use config::{Config, GeminiConfig, PlaceholderConfig};
pub use error::{MockupError, Result};
pub use gemini::{GeminiClient, ImageGenerator};
pub use handler::{configure, MockupService, GENERATE_IMAGE_PATH};
pub use models::{Envelope, FormData, GenerationResult};
pub use prompt::{build_prompt, normalize_color, PlaceholderSpec};
