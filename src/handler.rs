use std::sync::Arc;

use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use uuid::Uuid;

use crate::{
    config::{Config, PlaceholderConfig},
    error::{MockupError, Result},
    gemini::{GeminiClient, ImageGenerator},
    models::{Envelope, FormData, GenerateImageRequest, GenerationResult},
    prompt::{build_prompt, PlaceholderSpec},
};

pub const GENERATE_IMAGE_PATH: &str = "/api/generate-image";
pub const MAX_BODY_BYTES: usize = 1 << 20;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(GENERATE_IMAGE_PATH, web::route().to(generate_image));
}

/// Every method is routed here so non-POST requests still get a JSON 405.
/// The body is read by hand so an oversized or broken payload is answered
/// with the JSON failure envelope rather than actix's plain-text error.
pub async fn generate_image(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<MockupService>,
) -> HttpResponse {
    if req.method() != Method::POST {
        log::warn!("🚫 {} {} rejected", req.method(), req.path());
        return HttpResponse::MethodNotAllowed()
            .json(Envelope::rejected(&MockupError::MethodNotAllowed));
    }

    match read_body(payload, MAX_BODY_BYTES).await {
        Ok(body) => service.handle(&body).await.into_response(),
        Err(e) => failure(Uuid::new_v4(), e).into_response(),
    }
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            MockupError::MalformedInput(format!("failed to read request body: {}", e))
        })?;
        if body.len() + chunk.len() > limit {
            return Err(MockupError::MalformedInput(format!(
                "request body exceeds {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[derive(Clone)]
pub struct MockupService {
    generator: Arc<dyn ImageGenerator>,
    placeholder: PlaceholderConfig,
}

impl MockupService {
    pub fn new(generator: Arc<dyn ImageGenerator>, placeholder: PlaceholderConfig) -> Self {
        Self {
            generator,
            placeholder,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::new(config.gemini.clone())?;
        Ok(Self::new(Arc::new(client), config.placeholder.clone()))
    }

    /// Runs one request to a terminal outcome; never returns an error.
    pub async fn handle(&self, body: &[u8]) -> GenerationResult {
        let request_id = Uuid::new_v4();

        let form = match parse_form(body) {
            Ok(form) => form,
            Err(e) => return failure(request_id, e),
        };

        let fallback_url = match PlaceholderSpec::from_form(&form) {
            Ok(spec) => spec.url(&self.placeholder),
            Err(e) => return failure(request_id, e),
        };
        log::debug!("[req:{}] placeholder ready: {}", request_id, fallback_url);

        match self.generate(&form).await {
            Ok(data) => {
                log::info!("✅ [req:{}] mockup generated", request_id);
                GenerationResult::png(&data)
            }
            Err(e) => {
                log::warn!("⚠️  [req:{}] serving placeholder: {}", request_id, e);
                GenerationResult::Fallback {
                    image_url: fallback_url,
                    reason: e.fallback_reason().to_string(),
                }
            }
        }
    }

    async fn generate(&self, form: &FormData) -> Result<String> {
        let prompt = build_prompt(form)?;
        self.generator.generate(&prompt).await
    }
}

fn parse_form(body: &[u8]) -> Result<FormData> {
    GenerateImageRequest::from_slice(body)?.into_form_data()
}

fn failure(request_id: Uuid, e: MockupError) -> GenerationResult {
    log::error!("❌ [req:{}] no placeholder available: {}", request_id, e);
    GenerationResult::Failure {
        error_message: e.to_string(),
    }
}
