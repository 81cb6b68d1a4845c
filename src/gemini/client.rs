use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::GeminiConfig,
    error::{MockupError, Result},
    gemini::{extractor::extract_image_data, ImageGenerator},
    logger,
    models::{GenerateContentRequest, PredictRequest},
};

const RETRY_BASE_DELAY_MS: u64 = 250;
const RETRY_JITTER_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStyle {
    GenerateContent,
    Predict,
}

impl EndpointStyle {
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("imagen") {
            EndpointStyle::Predict
        } else {
            EndpointStyle::GenerateContent
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            EndpointStyle::GenerateContent => "generateContent",
            EndpointStyle::Predict => "predict",
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MockupError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn endpoint_style(&self) -> EndpointStyle {
        EndpointStyle::for_model(&self.config.model)
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.endpoint_style().method()
        )
    }

    fn payload(&self, prompt: &str) -> Result<Value> {
        match self.endpoint_style() {
            EndpointStyle::GenerateContent => serde_json::to_value(GenerateContentRequest::new(prompt)),
            EndpointStyle::Predict => serde_json::to_value(PredictRequest::new(prompt)),
        }
        .map_err(|e| MockupError::RequestError(format!("failed to serialize request: {}", e)))
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        // Checked before any network traffic so a missing key costs nothing.
        let api_key = self.config.resolve_api_key()?;
        let endpoint = self.endpoint();
        let payload = self.payload(prompt)?;

        log::info!("🎨 Generating mockup with model: {}", self.config.model);
        let _timer = logger::timer("gemini image generation");

        let mut attempt = 0;
        let response = loop {
            match self.send_once(&endpoint, &api_key, &payload).await {
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    let delay = retry_delay(attempt);
                    log::warn!(
                        "⚠️  Gemini call failed ({}), retrying in {}ms",
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => break other?,
            }
        };

        let data = extract_image_data(&response)?;
        let bytes = STANDARD
            .decode(data.as_bytes())
            .map_err(|e| MockupError::ResponseError(format!("invalid base64 image data: {}", e)))?;
        log::info!("✅ Image generated: {} bytes", bytes.len());

        Ok(data)
    }

    async fn send_once(&self, endpoint: &str, api_key: &str, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(endpoint)
            .query(&[("key", api_key)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Gemini API returned {}: {}", status, body);
            return Err(MockupError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                MockupError::ProviderTimeout(e.to_string())
            } else {
                MockupError::ResponseError(format!("response is not JSON: {}", e))
            }
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_image(prompt).await
    }
}

fn transport_error(e: reqwest::Error) -> MockupError {
    if e.is_timeout() {
        MockupError::ProviderTimeout(e.to_string())
    } else {
        MockupError::RequestError(e.to_string())
    }
}

fn is_retryable(e: &MockupError) -> bool {
    matches!(
        e,
        MockupError::ProviderTimeout(_) | MockupError::RequestError(_)
    )
}

/// Exponential back-off with random jitter.
pub fn retry_delay(attempt: u32) -> Duration {
    let base = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt.min(6));
    let jitter = rand::thread_rng().gen_range(0..=RETRY_JITTER_MS);
    Duration::from_millis(base + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    // 1x1 transparent PNG
    const PNG_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    /// Plays the provider on an ephemeral port and counts calls.
    fn spawn_provider(status: u16, body: Value, delay: Duration) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let server = HttpServer::new(move || {
            let body = body.clone();
            let counter = counter.clone();
            App::new().default_service(web::to(move |req: HttpRequest| {
                let body = body.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    actix_rt::time::sleep(delay).await;
                    if !req.query_string().contains("key=test-key") {
                        return HttpResponse::Unauthorized().json(json!({"error": "bad key"}));
                    }
                    HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(body)
                }
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_rt::spawn(server.run());
        (format!("http://{}", addr), calls)
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(
            GeminiConfig::new()
                .without_env_key()
                .with_api_key("test-key")
                .with_base_url(base_url),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_style_from_model() {
        assert_eq!(
            EndpointStyle::for_model("gemini-2.5-flash-image"),
            EndpointStyle::GenerateContent
        );
        assert_eq!(
            EndpointStyle::for_model("imagen-4.0-generate-001"),
            EndpointStyle::Predict
        );
    }

    #[test]
    fn test_endpoint_url() {
        let client = GeminiClient::new(GeminiConfig::new().with_base_url("http://localhost/v1beta/"))
            .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn test_retry_delay_bounds() {
        for _ in 0..20 {
            let first = retry_delay(0).as_millis() as u64;
            assert!((250..=500).contains(&first));
            let second = retry_delay(1).as_millis() as u64;
            assert!((500..=750).contains(&second));
        }
    }

    #[actix_rt::test]
    async fn test_missing_key_makes_no_call() {
        let (base_url, calls) = spawn_provider(200, json!({}), Duration::ZERO);
        let client = GeminiClient::new(
            GeminiConfig::new()
                .with_api_key_env("SITEMOCK_TEST_UNSET_KEY_C")
                .with_base_url(base_url),
        )
        .unwrap();

        let err = client.generate_image("prompt").await.unwrap_err();
        assert!(matches!(err, MockupError::ConfigError(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_generate_content_success() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is the homepage"},
                    {"inlineData": {"mimeType": "image/png", "data": PNG_B64}}
                ]}
            }]
        });
        let (base_url, calls) = spawn_provider(200, body, Duration::ZERO);

        let data = client(&base_url).generate_image("prompt").await.unwrap();
        assert_eq!(data, PNG_B64);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_predict_success() {
        let body = json!({"predictions": [{"bytesBase64Encoded": PNG_B64}]});
        let (base_url, _) = spawn_provider(200, body, Duration::ZERO);
        let client = GeminiClient::new(
            GeminiConfig::new()
                .without_env_key()
                .with_api_key("test-key")
                .with_model("imagen-4.0-generate-001")
                .with_base_url(base_url),
        )
        .unwrap();

        assert_eq!(client.generate_image("prompt").await.unwrap(), PNG_B64);
    }

    #[actix_rt::test]
    async fn test_provider_error_is_not_retried() {
        let (base_url, calls) =
            spawn_provider(500, json!({"error": {"message": "quota"}}), Duration::ZERO);

        match client(&base_url).generate_image("prompt").await {
            Err(MockupError::ProviderError { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("quota"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_response_without_image() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "no image"}]}}]});
        let (base_url, _) = spawn_provider(200, body, Duration::ZERO);

        assert!(matches!(
            client(&base_url).generate_image("prompt").await,
            Err(MockupError::NoImageData)
        ));
    }

    #[actix_rt::test]
    async fn test_invalid_base64_is_response_error() {
        let body = json!({"predictions": [{"bytesBase64Encoded": "not base64!!"}]});
        let (base_url, _) = spawn_provider(200, body, Duration::ZERO);

        assert!(matches!(
            client(&base_url).generate_image("prompt").await,
            Err(MockupError::ResponseError(_))
        ));
    }

    #[actix_rt::test]
    async fn test_timeout_retried_once() {
        let (base_url, calls) = spawn_provider(200, json!({}), Duration::from_secs(2));
        let client = GeminiClient::new(
            GeminiConfig::new()
                .without_env_key()
                .with_api_key("test-key")
                .with_base_url(base_url)
                .with_timeout(Duration::from_millis(100))
                .with_max_retries(1),
        )
        .unwrap();

        assert!(matches!(
            client.generate_image("prompt").await,
            Err(MockupError::ProviderTimeout(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
