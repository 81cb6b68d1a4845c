use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::MockupError;

/// Terminal outcome of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success { image_url: String },
    Fallback { image_url: String, reason: String },
    Failure { error_message: String },
}

/// JSON body returned to the caller for every outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Body for a request refused before any generation stage ran.
    pub fn rejected(err: &MockupError) -> Self {
        Envelope {
            error: Some(err.to_string()),
            ..Default::default()
        }
    }
}

impl GenerationResult {
    pub fn png(base64_data: &str) -> Self {
        GenerationResult::Success {
            image_url: format!("data:image/png;base64,{}", base64_data),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GenerationResult::Success { .. } | GenerationResult::Fallback { .. } => StatusCode::OK,
            GenerationResult::Failure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(&self) -> Envelope {
        match self {
            GenerationResult::Success { image_url } => Envelope {
                success: Some(true),
                image_url: Some(image_url.clone()),
                ..Default::default()
            },
            GenerationResult::Fallback { image_url, reason } => Envelope {
                success: Some(true),
                image_url: Some(image_url.clone()),
                fallback: Some(true),
                message: Some(format!("Using placeholder - {}", reason)),
                ..Default::default()
            },
            GenerationResult::Failure { error_message } => Envelope {
                success: Some(false),
                error: Some(error_message.clone()),
                fallback: Some(true),
                ..Default::default()
            },
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self.envelope())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let result = GenerationResult::png("iVBORw0KGgo=");
        assert_eq!(result.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(result.envelope()).unwrap(),
            json!({"success": true, "imageUrl": "data:image/png;base64,iVBORw0KGgo="})
        );
    }

    #[test]
    fn test_fallback_envelope() {
        let result = GenerationResult::Fallback {
            image_url: "https://via.placeholder.com/1200x675/cccccc/333333?text=x".into(),
            reason: "API configuration needed".into(),
        };
        assert_eq!(result.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(result.envelope()).unwrap(),
            json!({
                "success": true,
                "imageUrl": "https://via.placeholder.com/1200x675/cccccc/333333?text=x",
                "fallback": true,
                "message": "Using placeholder - API configuration needed"
            })
        );
    }

    #[test]
    fn test_failure_envelope() {
        let result = GenerationResult::Failure {
            error_message: "Malformed input: formData is missing".into(),
        };
        assert_eq!(result.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(result.envelope()).unwrap(),
            json!({
                "success": false,
                "error": "Malformed input: formData is missing",
                "fallback": true
            })
        );
    }

    #[test]
    fn test_method_not_allowed_envelope() {
        assert_eq!(
            serde_json::to_value(Envelope::rejected(&MockupError::MethodNotAllowed)).unwrap(),
            json!({"error": "Method not allowed"})
        );
    }
}
