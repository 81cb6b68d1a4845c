use serde::Serialize;

pub const ASPECT_RATIO: &str = "16:9";
pub const SAMPLE_COUNT: u32 = 1;
pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
pub const IMAGEN_SAFETY_FILTER_LEVEL: &str = "block_medium_and_above";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

// generateContent

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    pub response_modalities: Vec<String>,
    #[serde(rename = "candidateCount")]
    pub candidate_count: u32,
    #[serde(rename = "imageConfig")]
    pub image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
pub struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: String,
}

#[derive(Debug, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
                candidate_count: SAMPLE_COUNT,
                image_config: ImageConfig {
                    aspect_ratio: ASPECT_RATIO.to_string(),
                },
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: SAFETY_THRESHOLD.to_string(),
                })
                .collect(),
        }
    }
}

// predict (Imagen)

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct PredictParameters {
    #[serde(rename = "sampleCount")]
    pub sample_count: u32,
    #[serde(rename = "aspectRatio")]
    pub aspect_ratio: String,
    #[serde(rename = "safetyFilterLevel")]
    pub safety_filter_level: String,
}

impl PredictRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: SAMPLE_COUNT,
                aspect_ratio: ASPECT_RATIO.to_string(),
                safety_filter_level: IMAGEN_SAFETY_FILTER_LEVEL.to_string(),
            },
        }
    }
}
