use serde_json::Value;

use crate::error::{MockupError, Result};

/// Tries one known response layout, returning `None` when it does not match.
pub type ShapeMatcher = fn(&Value) -> Option<String>;

/// Matchers in the order they are tried; the first hit wins.
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("candidates", match_candidate_parts as ShapeMatcher),
    ("predictions", match_predictions as ShapeMatcher),
];

pub fn extract_image_data(response: &Value) -> Result<String> {
    for (shape, matcher) in SHAPE_MATCHERS {
        if let Some(data) = matcher(response) {
            log::debug!("Image data found in '{}' shape", shape);
            return Ok(data);
        }
    }
    Err(MockupError::NoImageData)
}

/// `candidates[*].content.parts[*].inlineData.data`
pub fn match_candidate_parts(response: &Value) -> Option<String> {
    response
        .get("candidates")?
        .as_array()?
        .iter()
        .filter_map(|candidate| candidate.get("content")?.get("parts")?.as_array())
        .flatten()
        .find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            inline
                .get("data")
                .and_then(Value::as_str)
                .filter(|data| !data.is_empty())
                .map(str::to_string)
        })
}

/// `predictions[0].bytesBase64Encoded`
pub fn match_predictions(response: &Value) -> Option<String> {
    response
        .get("predictions")?
        .as_array()?
        .first()?
        .get("bytesBase64Encoded")
        .and_then(Value::as_str)
        .filter(|data| !data.is_empty())
        .map(str::to_string)
}
