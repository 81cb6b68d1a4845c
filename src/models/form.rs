use serde::Deserialize;
use serde_json::Value;

use crate::error::{MockupError, Result};

const NOT_SPECIFIED: &str = "not specified";

/// Body posted by the site description form.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(rename = "formData")]
    pub form_data: Option<Value>,
}

impl GenerateImageRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| MockupError::MalformedInput(format!("request body is not valid JSON: {}", e)))
    }

    pub fn into_form_data(self) -> Result<FormData> {
        match self.form_data {
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map_err(|e| MockupError::MalformedInput(format!("invalid formData: {}", e))),
            Some(_) => Err(MockupError::MalformedInput("formData must be an object".into())),
            None => Err(MockupError::MalformedInput("formData is missing".into())),
        }
    }
}

/// Every scalar is kept as raw JSON so a string, boolean or missing value
/// never fails deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormData {
    #[serde(rename = "activityName")]
    pub activity_name: Option<Value>,
    #[serde(rename = "whatIDo")]
    pub what_i_do: Option<Value>,
    #[serde(rename = "sitePurpose")]
    pub site_purpose: Option<Value>,
    pub items: Option<Value>,
    #[serde(rename = "whyChooseMe")]
    pub why_choose_me: Option<Value>,
    pub color1: Option<Value>,
    pub color2: Option<Value>,
    pub color3: Option<Value>,
    #[serde(rename = "siteFeel")]
    pub site_feel: Option<Value>,
    #[serde(rename = "preferredStyle")]
    pub preferred_style: Option<Value>,
    #[serde(rename = "hasLogo")]
    pub has_logo: Option<Value>,
    #[serde(rename = "hasPhotos")]
    pub has_photos: Option<Value>,
    #[serde(rename = "talkingStyle")]
    pub talking_style: Option<Value>,
    #[serde(rename = "selfDescription")]
    pub self_description: Option<Value>,
    pub dislikes: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub phrase: String,
}

impl FormData {
    pub fn activity_name(&self) -> Result<&str> {
        self.activity_name
            .as_ref()
            .and_then(Value::as_str)
            .ok_or_else(|| MockupError::MalformedInput("activityName must be a string".into()))
    }

    /// Offerings with a non-empty name, in submission order.
    pub fn items(&self) -> Result<Vec<Item>> {
        let entries = match &self.items {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(MockupError::MalformedInput("items must be an array".into())),
        };

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name").and_then(Value::as_str)?;
                if name.is_empty() {
                    return None;
                }
                let phrase = entry
                    .get("phrase")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Some(Item {
                    name: name.to_string(),
                    phrase: phrase.to_string(),
                })
            })
            .collect())
    }
}

/// Render a free-form field for the prompt.
pub fn field_text(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_SPECIFIED.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => NOT_SPECIFIED.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> FormData {
        GenerateImageRequest {
            form_data: Some(value),
        }
        .into_form_data()
        .unwrap()
    }

    #[test]
    fn test_items_skip_empty_names_and_keep_order() {
        let data = form(json!({
            "items": [
                {"name": "Bread", "phrase": "baked daily"},
                {"name": "", "phrase": "ignored"},
                {"phrase": "no name"},
                {"name": "Cakes", "phrase": "to order"}
            ]
        }));
        let names: Vec<_> = data.items().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Bread", "Cakes"]);
    }

    #[test]
    fn test_missing_items_is_empty() {
        assert!(form(json!({})).items().unwrap().is_empty());
    }

    #[test]
    fn test_items_not_array_is_malformed() {
        let data = form(json!({"items": "bread"}));
        assert!(matches!(data.items(), Err(MockupError::MalformedInput(_))));
    }

    #[test]
    fn test_activity_name_required() {
        let data = form(json!({"activityName": 42}));
        assert!(data.activity_name().is_err());
        assert_eq!(form(json!({"activityName": "Bakery"})).activity_name().unwrap(), "Bakery");
    }

    #[test]
    fn test_form_data_shape() {
        let missing = GenerateImageRequest { form_data: None };
        assert!(matches!(
            missing.into_form_data(),
            Err(MockupError::MalformedInput(_))
        ));
        let scalar = GenerateImageRequest {
            form_data: Some(json!("text")),
        };
        assert!(scalar.into_form_data().is_err());
        assert!(GenerateImageRequest::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&Some(json!(true))), "true");
        assert_eq!(field_text(&Some(json!("Warm"))), "Warm");
        assert_eq!(field_text(&None), "not specified");
        assert_eq!(field_text(&Some(json!(""))), "not specified");
    }
}
