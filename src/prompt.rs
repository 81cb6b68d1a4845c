use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::{
    config::PlaceholderConfig,
    error::Result,
    models::{field_text, FormData, Item},
};

pub const DEFAULT_PRIMARY_COLOR: &str = "cccccc";
pub const DEFAULT_ACCENT_COLOR: &str = "333333";
pub const LABEL_MAX_CHARS: usize = 30;

// Characters left untouched by JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Everything needed to render a placeholder when generation is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec {
    pub primary_color: String,
    pub accent_color: String,
    pub label: String,
}

impl PlaceholderSpec {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let label = form.activity_name()?.chars().take(LABEL_MAX_CHARS).collect();

        Ok(Self {
            primary_color: normalize_color(form.color1.as_ref(), DEFAULT_PRIMARY_COLOR),
            accent_color: normalize_color(form.color3.as_ref(), DEFAULT_ACCENT_COLOR),
            label,
        })
    }

    pub fn url(&self, config: &PlaceholderConfig) -> String {
        format!(
            "{}/{}/{}/{}?text={}",
            config.base_url.trim_end_matches('/'),
            config.size,
            self.primary_color,
            self.accent_color,
            utf8_percent_encode(&self.label, URI_COMPONENT)
        )
    }
}

/// `#rrggbb` becomes `rrggbb`; anything else becomes `default`.
// Hex digits are required, not just the length, since the value is spliced
// into the placeholder URL path and must not carry `/`, `?` or `#`.
pub fn normalize_color(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(color)
            if color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            color[1..].to_string()
        }
        _ => default.to_string(),
    }
}

pub fn items_list(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| format!("{} ({})", item.name, item.phrase))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_prompt(form: &FormData) -> Result<String> {
    let activity_name = form.activity_name()?;
    let items = items_list(&form.items()?);

    Ok(format!(
        r#"Generate a professional, realistic mockup image of a modern website homepage for "{activity_name}".

Website details:
- Business: {what_i_do}
- Purpose: {site_purpose}
- Main offerings: {items}
- Value proposition: {why_choose_me}
- Color scheme: Primary {color1}, Secondary {color2}, Accent {color3}
- Desired feel: {site_feel}
- Style preference: {preferred_style}
- Has logo: {has_logo}
- Has photos: {has_photos}
- Communication tone: {talking_style}
- Self-description: {self_description}
- Dislikes: {dislikes}

Create a complete website mockup showing the full homepage layout including navigation bar, hero section with the business name prominently displayed, product/service cards, about section, and contact area. The design should be modern, professional, and reflect the specified colors and style preferences. Show this as if viewed on a desktop or mobile browser."#,
        activity_name = activity_name,
        what_i_do = field_text(&form.what_i_do),
        site_purpose = field_text(&form.site_purpose),
        items = items,
        why_choose_me = field_text(&form.why_choose_me),
        color1 = field_text(&form.color1),
        color2 = field_text(&form.color2),
        color3 = field_text(&form.color3),
        site_feel = field_text(&form.site_feel),
        preferred_style = field_text(&form.preferred_style),
        has_logo = field_text(&form.has_logo),
        has_photos = field_text(&form.has_photos),
        talking_style = field_text(&form.talking_style),
        self_description = field_text(&form.self_description),
        dislikes = field_text(&form.dislikes),
    ))
}
