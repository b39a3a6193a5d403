//! Numeric fields arrive as free text from the editor and as either strings or
//! numbers from the backend. Drafts keep them as text; synthesis coerces them.

use serde::{Deserialize, Deserializer};

/// Parse a whole number out of editor text.
///
/// Surrounding whitespace is ignored. Anything else that is not a base-10
/// integer (including an empty string) yields `None`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// True when the text is empty after trimming.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

/// Deserialize a string, number, boolean or null into editor text.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Integer(number)) => number.to_string(),
        Some(TextOrNumber::Float(number)) if number.fract() == 0.0 => {
            format!("{}", number as i64)
        }
        Some(TextOrNumber::Float(number)) => number.to_string(),
        Some(TextOrNumber::Flag(flag)) => flag.to_string(),
    })
}
