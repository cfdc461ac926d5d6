use serde_json::Value;

use crate::error::GenerateError;

const FENCE_OPEN: &str = "```json";
const FENCE: &str = "```";

/// Pick the JSON candidate out of model output that may be wrapped in a
/// fenced block or surrounded by prose.
///
/// In order: the body of the first ```` ```json ```` fence (tag matched
/// case-insensitively), then everything from the first `{` to the last `}`,
/// then the text unchanged.
pub fn extract_json(text: &str) -> &str {
    if let Some(inner) = fenced_json(text) {
        return inner;
    }

    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if last > first {
            return &text[first..=last];
        }
    }

    text
}

fn fenced_json(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets valid for `text`.
    let lower = text.to_ascii_lowercase();
    let body_start = lower.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let body_end = body_start + lower[body_start..].find(FENCE)?;

    let inner = text[body_start..body_end].trim();
    (!inner.is_empty()).then_some(inner)
}

/// Parse the `prompt` field out of raw model output, trimmed.
///
/// Output that is not JSON is a `Parse` error. JSON without a usable
/// `prompt` field, including JSON that is not an object at all, is
/// `MissingPrompt`. A `prompt` that is not a string is a `Parse` error.
pub fn parse_prompt(raw: &str) -> Result<String, GenerateError> {
    let parse_error = || GenerateError::Parse {
        raw: raw.to_string(),
    };
    let missing = || GenerateError::MissingPrompt {
        raw: raw.to_string(),
    };

    let value: Value = serde_json::from_str(extract_json(raw)).map_err(|_| parse_error())?;

    match value.get("prompt") {
        None | Some(Value::Null) => Err(missing()),
        Some(Value::String(prompt)) => match prompt.trim() {
            "" => Err(missing()),
            prompt => Ok(prompt.to_string()),
        },
        Some(_) => Err(parse_error()),
    }
}
