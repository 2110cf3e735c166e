//! Response envelope decoding
//!
//! The generation endpoint does not commit to one response envelope, so the
//! body is matched against known shapes in a fixed order and the first match
//! wins:
//!
//! 1. `{"data": {"choices": [{"message": {"content": "..."}}]}}`
//! 2. `{"response": "..."}`
//! 3. `{"message": "..."}`
//! 4. `{"data": ...}` (strings verbatim, anything else as JSON)
//!
//! A body matching none of these is a normalization miss. It is not an
//! error: the caller receives [`REPHRASE_GUIDANCE`] as ordinary text.

use serde_json::Value;

/// Returned when the response body has no recognizable text
pub const REPHRASE_GUIDANCE: &str = "I received your question but couldn't generate a proper response. Please try rephrasing your question.";

/// A decoded response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    ChatCompletion(String),
    Response(String),
    Message(String),
    Data(String),
    Unrecognized,
}

impl ResponseShape {
    pub fn decode(body: &Value) -> Self {
        let data = body.get("data");

        if let Some(content) = data.and_then(chat_completion_content) {
            return ResponseShape::ChatCompletion(content);
        }
        if let Some(text) = non_empty_str(body.get("response")) {
            return ResponseShape::Response(text);
        }
        if let Some(text) = non_empty_str(body.get("message")) {
            return ResponseShape::Message(text);
        }
        match data {
            Some(Value::String(s)) if !s.is_empty() => ResponseShape::Data(s.clone()),
            Some(value) if is_truthy(value) => ResponseShape::Data(value.to_string()),
            _ => ResponseShape::Unrecognized,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, ResponseShape::Unrecognized)
    }

    pub fn into_text(self) -> String {
        match self {
            ResponseShape::ChatCompletion(text)
            | ResponseShape::Response(text)
            | ResponseShape::Message(text)
            | ResponseShape::Data(text) => text,
            ResponseShape::Unrecognized => REPHRASE_GUIDANCE.to_string(),
        }
    }
}

/// Decode a body straight to display text
pub fn normalize_response(body: &Value) -> String {
    ResponseShape::decode(body).into_text()
}

fn chat_completion_content(data: &Value) -> Option<String> {
    // Path lookup only; sibling choices and the shape of the rest are ignored
    data.as_object()?
        .get("choices")?
        .as_array()?
        .first()?
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Truthiness as the upstream envelope producers use it: null, false, zero
/// and the empty string are absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
