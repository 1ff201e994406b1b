//! Pull one JSON value out of free-form model output
//!
//! Models wrap JSON in prose or code fences. The rule here is simple:
//! take everything from the first opening delimiter to the last
//! closing one and hand it to serde. Nothing else in the crate scans model
//! text for JSON.

use crate::core::error::{Result, TugasError};
use serde::de::DeserializeOwned;

/// Which kind of JSON value we expect in a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            JsonShape::Object => "object",
            JsonShape::Array => "array",
        }
    }
}

/// Slice from the first opening delimiter to the last closing delimiter
pub fn extract_json(response: &str, shape: JsonShape) -> Result<&str> {
    let (open, close) = shape.delimiters();
    let start = response.find(open).ok_or_else(|| {
        TugasError::ResponseParse(format!("No JSON {} found in response", shape.describe()))
    })?;
    let end = response.rfind(close).ok_or_else(|| {
        TugasError::ResponseParse(format!("No closing '{}' found in response", close))
    })?;
    if end < start {
        return Err(TugasError::ResponseParse(format!(
            "Closing '{}' appears before opening '{}'",
            close, open
        )));
    }
    Ok(&response[start..=end])
}

/// Extract and deserialize in one step
pub fn parse_embedded<T: DeserializeOwned>(response: &str, shape: JsonShape) -> Result<T> {
    let json_str = extract_json(response, shape)?;
    serde_json::from_str(json_str).map_err(|e| {
        TugasError::ResponseParse(format!(
            "Failed to parse JSON {}: {} - Response: {}",
            shape.describe(),
            e,
            response
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_simple() {
        let response = r#"{"taskName": "Tugas"}"#;
        let json = extract_json(response, JsonShape::Object).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "Berikut hasilnya:\n```json\n{\"taskName\": \"Tugas\", \"tags\": [\"a\"]}\n```\nSemoga membantu!";
        let json = extract_json(response, JsonShape::Object).unwrap();
        assert_eq!(json, "{\"taskName\": \"Tugas\", \"tags\": [\"a\"]}");
    }

    #[test]
    fn test_extract_json_no_json() {
        let result = extract_json("Maaf, saya tidak mengerti", JsonShape::Object);
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));
    }

    #[test]
    fn test_extract_json_reversed_delimiters() {
        let result = extract_json("} oops {", JsonShape::Object);
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));
    }

    #[test]
    fn test_extract_array() {
        let response = "Sub-tugas: [\"Riset\", \"Tulis\"] selesai.";
        assert_eq!(
            extract_json(response, JsonShape::Array).unwrap(),
            "[\"Riset\", \"Tulis\"]"
        );
        assert!(extract_json("tidak ada", JsonShape::Array).is_err());
    }

    #[test]
    fn test_parse_embedded() {
        let items: Vec<String> = parse_embedded("ok [\"a\", \"b\"]", JsonShape::Array).unwrap();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_embedded_spans_two_objects() {
        // first '{' to last '}' covers both objects, which is not valid JSON
        let result: Result<serde_json::Value> =
            parse_embedded("{\"a\": 1} dan {\"b\": 2}", JsonShape::Object);
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));
    }
}
