use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const PREFIX_PREVIEW_CHARS: usize = 80;

/// Pulls the JSON object spanning the first `{` to the last `}` out of free-form
/// model output. Returns `None` (and logs) when there is no such span or it does
/// not parse; retrying is up to the caller.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            warn!(
                "JSON extraction failed - no object delimiters, input_length={}",
                text.chars().count()
            );
            return None;
        }
    };

    let candidate = &text[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(v) => {
            debug!(
                "JSON extracted - input_length={}, object_length={}",
                text.chars().count(),
                candidate.chars().count()
            );
            Some(v)
        }
        Err(e) => {
            warn!(
                "JSON extraction failed - input_length={}, error={}, prefix={:?}",
                text.chars().count(),
                e,
                candidate.chars().take(PREFIX_PREVIEW_CHARS).collect::<String>()
            );
            None
        }
    }
}

/// `extract_json_object` followed by a typed decode.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Option<T> {
    let value = extract_json_object(text)?;
    match serde_json::from_value(value) {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("JSON extraction produced unexpected shape - error={}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn object_embedded_in_prose_round_trips() {
        let obj = json!({
            "visualization_requests": [
                {"purpose": "data", "related_content": "매출이 {30%} 증가"}
            ],
            "nested": {"a": [1, 2, {"b": null}]},
            "text": "괄호 } 포함"
        });
        let text = format!("다음은 결과입니다:\n```json\n{}\n```\n끝.", obj);
        assert_eq!(extract_json_object(&text), Some(obj));
    }

    #[test]
    fn missing_delimiters_yield_none() {
        assert_eq!(extract_json_object("JSON이 없습니다"), None);
        assert_eq!(extract_json_object("} 순서가 뒤집힘 {"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn unparsable_span_yields_none() {
        assert_eq!(extract_json_object("{\"a\": 1,, }"), None);
        // two objects: the first-to-last span is not valid JSON
        assert_eq!(extract_json_object("{\"a\":1} and {\"b\":2}"), None);
    }

    #[test]
    fn typed_extraction() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Envelope {
            sections: Vec<String>,
        }
        let got: Option<Envelope> = extract_as("ok {\"sections\": [\"a\"]} done");
        assert_eq!(got, Some(Envelope { sections: vec!["a".into()] }));
        let wrong: Option<Envelope> = extract_as("{\"other\": 1}");
        assert_eq!(wrong, None);
    }
}
