use serde::{Deserialize, Deserializer};

/// Deserializes an optional string, trimming it and mapping blank input to `None`.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
        description: Option<String>,
    }

    fn parse(json: &str) -> Option<String> {
        serde_json::from_str::<Body>(json).unwrap().description
    }

    #[test]
    fn test_blank_and_missing_become_none() {
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"description": null}"#), None);
        assert_eq!(parse(r#"{"description": "   "}"#), None);
    }

    #[test]
    fn test_value_is_trimmed() {
        assert_eq!(
            parse(r#"{"description": "  Period 3  "}"#),
            Some("Period 3".to_string())
        );
    }
}
