use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CATEGORY: &str = "General";

/// Author label shown when a quote has no author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// The only domain entity. Identity is structural; there is no id field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Quote {
    /// Build a sanitized quote. Returns `None` when the trimmed text is empty.
    pub fn new(text: &str, author: &str, category: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            author: author.trim().to_string(),
            category: normalize_category(category),
        })
    }

    /// Lenient coercion from an arbitrary JSON value (stored data, imports).
    /// Strings are trimmed, numbers and booleans stringified, anything else
    /// treated as empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Self::new(
            &coerce_field(obj.get("text")),
            &coerce_field(obj.get("author")),
            &coerce_field(obj.get("category")),
        )
    }

    pub fn author_label(&self) -> &str {
        if self.author.is_empty() {
            UNKNOWN_AUTHOR
        } else {
            &self.author
        }
    }
}

/// Trim a category, falling back to the default when empty.
pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn coerce_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce every element, silently dropping those without usable text.
pub fn sanitize_values(values: &[Value]) -> Vec<Quote> {
    values.iter().filter_map(Quote::from_value).collect()
}

/// Built-in set used on first run and whenever stored data is unusable.
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Franklin D. Roosevelt",
        ),
        (
            "Life is what happens when you're busy making other plans.",
            "John Lennon",
        ),
        (
            "Do not go where the path may lead, go instead where there is no path and leave a trail.",
            "Ralph Waldo Emerson",
        ),
    ]
    .into_iter()
    .map(|(text, author)| Quote {
        text: text.to_string(),
        author: author.to_string(),
        category: DEFAULT_CATEGORY.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_trims_and_defaults_category() {
        let q = Quote::new("  Stay hungry ", " Steve Jobs ", "  ").unwrap();
        assert_eq!(q.text, "Stay hungry");
        assert_eq!(q.author, "Steve Jobs");
        assert_eq!(q.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_new_rejects_blank_text() {
        assert!(Quote::new("   ", "someone", "A").is_none());
    }

    #[test]
    fn test_from_value_coerces_fields() {
        let q = Quote::from_value(&json!({"text": 42, "author": true})).unwrap();
        assert_eq!(q.text, "42");
        assert_eq!(q.author, "true");
        assert_eq!(q.category, "General");

        assert!(Quote::from_value(&json!({"author": "x"})).is_none());
        assert!(Quote::from_value(&json!("just a string")).is_none());
        assert!(Quote::from_value(&json!({"text": {"nested": 1}})).is_none());
    }

    #[test]
    fn test_sanitize_values_drops_empty_text() {
        let values = vec![
            json!({"text": "  kept  ", "category": "Wit"}),
            json!({"text": "   "}),
            json!(null),
        ];
        let quotes = sanitize_values(&values);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text, "kept");
        assert_eq!(quotes[0].category, "Wit");
    }

    #[test]
    fn test_author_label() {
        let q = Quote::new("text", "", "").unwrap();
        assert_eq!(q.author_label(), "unknown");
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let q: Quote = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(q.author, "");
        assert_eq!(q.category, "General");
    }

    #[test]
    fn test_default_quotes() {
        let defaults = default_quotes();
        assert_eq!(defaults.len(), 3);
        assert!(defaults.iter().all(|q| q.category == DEFAULT_CATEGORY));
    }
}
