use serde::{Deserialize, Serialize};

/// A single corpus record. Immutable once loaded.
///
/// Field names are lower-case on the wire; the capitalized spellings some
/// exports use (`ID`, `Title`, `Content`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(alias = "ID", alias = "Id")]
    pub id: i64,
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Content", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: None,
        }
    }

    pub fn with_content(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: Some(content.into()),
        }
    }

    /// Body text, or the empty string when the record carries none.
    pub fn body(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_capitalized_field_names() {
        let article: Article =
            serde_json::from_str(r#"{"ID": 7, "Title": "Seven", "Content": "body"}"#).unwrap();
        assert_eq!(article, Article::with_content(7, "Seven", "body"));
    }

    #[test]
    fn content_is_optional() {
        let article: Article = serde_json::from_str(r#"{"id": 3, "title": "Three"}"#).unwrap();
        assert_eq!(article.content, None);
        assert_eq!(article.body(), "");

        let json = serde_json::to_string(&article).unwrap();
        assert!(!json.contains("content"));
    }
}
