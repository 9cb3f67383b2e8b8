use serde::{Deserialize, Serialize};

use crate::news::fingerprint::{canonicalize, Fingerprint};

/// Publisher attribution as reported by the upstream provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A single news article. The gateway never inspects the contents beyond
/// serializing them back out, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Option<ArticleSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl Article {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Preferences {
    pub fn new<C, L, S>(categories: C, languages: L) -> Self
    where
        C: IntoIterator<Item = S>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }

    /// Both categories and languages must be present for a feed to exist.
    pub fn is_configured(&self) -> bool {
        !self.categories.is_empty() && !self.languages.is_empty()
    }

    /// Upstream query for these preferences, or `None` when nothing is configured.
    pub fn query(&self) -> Option<FeedQuery> {
        if !self.is_configured() {
            return None;
        }

        let categories = canonicalize(&self.categories);
        let languages = canonicalize(&self.languages);
        let fingerprint = Fingerprint::from_canonical(&categories, &languages);

        Some(FeedQuery {
            fingerprint,
            categories,
            languages,
        })
    }
}

/// Canonical (sorted, de-duplicated) parameters for one headline fetch,
/// together with the cache key they map to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub fingerprint: Fingerprint,
    pub categories: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub email: String,
    pub preferences: Preferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_preferences_have_no_query() {
        assert!(Preferences::default().query().is_none());
        assert!(Preferences::new(Vec::<String>::new(), vec!["en".to_string()])
            .query()
            .is_none());
        assert!(Preferences::new(vec!["tech"], vec![]).query().is_none());
    }

    #[test]
    fn test_query_is_canonical() {
        let query = Preferences::new(vec!["tech", "business", "tech"], vec!["en"])
            .query()
            .unwrap();

        assert_eq!(query.categories, vec!["business", "tech"]);
        assert_eq!(query.languages, vec!["en"]);
        assert_eq!(query.fingerprint.as_str(), "en|business,tech");
    }

    #[test]
    fn test_article_deserializes_newsapi_shape() {
        let raw = r#"{
            "source": {"id": null, "name": "Example"},
            "author": "Jane",
            "title": "Rust 2.0",
            "urlToImage": "https://img.example/1.png",
            "publishedAt": "2024-01-01T00:00:00Z"
        }"#;

        let article: Article = serde_json::from_str(raw).unwrap();
        assert_eq!(article.title.as_deref(), Some("Rust 2.0"));
        assert_eq!(article.url_to_image.as_deref(), Some("https://img.example/1.png"));
        assert_eq!(article.source.unwrap().name.as_deref(), Some("Example"));
        assert!(article.content.is_none());
    }

    #[test]
    fn test_preferences_fields_default_when_missing() {
        let prefs: Preferences = serde_json::from_str(r#"{"categories": ["tech"]}"#).unwrap();
        assert_eq!(prefs.categories, vec!["tech"]);
        assert!(prefs.languages.is_empty());
        assert!(!prefs.is_configured());
    }
}
