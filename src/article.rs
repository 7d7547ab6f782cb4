// src/article.rs
// Typed records shared by the store, the ingestion pipeline, and the
// recommendation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed provider taxonomy. The external top-headlines endpoint only accepts
/// these category tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Technology,
    Sports,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Technology,
        Category::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Technology => "technology",
            Category::Sports => "sports",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored article. Created only by the ingestion writer; `last_accessed`
/// is the single mutable field and only `NewsStore::touch` updates it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub category: Category,
    pub headline: String,
    /// Author names joined with ", "; empty when the provider gave none.
    pub authors: String,
    /// Source URL, the deduplication key. UNIQUE in the store.
    pub link: String,
    pub image_url: String,
    pub short_description: String,
    /// Publication time from the provider; ingestion time if absent.
    pub date: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Article {
    /// The document used for similarity: headline and description, space
    /// separated.
    pub fn document(&self) -> String {
        format!("{} {}", self.headline, self.short_description)
    }
}

/// The read model handed to UI collaborators (feeds and recommendations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleSummary {
    pub id: i64,
    pub headline: String,
    pub short_description: String,
    pub image_url: String,
}

impl From<Article> for ArticleSummary {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            headline: a.headline,
            short_description: a.short_description,
            image_url: a.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, c);
        }
    }

    #[test]
    fn document_concatenates_headline_and_description() {
        let a = Article {
            id: 1,
            category: Category::Technology,
            headline: "Chip makers rally".into(),
            authors: String::new(),
            link: "https://example.test/chips".into(),
            image_url: String::new(),
            short_description: "Semiconductor stocks climb".into(),
            date: Utc::now(),
            last_accessed: Utc::now(),
        };
        assert_eq!(a.document(), "Chip makers rally Semiconductor stocks climb");
    }
}
