use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_BIBLE_API_URL: &str = "https://bible-api.com/data";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BibleVersion {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub translations: Vec<BibleVersion>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub license: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksResponse {
    pub translation: Translation,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Chapter {
    pub book_id: String,
    pub book: String,
    pub chapter: u32,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChaptersResponse {
    pub translation: Translation,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Verse {
    pub book_id: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersesResponse {
    pub translation: Translation,
    pub verses: Vec<Verse>,
}

/// Read-only client for the scripture content API.
#[derive(Clone)]
pub struct BibleClient {
    client: Client,
    base_url: String,
}

impl BibleClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        tracing::debug!(%url, "fetching scripture data");
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "scripture API returned {} for {}",
                response.status(),
                url
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn fetch_versions(&self) -> Result<VersionsResponse> {
        self.get_json(self.base_url.clone()).await
    }

    pub async fn fetch_books(&self, version: &str) -> Result<BooksResponse> {
        self.get_json(format!("{}/{}", self.base_url, version)).await
    }

    pub async fn fetch_chapters(&self, version: &str, book_id: &str) -> Result<ChaptersResponse> {
        self.get_json(format!("{}/{}/{}", self.base_url, version, book_id))
            .await
    }

    pub async fn fetch_verses(
        &self,
        version: &str,
        book_id: &str,
        chapter: u32,
    ) -> Result<VersesResponse> {
        self.get_json(format!(
            "{}/{}/{}/{}",
            self.base_url, version, book_id, chapter
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapters_deserialize_with_missing_optional_fields() {
        let json = r#"{
            "translation": {"identifier": "kjv", "name": "King James Version"},
            "chapters": [
                {"book_id": "genesis", "book": "Genesis", "chapter": 1},
                {"book_id": "genesis", "book": "Genesis", "chapter": 2}
            ]
        }"#;

        let parsed: ChaptersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.translation.identifier, "kjv");
        assert_eq!(parsed.chapters.len(), 2);
        assert_eq!(parsed.chapters[1].chapter, 2);
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = BibleClient::new("https://example.com/data/");
        assert_eq!(client.base_url, "https://example.com/data");
    }
}
