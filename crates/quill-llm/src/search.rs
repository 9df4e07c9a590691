use async_trait::async_trait;
use quill_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Trait for web search capability. Used only by the research plugins.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Provider name.
    fn name(&self) -> &str;
}

/// Brave Search API provider.
pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    /// Results requested per query.
    count: u32,
}

impl BraveSearch {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            count: 8,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count.min(20);
        self
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        info!(query = query, count = self.count, "executing web search");

        let resp = self
            .client
            .get("https://api.search.brave.com/res/v1/web/search")
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", &self.count.to_string())])
            .send()
            .await
            .map_err(|e| quill_core::QuillError::Provider(format!("search request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(quill_core::QuillError::Provider(format!(
                "search HTTP {}: {}",
                status, text
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| quill_core::QuillError::Provider(format!("search parse error: {e}")))?;

        let hits = data["web"]["results"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| SearchHit {
                        title: item["title"].as_str().unwrap_or_default().to_string(),
                        url: item["url"].as_str().unwrap_or_default().to_string(),
                        snippet: item["description"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(hits)
    }

    fn name(&self) -> &str {
        "brave"
    }
}
