use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{AuthorField, AuthorId, RawRecord, SourceAdapter, SourceError, status_error};

/// General web scholar index, queried through a SerpAPI-compatible JSON
/// endpoint. The weakest of the sources: results are often loosely
/// related, so it runs with the highest match threshold, and the author
/// list must be parsed out of a free-text summary line.
pub struct Scholar {
    api_key: String,
}

impl Scholar {
    /// Create the adapter. An empty key is a configuration error on the
    /// caller's side, not a runtime condition.
    pub fn new(api_key: String) -> Self {
        assert!(!api_key.trim().is_empty(), "Scholar adapter requires an API key");
        Self { api_key }
    }
}

impl SourceAdapter for Scholar {
    fn name(&self) -> &'static str {
        "Scholar"
    }

    fn search<'a>(
        &'a self,
        title: &'a str,
        max_results: usize,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let num = max_results.to_string();
            let resp = client
                .get("https://serpapi.com/search.json")
                .query(&[
                    ("engine", "google_scholar"),
                    ("q", title),
                    ("num", num.as_str()),
                    ("api_key", self.api_key.as_str()),
                ])
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| SourceError::Http(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(status_error(resp.status()));
            }

            let data: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| SourceError::Malformed(e.to_string()))?;
            let results = data["organic_results"].as_array().cloned().unwrap_or_default();

            let records = results
                .iter()
                .take(max_results)
                .filter_map(|item| {
                    let title = item["title"].as_str()?;
                    if title.is_empty() {
                        return None;
                    }

                    let info = &item["publication_info"];
                    let author_ids: Vec<AuthorId> = info["authors"]
                        .as_array()
                        .map(|arr| {
                            arr.iter()
                                .filter_map(|a| {
                                    let name = a["name"].as_str()?;
                                    let id = a["author_id"].as_str()?;
                                    Some(AuthorId {
                                        display_name: name.to_string(),
                                        id: id.to_string(),
                                    })
                                })
                                .collect()
                        })
                        .unwrap_or_default();

                    Some(RawRecord {
                        title: title.to_string(),
                        doi: None,
                        authors: AuthorField::Summary(
                            info["summary"].as_str().unwrap_or("").to_string(),
                        ),
                        author_ids,
                        url: item["link"].as_str().map(String::from),
                    })
                })
                .collect();

            Ok(records)
        })
    }
}
