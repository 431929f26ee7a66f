use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{AuthorField, AuthorId, RawRecord, SourceAdapter, SourceError, status_error};

/// OpenAlex works search. Works without an API key; a key raises the
/// provider-side rate limit.
pub struct OpenAlex {
    pub api_key: Option<String>,
}

/// Reduce an OpenAlex entity URL to its short id:
/// `https://openalex.org/A123` → `A123`. Already-short ids pass through.
pub fn short_id(value: &str) -> String {
    value.rsplit('/').next().unwrap_or(value).to_string()
}

impl SourceAdapter for OpenAlex {
    fn name(&self) -> &'static str {
        "OpenAlex"
    }

    fn search<'a>(
        &'a self,
        title: &'a str,
        max_results: usize,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let mut url = format!(
                "https://api.openalex.org/works?filter=title.search:{}&per-page={}",
                urlencoding::encode(title),
                max_results
            );
            if let Some(ref key) = self.api_key {
                url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
            }

            let resp = client
                .get(&url)
                .header("User-Agent", "scholarcheck")
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
            let results = data["results"].as_array().cloned().unwrap_or_default();

            let records = results
                .iter()
                .take(max_results)
                .filter_map(|item| {
                    let title = item["title"].as_str()?;
                    if title.is_empty() {
                        return None;
                    }

                    let mut names = Vec::new();
                    let mut author_ids = Vec::new();
                    if let Some(authorships) = item["authorships"].as_array() {
                        for a in authorships {
                            let Some(display_name) = a["author"]["display_name"].as_str() else {
                                continue;
                            };
                            names.push(display_name.to_string());
                            if let Some(id) = a["author"]["id"].as_str() {
                                author_ids.push(AuthorId {
                                    display_name: display_name.to_string(),
                                    id: short_id(id),
                                });
                            }
                        }
                    }

                    Some(RawRecord {
                        title: title.to_string(),
                        doi: item["doi"].as_str().map(String::from),
                        authors: AuthorField::Names(names),
                        author_ids,
                        url: item["id"].as_str().map(String::from),
                    })
                })
                .collect();

            Ok(records)
        })
    }
}
