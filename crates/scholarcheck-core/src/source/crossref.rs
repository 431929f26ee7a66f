use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{AuthorField, RawRecord, SourceAdapter, SourceError, status_error};

/// CrossRef works search. A `mailto` address opts into the polite pool
/// and its higher rate limit.
pub struct CrossRef {
    pub mailto: Option<String>,
}

impl SourceAdapter for CrossRef {
    fn name(&self) -> &'static str {
        "CrossRef"
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
                "https://api.crossref.org/works?query.title={}&rows={}",
                urlencoding::encode(title),
                max_results
            );

            let user_agent = if let Some(ref email) = self.mailto {
                url.push_str(&format!("&mailto={}", urlencoding::encode(email)));
                format!("scholarcheck/0.2 (mailto:{})", email)
            } else {
                "scholarcheck".to_string()
            };

            let resp = client
                .get(&url)
                .header("User-Agent", user_agent)
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
            let items = data["message"]["items"]
                .as_array()
                .cloned()
                .unwrap_or_default();

            let records = items
                .iter()
                .take(max_results)
                .filter_map(|item| {
                    let title = item["title"]
                        .as_array()
                        .and_then(|a| a.first())
                        .and_then(|v| v.as_str())?;
                    if title.is_empty() {
                        return None;
                    }

                    let names: Vec<String> = item["author"]
                        .as_array()
                        .map(|arr| {
                            arr.iter()
                                .map(|a| {
                                    let given = a["given"].as_str().unwrap_or("");
                                    let family = a["family"].as_str().unwrap_or("");
                                    format!("{} {}", given, family).trim().to_string()
                                })
                                .filter(|n| !n.is_empty())
                                .collect()
                        })
                        .unwrap_or_default();

                    let doi = item["DOI"].as_str().map(String::from);
                    let url = doi.as_ref().map(|d| format!("https://doi.org/{}", d));

                    Some(RawRecord {
                        title: title.to_string(),
                        doi,
                        authors: AuthorField::Names(names),
                        author_ids: vec![],
                        url,
                    })
                })
                .collect();

            Ok(records)
        })
    }
}
