use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{AuthorField, RawRecord, SourceAdapter, SourceError, status_error};

/// Europe PMC REST search (biomedical index).
pub struct EuropePmc;

impl SourceAdapter for EuropePmc {
    fn name(&self) -> &'static str {
        "Europe PMC"
    }

    fn search<'a>(
        &'a self,
        title: &'a str,
        max_results: usize,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            // Strip query-syntax characters before searching.
            static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["\'\[\](){}:;]"#).unwrap());
            static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
            let clean = SPECIAL.replace_all(title, " ");
            let clean = WS.replace_all(&clean, " ");
            let query: String = clean.trim().chars().take(100).collect();

            let page_size = max_results.to_string();
            let resp = client
                .get("https://www.ebi.ac.uk/europepmc/webservices/rest/search")
                .query(&[
                    ("query", query.as_str()),
                    ("format", "json"),
                    ("pageSize", page_size.as_str()),
                ])
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
            let results = data["resultList"]["result"]
                .as_array()
                .cloned()
                .unwrap_or_default();

            let records = results
                .iter()
                .take(max_results)
                .filter_map(|item| {
                    let title = item["title"].as_str()?;
                    if title.is_empty() {
                        return None;
                    }

                    let url = if let Some(doi) = item["doi"].as_str() {
                        Some(format!("https://doi.org/{}", doi))
                    } else if let Some(pmcid) = item["pmcid"].as_str() {
                        Some(format!("https://europepmc.org/article/PMC/{}", pmcid))
                    } else {
                        item["pmid"]
                            .as_str()
                            .map(|pmid| format!("https://europepmc.org/article/MED/{}", pmid))
                    };

                    Some(RawRecord {
                        title: title.to_string(),
                        doi: item["doi"].as_str().map(String::from),
                        authors: AuthorField::Creator(
                            item["authorString"].as_str().unwrap_or("").to_string(),
                        ),
                        author_ids: vec![],
                        url,
                    })
                })
                .collect();

            Ok(records)
        })
    }
}
