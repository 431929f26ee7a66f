//! The extraction pipeline: segment, delegate, repair, validate, dedup.

use std::sync::Arc;

use scholarcheck_core::Publication;

use crate::generator::{TextGenerator, build_prompt};
use crate::repair::parse_model_output;
use crate::{ExtractorConfig, filter, section};

/// Locates candidate publication entries in raw document text.
pub struct PublicationExtractor {
    generator: Arc<dyn TextGenerator>,
    config: ExtractorConfig,
}

impl PublicationExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract validated publication claims from a document.
    ///
    /// Each section-like span is handed to the collaborator separately; a
    /// failed or unparseable span contributes zero entries and leaves the
    /// rest of the document unaffected. Results keep document order, with
    /// near-duplicates from overlapping spans collapsed.
    pub async fn extract_document(&self, text: &str) -> Vec<Publication> {
        let mut entries: Vec<Publication> = Vec::new();

        for span in section::segment(text) {
            let prompt = build_prompt(&span.body);
            let raw_output = match self.generator.extract(&prompt).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(
                        heading = span.heading.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "extraction collaborator failed for span"
                    );
                    continue;
                }
            };

            for model_entry in parse_model_output(&raw_output) {
                let Some(title) = model_entry.title.filter(|t| !t.trim().is_empty()) else {
                    continue;
                };
                let raw_text = model_entry
                    .publication
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| title.clone());

                entries.push(Publication {
                    title,
                    doi: model_entry.doi.filter(|d| !d.trim().is_empty()),
                    raw_text,
                });
            }
        }

        let entries: Vec<Publication> = entries
            .into_iter()
            .filter(|e| filter::passes_filters(e, text, &self.config))
            .collect();

        filter::dedup(entries, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeneratorError;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Returns scripted outputs, one per call (repeating the last).
    struct ScriptedGenerator {
        outputs: Mutex<Vec<Result<String, GeneratorError>>>,
    }

    impl ScriptedGenerator {
        fn new(mut outputs: Vec<Result<String, GeneratorError>>) -> Self {
            outputs.reverse();
            Self {
                outputs: Mutex::new(outputs),
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn extract<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, GeneratorError>> + Send + 'a>> {
            let next = self
                .outputs
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("[]".to_string()));
            Box::pin(async move { next })
        }
    }

    const DOC: &str = "PUBLICATIONS\n\
        Doe J, Smith A. Adversarial robustness of distributed consensus protocols. JSys, 2021.\n\
        PREPRINTS\n\
        Doe J. Adversarial robustness of distributed consensus protocols. arXiv, 2021.\n";

    fn entry_json(title: &str) -> String {
        format!(
            r#"[{{"publication": "Doe J, Smith A. {title}. JSys, 2021.", "title": "{title}", "doi": null}}]"#
        )
    }

    #[tokio::test]
    async fn extracts_and_converts_entries() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(entry_json("Adversarial robustness of distributed consensus protocols")),
            Ok("[]".into()),
        ]));
        let extractor = PublicationExtractor::new(generator);
        let pubs = extractor.extract_document(DOC).await;
        assert_eq!(pubs.len(), 1);
        assert_eq!(
            pubs[0].title,
            "Adversarial robustness of distributed consensus protocols"
        );
        assert!(pubs[0].doi.is_none());
    }

    #[tokio::test]
    async fn adjacent_span_duplicates_collapse() {
        // Both spans report the same publication (trailing period differs).
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(entry_json("Adversarial robustness of distributed consensus protocols")),
            Ok(entry_json("Adversarial robustness of distributed consensus protocols.")),
        ]));
        let extractor = PublicationExtractor::new(generator);
        let pubs = extractor.extract_document(DOC).await;
        assert_eq!(pubs.len(), 1);
    }

    #[tokio::test]
    async fn failed_span_does_not_affect_siblings() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Err(GeneratorError::Timeout),
            Ok(entry_json("Adversarial robustness of distributed consensus protocols")),
        ]));
        let extractor = PublicationExtractor::new(generator);
        let pubs = extractor.extract_document(DOC).await;
        assert_eq!(pubs.len(), 1);
    }

    #[tokio::test]
    async fn fabricated_entries_are_filtered() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(r#"[{"publication": "John Doe and Jane Doe. Example publication for demonstration purposes.", "title": "Example publication", "doi": null}]"#.to_string()),
            Ok("[]".into()),
        ]));
        let extractor = PublicationExtractor::new(generator);
        let pubs = extractor.extract_document(DOC).await;
        assert!(pubs.is_empty());
    }

    #[tokio::test]
    async fn unparseable_output_yields_no_entries() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("The text does not contain publications.".into()),
            Ok("[]".into()),
        ]));
        let extractor = PublicationExtractor::new(generator);
        let pubs = extractor.extract_document(DOC).await;
        assert!(pubs.is_empty());
    }
}
