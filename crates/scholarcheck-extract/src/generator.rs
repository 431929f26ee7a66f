//! Interface to the external text-generation collaborator.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation timed out")]
    Timeout,
}

/// An external model that extracts publication entries from text.
///
/// Implementations own transport, credentials and retries. The caller
/// treats any error as "zero entries for this span" — a collaborator
/// failure never aborts the rest of the document.
pub trait TextGenerator: Send + Sync {
    fn extract<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GeneratorError>> + Send + 'a>>;
}

/// Build the extraction prompt for one document span.
///
/// The contract is strict so the post-filters have something to hold the
/// output against: entries must be literally present, absence is an empty
/// array, and invented/template authors are forbidden.
pub fn build_prompt(span_text: &str) -> String {
    format!(
        "Extract every publication entry that appears in the text below.\n\
         Respond with a JSON array only. Each element must be an object with\n\
         keys \"publication\" (the complete entry text exactly as written),\n\
         \"title\" (the publication title), and \"doi\" (the DOI if one is\n\
         written in the entry, otherwise null).\n\
         Rules:\n\
         - Only report entries literally present in the text.\n\
         - If the text contains no publication entries, respond with [].\n\
         - Never invent example, placeholder, or template entries or authors.\n\
         \n\
         Text:\n\
         {span_text}"
    )
}
