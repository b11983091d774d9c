//! Text extraction from submitted documents.

pub mod content;
pub mod document;
pub mod pdf;

use async_trait::async_trait;

pub use crate::error::ExtractError;
pub use document::DocumentExtractor;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Fetches the document behind `locator` and returns its raw text.
    ///
    /// Network or availability problems are [`ExtractError::Download`];
    /// unsupported or corrupt content is [`ExtractError::Extraction`].
    async fn extract_text(&self, locator: &str) -> Result<String, ExtractError>;
}
