//! Content Provider Trait
//!
//! Unified interface for the generative text and image service consumed by
//! the orchestrators. All calls are single-attempt; no retries.

pub mod gemini;
pub mod mock;
pub mod prompts;

use async_trait::async_trait;
use blessing_types::{CardStyle, ImageRef};

use crate::error::ProviderError;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

/// Generative content provider
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Write a blessing message. An empty string means "no usable text".
    async fn generate_text(&self, recipient: &str, theme: &str) -> Result<String, ProviderError>;

    /// Draw the card illustration. An empty reference means "no image part".
    async fn generate_image(&self, theme: &str, style: CardStyle)
        -> Result<ImageRef, ProviderError>;

    /// Draw a collectible figure derived from an existing card
    async fn generate_figure_image(
        &self,
        theme: &str,
        recipient: &str,
        style: CardStyle,
    ) -> Result<ImageRef, ProviderError>;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}
