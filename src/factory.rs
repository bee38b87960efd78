//! Card construction
//!
//! Combines the user's request with the provider's output into a finalized
//! `BlessingCard`. Construction cannot fail.

use blessing_types::{
    BlessingCard, CardId, CardRequest, GeneratedContent, ImageRef, DEFAULT_BLESSING_MESSAGE,
};

/// Builds cards with fresh identifiers and timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct CardFactory;

impl CardFactory {
    pub fn new() -> Self {
        Self
    }

    /// Build a card stamped with the current time
    pub fn build(&self, request: CardRequest, message: String, image_url: ImageRef) -> BlessingCard {
        self.build_at(
            request,
            message,
            image_url,
            chrono::Utc::now().timestamp_millis(),
        )
    }

    /// Build a card with an explicit creation time (epoch milliseconds)
    pub fn build_at(
        &self,
        request: CardRequest,
        message: String,
        image_url: ImageRef,
        created_at: i64,
    ) -> BlessingCard {
        let message = if message.trim().is_empty() {
            DEFAULT_BLESSING_MESSAGE.to_string()
        } else {
            message
        };

        BlessingCard::new(
            CardId::generate(),
            request,
            GeneratedContent { message, image_url },
            created_at,
        )
    }
}
