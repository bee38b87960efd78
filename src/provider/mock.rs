//! Scripted provider for tests and offline demos.
//!
//! Each operation returns a canned reply after an optional delay and every
//! call is recorded.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use blessing_types::{CardStyle, ImageRef};

use super::ContentProvider;
use crate::error::ProviderError;

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Text {
        recipient: String,
        theme: String,
    },
    Image {
        theme: String,
        style: CardStyle,
    },
    Figure {
        theme: String,
        recipient: String,
        style: CardStyle,
    },
}

#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    Fail(String),
}

impl<T: Clone> Reply<T> {
    fn resolve(&self) -> Result<T, ProviderError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Fail(message) => Err(ProviderError::invalid_response(message.clone())),
        }
    }
}

#[derive(Debug, Clone)]
struct Scripted<T> {
    reply: Reply<T>,
    delay: Duration,
}

impl<T: Clone> Scripted<T> {
    fn ok(value: T) -> Self {
        Self {
            reply: Reply::Ok(value),
            delay: Duration::ZERO,
        }
    }

    async fn run(&self) -> Result<T, ProviderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.resolve()
    }
}

/// Provider returning scripted results
#[derive(Debug)]
pub struct MockProvider {
    text: Scripted<String>,
    image: Scripted<ImageRef>,
    figure: Scripted<ImageRef>,
    calls: Mutex<Vec<MockCall>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            text: Scripted::ok("축복합니다.".to_string()),
            image: Scripted::ok(ImageRef::inline("image/png", "AAA")),
            figure: Scripted::ok(ImageRef::inline("image/png", "FIG")),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.reply = Reply::Ok(text.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<ImageRef>) -> Self {
        self.image.reply = Reply::Ok(image.into());
        self
    }

    pub fn with_figure(mut self, image: impl Into<ImageRef>) -> Self {
        self.figure.reply = Reply::Ok(image.into());
        self
    }

    pub fn failing_text(mut self, message: impl Into<String>) -> Self {
        self.text.reply = Reply::Fail(message.into());
        self
    }

    pub fn failing_image(mut self, message: impl Into<String>) -> Self {
        self.image.reply = Reply::Fail(message.into());
        self
    }

    pub fn failing_figure(mut self, message: impl Into<String>) -> Self {
        self.figure.reply = Reply::Fail(message.into());
        self
    }

    pub fn with_text_delay(mut self, delay: Duration) -> Self {
        self.text.delay = delay;
        self
    }

    pub fn with_image_delay(mut self, delay: Duration) -> Self {
        self.image.delay = delay;
        self
    }

    pub fn with_figure_delay(mut self, delay: Duration) -> Self {
        self.figure.delay = delay;
        self
    }

    /// Calls received so far, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    async fn generate_text(&self, recipient: &str, theme: &str) -> Result<String, ProviderError> {
        self.record(MockCall::Text {
            recipient: recipient.to_string(),
            theme: theme.to_string(),
        });
        self.text.run().await
    }

    async fn generate_image(
        &self,
        theme: &str,
        style: CardStyle,
    ) -> Result<ImageRef, ProviderError> {
        self.record(MockCall::Image {
            theme: theme.to_string(),
            style,
        });
        self.image.run().await
    }

    async fn generate_figure_image(
        &self,
        theme: &str,
        recipient: &str,
        style: CardStyle,
    ) -> Result<ImageRef, ProviderError> {
        self.record(MockCall::Figure {
            theme: theme.to_string(),
            recipient: recipient.to_string(),
            style,
        });
        self.figure.run().await
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
