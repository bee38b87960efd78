//! Error types for the blessing post office
//!
//! Provider failures are detailed for logging; the orchestrators collapse them
//! into a single `GenerationError` kind before anything reaches a view.

use blessing_types::CardId;
use thiserror::Error;

/// Localized notice shown when card generation fails
pub const CARD_FAILURE_NOTICE: &str = "카드 생성 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Localized notice shown when figure generation fails
pub const FIGURE_FAILURE_NOTICE: &str = "피규어 제작 중 오류가 발생했습니다.";

/// Errors raised by a content provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication error: missing API key")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Create invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

/// Which generation flow failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Card,
    Figure,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Figure => "figure",
        }
    }
}

/// The one failure kind surfaced by the orchestrators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Any provider failure. The detail is for logs only.
    #[error("{} generation failed: {detail}", .kind.as_str())]
    Failed { kind: GenerationKind, detail: String },

    #[error("a {} generation is already in progress", .0.as_str())]
    Busy(GenerationKind),

    #[error("no card selected for figure generation")]
    NoSelection,
}

impl GenerationError {
    pub fn failed(kind: GenerationKind, detail: impl ToString) -> Self {
        Self::Failed {
            kind,
            detail: detail.to_string(),
        }
    }

    /// Generic localized message for the requesting view
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::Failed {
                kind: GenerationKind::Card,
                ..
            }
            | Self::Busy(GenerationKind::Card) => CARD_FAILURE_NOTICE,
            Self::Failed {
                kind: GenerationKind::Figure,
                ..
            }
            | Self::Busy(GenerationKind::Figure)
            | Self::NoSelection => FIGURE_FAILURE_NOTICE,
        }
    }
}

/// Simulated mail dispatch errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("card '{0}' does not exist in this session")]
    UnknownCard(CardId),
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Image export errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image reference is empty")]
    Empty,

    #[error("image reference is not a base64 data URI")]
    NotDataUri,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
