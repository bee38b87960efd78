//! Blessing Types - Foundation Types
//!
//! Pure data structures shared by the blessing post office crates: cards,
//! art styles, figure results and provider configuration.
//!
//! ## Critical Rules
//!
//! 1. **NO BUSINESS LOGIC** - Only data structures, constructors and accessors
//! 2. **NO WORKSPACE DEPENDENCIES** - Cannot depend on other workspace crates
//! 3. **SERIALIZABLE** - All types support serde
//! 4. **IMMUTABLE CARDS** - `BlessingCard` exposes accessors only

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message used when the text provider returns nothing usable
pub const DEFAULT_BLESSING_MESSAGE: &str = "축복이 당신의 삶에 가득하길 바랍니다.";

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Opaque card identifier, unique within a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing token
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// ART STYLES
// ============================================================================

/// Art style chosen when a card is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    #[default]
    Watercolor,
    Minimalist,
    #[serde(alias = "pop-art", alias = "pop_art")]
    Popart,
    Fantasy,
}

impl CardStyle {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watercolor => "watercolor",
            Self::Minimalist => "minimalist",
            Self::Popart => "popart",
            Self::Fantasy => "fantasy",
        }
    }

    /// Prompt fragment describing the style to the image model
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Watercolor => {
                "soft warm watercolor illustration, bleeding colors, cozy, hand-painted aesthetic"
            }
            Self::Minimalist => {
                "clean minimalist illustration, simple lines, vast negative space, elegant and modern"
            }
            Self::Popart => {
                "vibrant pop art style, bold colors, high contrast, graphic design elements, cheerful"
            }
            Self::Fantasy => {
                "mystical fantasy art, glowing particles, ethereal lighting, magical atmosphere, dreamlike"
            }
        }
    }

    /// Get all styles
    pub fn all() -> [Self; 4] {
        [
            Self::Watercolor,
            Self::Minimalist,
            Self::Popart,
            Self::Fantasy,
        ]
    }
}

impl fmt::Display for CardStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing CardStyle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown card style '{0}'. Valid values: watercolor, minimalist, popart, fantasy")]
pub struct ParseStyleError(String);

impl FromStr for CardStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "watercolor" => Ok(Self::Watercolor),
            "minimalist" => Ok(Self::Minimalist),
            "popart" | "pop-art" | "pop_art" => Ok(Self::Popart),
            "fantasy" => Ok(Self::Fantasy),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

// ============================================================================
// IMAGE REFERENCES
// ============================================================================

/// Reference to a generated image: a URI or an inline `data:` payload.
///
/// An empty reference means the provider returned no image part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The "no image" reference
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Build an inline data URI from a mime type and base64 payload
    pub fn inline(mime_type: &str, base64_data: &str) -> Self {
        Self(format!("data:{};base64,{}", mime_type, base64_data))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// CARDS
// ============================================================================

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRequest {
    pub recipient: String,
    pub theme: String,
    pub style: CardStyle,
}

impl CardRequest {
    pub fn new(recipient: impl Into<String>, theme: impl Into<String>, style: CardStyle) -> Self {
        Self {
            recipient: recipient.into(),
            theme: theme.into(),
            style,
        }
    }
}

/// What the provider produced for a request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub message: String,
    pub image_url: ImageRef,
}

/// One finalized generation result.
///
/// Fields are private: a card never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlessingCard {
    id: CardId,
    recipient: String,
    theme: String,
    message: String,
    image_url: ImageRef,
    style: CardStyle,
    /// Epoch milliseconds
    created_at: i64,
}

impl BlessingCard {
    /// Assemble a card from its parts
    pub fn new(
        id: CardId,
        request: CardRequest,
        content: GeneratedContent,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            recipient: request.recipient,
            theme: request.theme,
            message: content.message,
            image_url: content.image_url,
            style: request.style,
            created_at,
        }
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn image_url(&self) -> &ImageRef {
        &self.image_url
    }

    pub fn style(&self) -> CardStyle {
        self.style
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Creation time as a UTC datetime, for display only
    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.created_at)
    }
}

// ============================================================================
// FIGURES
// ============================================================================

/// A figure image generated from an existing card. Never stored as a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureResult {
    pub card_id: CardId,
    pub figure_image_url: ImageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FigureResult {
    pub fn new(card_id: CardId, figure_image_url: ImageRef) -> Self {
        Self {
            card_id,
            figure_image_url,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// PROVIDER CONFIGURATION
// ============================================================================

/// Generative provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the provider
    pub api_key: String,

    /// Model used for blessing text
    pub text_model: String,

    /// Model used for card and figure images
    pub image_model: String,

    /// Temperature for text generation
    pub text_temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Base URL of the models endpoint
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            text_temperature: Some(0.8),
            timeout_seconds: 60,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Create new provider configuration with default models
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set text model
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Set image model
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card() -> BlessingCard {
        BlessingCard::new(
            CardId::new("abc123"),
            CardRequest::new("지은", "새로운 시작", CardStyle::Fantasy),
            GeneratedContent {
                message: "따뜻한 말".to_string(),
                image_url: ImageRef::inline("image/png", "AAA"),
            },
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("watercolor".parse::<CardStyle>().unwrap(), CardStyle::Watercolor);
        assert_eq!("MINIMALIST".parse::<CardStyle>().unwrap(), CardStyle::Minimalist);
        assert_eq!("pop-art".parse::<CardStyle>().unwrap(), CardStyle::Popart);
        assert_eq!("fantasy".parse::<CardStyle>().unwrap(), CardStyle::Fantasy);
        assert!("cubism".parse::<CardStyle>().is_err());
    }

    #[test]
    fn test_style_default() {
        assert_eq!(CardStyle::default(), CardStyle::Watercolor);
    }

    #[test]
    fn test_style_prompts_are_distinct() {
        let prompts: std::collections::HashSet<_> =
            CardStyle::all().iter().map(|s| s.prompt()).collect();
        assert_eq!(prompts.len(), 4);
    }

    #[test]
    fn test_card_serializes_camel_case() {
        let json = serde_json::to_value(sample_card()).unwrap();
        assert_eq!(json["imageUrl"], "data:image/png;base64,AAA");
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(json["style"], "fantasy");
    }

    #[test]
    fn test_card_without_style_is_rejected() {
        let json = r#"{
            "id": "old1",
            "recipient": "민수",
            "theme": "건강",
            "message": "건강하세요",
            "imageUrl": "",
            "createdAt": 1
        }"#;
        assert!(serde_json::from_str::<BlessingCard>(json).is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(CardId::generate(), CardId::generate());
    }

    #[test]
    fn test_image_ref_inline() {
        let image = ImageRef::inline("image/jpeg", "QUJD");
        assert_eq!(image.as_str(), "data:image/jpeg;base64,QUJD");
        assert!(!image.is_empty());
        assert!(ImageRef::empty().is_empty());
    }

    #[test]
    fn test_created_at_utc() {
        let card = sample_card();
        let dt = card.created_at_utc().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }
}
