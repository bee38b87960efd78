//! Prompt builders shared by provider implementations

use blessing_types::CardStyle;

/// Aspect ratio requested for card illustrations
pub const CARD_ASPECT_RATIO: &str = "3:4";

/// Aspect ratio requested for figures
pub const FIGURE_ASPECT_RATIO: &str = "1:1";

/// Prompt for the blessing message
pub fn blessing_text_prompt(recipient: &str, theme: &str) -> String {
    format!(
        "받는 사람: {}\n주제: {}\n이 정보를 바탕으로 따뜻하고 감동적인 축복의 메시지를 3-4문장 이내로 작성해줘. 시적이고 다정한 어조를 사용해줘.",
        recipient, theme
    )
}

/// Prompt for the card illustration
pub fn card_image_prompt(theme: &str, style: CardStyle) -> String {
    format!(
        "An artistic illustration for a blessing card. Theme: {}. Style: {}. High quality, professional art, no text on image.",
        theme,
        style.prompt()
    )
}

/// Prompt for the collectible figure
pub fn figure_image_prompt(theme: &str, recipient: &str, style: CardStyle) -> String {
    format!(
        "A 3D isometric collectible miniature figure in a display case. The figure represents a blessing for {} with theme {}. Aesthetic style influenced by {}. Studio lighting, clean background, premium toy/art toy aesthetic, adorable and highly detailed.",
        recipient, theme, style
    )
}
