//! Blessing Post Office
//!
//! Turns a recipient and a blessing theme into a generated message and
//! illustration, keeps every card created in the session, and derives
//! collectible figures and simulated postal deliveries from those cards.
//!
//! ## Flow
//!
//! ```text
//! user input ─► GenerationOrchestrator ─► ContentProvider (text ∥ image)
//!                       │
//!                       ▼
//!                  CardFactory ─► CardStore (prepend + active)
//!                                     │
//!              ┌──────────────────────┴──────────────────────┐
//!              ▼                                             ▼
//!       FigureSession / FigureOrchestrator          MailDispatchSimulator
//!       (figure image, not stored)                  (sent marks)
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod image;
pub mod mail;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod store;

pub use blessing_types::{
    BlessingCard, CardId, CardRequest, CardStyle, FigureResult, ImageRef, ProviderConfig,
    DEFAULT_BLESSING_MESSAGE,
};
pub use config::AppConfig;
pub use error::{GenerationError, GenerationKind, MailError, ProviderError};
pub use factory::CardFactory;
pub use mail::{DeliveryInfo, DispatchReceipt, MailDispatchSimulator, MailboxEntry};
pub use orchestrator::{
    FigureOrchestrator, FigureSession, GenerationOrchestrator, StateWatcher, ViewState,
};
pub use provider::{ContentProvider, GeminiProvider, MockProvider};
pub use session::BlessingSession;
pub use store::CardStore;
