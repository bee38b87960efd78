//! Application session
//!
//! Owns the card store and wires it into the orchestrators and the mail
//! simulator. Created once at startup and dropped at exit; there is no
//! global state.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ProviderError;
use crate::mail::MailDispatchSimulator;
use crate::orchestrator::{FigureOrchestrator, FigureSession, GenerationOrchestrator};
use crate::provider::{ContentProvider, GeminiProvider};
use crate::store::CardStore;

/// Everything one user session shares
#[derive(Clone)]
pub struct BlessingSession {
    store: CardStore,
    provider: Arc<dyn ContentProvider>,
    cards: GenerationOrchestrator,
    mailer: MailDispatchSimulator,
}

impl BlessingSession {
    pub fn new(config: &AppConfig, provider: Arc<dyn ContentProvider>) -> Self {
        let store = CardStore::new();
        Self {
            cards: GenerationOrchestrator::new(Arc::clone(&provider), store.clone()),
            mailer: MailDispatchSimulator::new(store.clone(), config.mail_delay),
            store,
            provider,
        }
    }

    /// Session backed by the Gemini provider
    pub fn with_gemini(config: &AppConfig) -> Result<Self, ProviderError> {
        let provider = GeminiProvider::new(config.provider.clone())?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    /// Card creation view
    pub fn cards(&self) -> &GenerationOrchestrator {
        &self.cards
    }

    /// Mailbox and delivery view
    pub fn mailer(&self) -> &MailDispatchSimulator {
        &self.mailer
    }

    /// Open a figure view with a fresh orchestrator
    pub fn figure_session(&self) -> FigureSession {
        FigureSession::open(
            FigureOrchestrator::new(Arc::clone(&self.provider)),
            self.store.clone(),
        )
    }
}
