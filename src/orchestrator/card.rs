//! Card generation orchestrator
//!
//! Text and illustration are requested concurrently and joined: both must
//! succeed for a card to exist. On success the card is stored (and made
//! active) before the `Result` state is published, so a view can never see a
//! result the store does not also hold.

use std::sync::Arc;

use blessing_types::{BlessingCard, CardRequest, CardStyle};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{StateCell, StateWatcher, ViewState};
use crate::error::{GenerationError, GenerationKind};
use crate::factory::CardFactory;
use crate::provider::ContentProvider;
use crate::store::CardStore;

/// Drives card creation for one view
#[derive(Clone)]
pub struct GenerationOrchestrator {
    provider: Arc<dyn ContentProvider>,
    store: CardStore,
    factory: CardFactory,
    state: StateCell<BlessingCard>,
}

impl GenerationOrchestrator {
    pub fn new(provider: Arc<dyn ContentProvider>, store: CardStore) -> Self {
        Self {
            provider,
            store,
            factory: CardFactory::new(),
            state: StateCell::new(),
        }
    }

    pub fn state(&self) -> ViewState<BlessingCard> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> StateWatcher<BlessingCard> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.snapshot().is_loading()
    }

    /// Discard a shown result or error and return to `Idle`
    pub fn reset(&self) -> bool {
        self.state.reset()
    }

    /// Create a card from validated, non-empty inputs.
    ///
    /// Returns `GenerationError::Busy` without touching state when another
    /// generation is still loading. Dropping the future before it completes
    /// puts the state back to `Idle`.
    pub async fn create_card(
        &self,
        recipient: &str,
        theme: &str,
        style: CardStyle,
    ) -> Result<BlessingCard, GenerationError> {
        let Some(loading) = self.state.begin() else {
            warn!("card generation requested while another is loading");
            return Err(GenerationError::Busy(GenerationKind::Card));
        };

        let request = CardRequest::new(recipient, theme, style);
        let joined = tokio::try_join!(
            self.provider.generate_text(recipient, theme),
            self.provider.generate_image(theme, style),
        );

        match joined {
            Ok((message, image_url)) => {
                let card = self.factory.build(request, message, image_url);
                self.store.append(card.clone());
                info!(
                    card_id = %card.id(),
                    provider = self.provider.provider_name(),
                    has_image = !card.image_url().is_empty(),
                    "blessing card created"
                );
                loading.finish(ViewState::Result(card.clone()));
                Ok(card)
            }
            Err(e) => {
                warn!(
                    provider = self.provider.provider_name(),
                    "card generation failed: {}", e
                );
                let err = GenerationError::failed(GenerationKind::Card, e);
                loading.finish(ViewState::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Run `create_card` as a detached task.
    ///
    /// The generation completes even if the caller stops listening.
    pub fn spawn_create_card(
        &self,
        request: CardRequest,
    ) -> JoinHandle<Result<BlessingCard, GenerationError>> {
        let this = self.clone();
        tokio::spawn(async move {
            this.create_card(&request.recipient, &request.theme, request.style)
                .await
        })
    }
}
