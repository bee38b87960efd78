//! Figure generation
//!
//! `FigureOrchestrator` turns an existing card into a collectible figure
//! image with a single provider call. Figures are never written back to the
//! card store.
//!
//! `FigureSession` holds the figure view's exclusive card selection on top of
//! the orchestrator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blessing_types::{BlessingCard, CardId, FigureResult};
use tracing::{info, warn};

use super::{StateCell, StateWatcher, ViewState};
use crate::error::{GenerationError, GenerationKind};
use crate::provider::ContentProvider;
use crate::store::CardStore;

/// Caption shown under a finished figure
pub fn figure_caption(card: &BlessingCard) -> String {
    format!("Blessing: {} \"{}\"", card.recipient(), card.theme())
}

/// Drives figure creation for one view
#[derive(Clone)]
pub struct FigureOrchestrator {
    provider: Arc<dyn ContentProvider>,
    state: StateCell<FigureResult>,
    target: Arc<Mutex<Option<CardId>>>,
}

fn lock(target: &Mutex<Option<CardId>>) -> MutexGuard<'_, Option<CardId>> {
    target.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FigureOrchestrator {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            provider,
            state: StateCell::new(),
            target: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> ViewState<FigureResult> {
        self.state.snapshot()
    }

    /// Card the most recent accepted request was issued for
    pub fn target(&self) -> Option<CardId> {
        lock(&self.target).clone()
    }

    fn snapshot_with_target(&self) -> (Option<CardId>, ViewState<FigureResult>) {
        let target = lock(&self.target);
        (target.clone(), self.state.snapshot())
    }

    pub fn subscribe(&self) -> StateWatcher<FigureResult> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.snapshot().is_loading()
    }

    pub fn reset(&self) -> bool {
        self.state.reset()
    }

    /// Create a figure from any card, stored or not.
    ///
    /// Dropping the future before it completes puts the state back to `Idle`.
    pub async fn create_figure(
        &self,
        card: &BlessingCard,
    ) -> Result<FigureResult, GenerationError> {
        let loading = {
            let mut target = lock(&self.target);
            let Some(loading) = self.state.begin() else {
                warn!("figure generation requested while another is loading");
                return Err(GenerationError::Busy(GenerationKind::Figure));
            };
            *target = Some(card.id().clone());
            loading
        };

        let outcome = self
            .provider
            .generate_figure_image(card.theme(), card.recipient(), card.style())
            .await;

        match outcome {
            Ok(image) => {
                let figure = FigureResult::new(card.id().clone(), image)
                    .with_description(figure_caption(card));
                info!(card_id = %card.id(), "figure created");
                loading.finish(ViewState::Result(figure.clone()));
                Ok(figure)
            }
            Err(e) => {
                warn!(card_id = %card.id(), "figure generation failed: {}", e);
                let err = GenerationError::failed(GenerationKind::Figure, e);
                loading.finish(ViewState::Error(err.clone()));
                Err(err)
            }
        }
    }
}

/// Figure view: card selection plus generation
pub struct FigureSession {
    orchestrator: FigureOrchestrator,
    store: CardStore,
    selected: Option<BlessingCard>,
}

impl FigureSession {
    /// Open the view, pre-selecting the store's active card
    pub fn open(orchestrator: FigureOrchestrator, store: CardStore) -> Self {
        let selected = store.get_active();
        Self {
            orchestrator,
            store,
            selected,
        }
    }

    pub fn orchestrator(&self) -> &FigureOrchestrator {
        &self.orchestrator
    }

    /// Cards available for selection, newest first
    pub fn choices(&self) -> Vec<BlessingCard> {
        self.store.list()
    }

    pub fn selected(&self) -> Option<&BlessingCard> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, card_id: &CardId) -> bool {
        self.selected.as_ref().is_some_and(|c| c.id() == card_id)
    }

    /// Select a stored card. Switching cards clears the shown figure.
    ///
    /// Returns `false` and keeps the current selection for unknown ids.
    pub fn select(&mut self, card_id: &CardId) -> bool {
        let Some(card) = self.store.get(card_id) else {
            return false;
        };
        if !self.is_selected(card_id) {
            self.orchestrator.reset();
        }
        self.selected = Some(card);
        true
    }

    /// Generate a figure for the selected card
    pub async fn create(&self) -> Result<FigureResult, GenerationError> {
        let card = self.selected.as_ref().ok_or(GenerationError::NoSelection)?;
        self.orchestrator.create_figure(card).await
    }

    /// Back to idle, keeping the selection
    pub fn redo(&self) -> bool {
        self.orchestrator.reset()
    }

    /// Current state of the request for the selected card.
    ///
    /// A request still loading, or finished, for a card that is no longer
    /// selected shows as `Idle`.
    pub fn state(&self) -> ViewState<FigureResult> {
        let (target, state) = self.orchestrator.snapshot_with_target();
        match target {
            Some(card_id) if self.is_selected(&card_id) => state,
            _ => ViewState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CardFactory;
    use crate::provider::mock::{MockCall, MockProvider};
    use blessing_types::{CardRequest, CardStyle, ImageRef};
    use std::time::Duration;

    fn card(recipient: &str, style: CardStyle) -> BlessingCard {
        CardFactory::new().build(
            CardRequest::new(recipient, "새로운 시작", style),
            "메시지".to_string(),
            ImageRef::empty(),
        )
    }

    #[tokio::test]
    async fn test_unstored_card_is_permitted() {
        let store = CardStore::new();
        let provider = Arc::new(MockProvider::new().with_figure("data:image/png;base64,FIG"));
        let orch = FigureOrchestrator::new(provider.clone());
        let source = card("지은", CardStyle::Popart);

        let figure = orch.create_figure(&source).await.unwrap();

        assert_eq!(&figure.card_id, source.id());
        assert_eq!(figure.figure_image_url.as_str(), "data:image/png;base64,FIG");
        assert_eq!(
            figure.description.as_deref(),
            Some("Blessing: 지은 \"새로운 시작\"")
        );
        assert!(store.is_empty());
        assert_eq!(
            provider.calls(),
            vec![MockCall::Figure {
                theme: "새로운 시작".to_string(),
                recipient: "지은".to_string(),
                style: CardStyle::Popart,
            }]
        );
    }

    #[tokio::test]
    async fn test_failure_sets_error_state() {
        let orch = FigureOrchestrator::new(Arc::new(MockProvider::new().failing_figure("quota")));
        let err = orch
            .create_figure(&card("지은", CardStyle::Watercolor))
            .await
            .unwrap_err();
        assert_eq!(err.user_notice(), crate::error::FIGURE_FAILURE_NOTICE);
        assert_eq!(orch.state(), ViewState::Error(err));
    }

    #[test]
    fn test_session_preselects_active_card() {
        let store = CardStore::new();
        let older = card("하나", CardStyle::Watercolor);
        let newer = card("둘", CardStyle::Fantasy);
        store.append(older);
        store.append(newer.clone());

        let session = FigureSession::open(
            FigureOrchestrator::new(Arc::new(MockProvider::new())),
            store,
        );
        assert_eq!(session.selected(), Some(&newer));
        assert_eq!(session.choices().len(), 2);
    }

    #[tokio::test]
    async fn test_session_without_selection() {
        let session = FigureSession::open(
            FigureOrchestrator::new(Arc::new(MockProvider::new())),
            CardStore::new(),
        );
        assert!(session.selected().is_none());
        assert_eq!(session.create().await.unwrap_err(), GenerationError::NoSelection);
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_switching_selection_clears_result() {
        let store = CardStore::new();
        let first = card("하나", CardStyle::Watercolor);
        let second = card("둘", CardStyle::Minimalist);
        store.append(first.clone());
        store.append(second.clone());

        let mut session = FigureSession::open(
            FigureOrchestrator::new(Arc::new(MockProvider::new())),
            store,
        );
        let figure = session.create().await.unwrap();
        assert_eq!(&figure.card_id, second.id());
        assert_eq!(session.state().result(), Some(&figure));

        assert!(session.select(second.id()));
        assert!(session.state().result().is_some());

        assert!(session.select(first.id()));
        assert!(session.state().is_idle());
        assert!(session.is_selected(first.id()));
        assert!(!session.is_selected(second.id()));
    }

    #[tokio::test]
    async fn test_select_unknown_keeps_selection() {
        let store = CardStore::new();
        let only = card("하나", CardStyle::Watercolor);
        store.append(only.clone());

        let mut session = FigureSession::open(
            FigureOrchestrator::new(Arc::new(MockProvider::new())),
            store,
        );
        assert!(!session.select(&CardId::new("nope")));
        assert_eq!(session.selected(), Some(&only));
    }

    #[tokio::test]
    async fn test_redo_keeps_selection() {
        let store = CardStore::new();
        let only = card("하나", CardStyle::Watercolor);
        store.append(only.clone());

        let session = FigureSession::open(
            FigureOrchestrator::new(Arc::new(MockProvider::new())),
            store,
        );
        session.create().await.unwrap();
        assert!(session.redo());
        assert!(session.state().is_idle());
        assert_eq!(session.selected(), Some(&only));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_figure_allows_retry() {
        let orch = FigureOrchestrator::new(Arc::new(
            MockProvider::new().with_figure_delay(Duration::from_secs(5)),
        ));
        let source = card("지은", CardStyle::Fantasy);

        let abandoned =
            tokio::time::timeout(Duration::from_secs(1), orch.create_figure(&source)).await;
        assert!(abandoned.is_err());
        assert!(orch.state().is_idle());
        assert!(!orch.reset());

        let figure = orch.create_figure(&source).await.unwrap();
        assert_eq!(orch.state(), ViewState::Result(figure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_outcome_for_deselected_card_is_hidden() {
        let store = CardStore::new();
        let second = card("둘", CardStyle::Minimalist);
        let first = card("하나", CardStyle::Watercolor);
        store.append(second.clone());
        store.append(first.clone());

        let orch = FigureOrchestrator::new(Arc::new(
            MockProvider::new()
                .failing_figure("quota")
                .with_figure_delay(Duration::from_secs(2)),
        ));
        let mut session = FigureSession::open(orch.clone(), store);
        assert_eq!(session.selected(), Some(&first));

        let pending = {
            let orch = orch.clone();
            let first = first.clone();
            tokio::spawn(async move { orch.create_figure(&first).await })
        };
        tokio::task::yield_now().await;
        assert!(session.state().is_loading());
        assert_eq!(orch.target().as_ref(), Some(first.id()));

        assert!(session.select(second.id()));
        assert!(session.state().is_idle());

        assert!(pending.await.unwrap().is_err());
        assert!(orch.state().error().is_some());
        assert!(session.state().is_idle());

        assert!(session.select(first.id()));
        assert!(session.state().is_idle());
    }
}
