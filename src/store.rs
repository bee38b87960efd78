//! Session card store
//!
//! Ordered collection of every card created in the session (newest first)
//! plus the active card pointer. The active card is held by id and resolved
//! against the collection on read.
//!
//! `CardStore` is a cheap handle: clones share the same state. It is created
//! once per session and passed to whoever needs it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blessing_types::{BlessingCard, CardId};
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    cards: Vec<BlessingCard>,
    active: Option<CardId>,
}

/// Shared handle to the session's cards
#[derive(Debug, Clone, Default)]
pub struct CardStore {
    inner: Arc<RwLock<StoreState>>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prepend a card and make it the active card
    pub fn append(&self, card: BlessingCard) {
        let mut state = self.write();
        debug!(card_id = %card.id(), "storing card");
        state.active = Some(card.id().clone());
        state.cards.insert(0, card);
    }

    /// Snapshot of all cards, newest first
    pub fn list(&self) -> Vec<BlessingCard> {
        self.read().cards.clone()
    }

    pub fn get(&self, card_id: &CardId) -> Option<BlessingCard> {
        self.read()
            .cards
            .iter()
            .find(|c| c.id() == card_id)
            .cloned()
    }

    pub fn contains(&self, card_id: &CardId) -> bool {
        self.read().cards.iter().any(|c| c.id() == card_id)
    }

    pub fn get_active(&self) -> Option<BlessingCard> {
        let state = self.read();
        let active = state.active.as_ref()?;
        state.cards.iter().find(|c| c.id() == active).cloned()
    }

    /// Make an existing card active.
    ///
    /// Unknown ids are a no-op and return `false`.
    pub fn set_active(&self, card_id: &CardId) -> bool {
        let mut state = self.write();
        if !state.cards.iter().any(|c| c.id() == card_id) {
            debug!(card_id = %card_id, "ignoring set_active for unknown card");
            return false;
        }
        state.active = Some(card_id.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.read().cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CardFactory;
    use blessing_types::{CardRequest, CardStyle, ImageRef};

    fn card(recipient: &str) -> BlessingCard {
        CardFactory::new().build(
            CardRequest::new(recipient, "주제", CardStyle::default()),
            "메시지".to_string(),
            ImageRef::empty(),
        )
    }

    #[test]
    fn test_empty_store() {
        let store = CardStore::new();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
        assert!(store.get_active().is_none());
    }

    #[test]
    fn test_append_prepends_and_activates() {
        let store = CardStore::new();
        let first = card("하나");
        let second = card("둘");
        store.append(first.clone());
        store.append(second.clone());

        assert_eq!(store.list(), vec![second.clone(), first]);
        assert_eq!(store.get_active(), Some(second));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_active_known_and_unknown() {
        let store = CardStore::new();
        let first = card("하나");
        let second = card("둘");
        store.append(first.clone());
        store.append(second.clone());

        assert!(store.set_active(first.id()));
        assert_eq!(store.get_active(), Some(first.clone()));

        assert!(!store.set_active(&CardId::new("missing")));
        assert_eq!(store.get_active(), Some(first));
    }

    #[test]
    fn test_reads_are_idempotent() {
        let store = CardStore::new();
        store.append(card("하나"));
        store.append(card("둘"));
        assert_eq!(store.list(), store.list());
        assert_eq!(store.get_active(), store.get_active());
    }

    #[test]
    fn test_clones_share_state() {
        let store = CardStore::new();
        let handle = store.clone();
        let c = card("하나");
        handle.append(c.clone());
        assert!(store.contains(c.id()));
        assert_eq!(store.get(c.id()), Some(c));
    }
}
