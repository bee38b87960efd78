//! Simulated physical mail
//!
//! No real postal integration: a dispatch waits a fixed settle delay and then
//! marks the card as sent. Sent marks only grow.
//!
//! Policies:
//! - dispatching an id that is not in the card store fails with
//!   `MailError::UnknownCard` before any delay
//! - dispatching an already-sent card returns a fresh receipt immediately and
//!   leaves the marks unchanged

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use blessing_types::{BlessingCard, CardId};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::MailError;
use crate::store::CardStore;

/// Acknowledgement shown once a dispatch settles
pub const DISPATCH_ACKNOWLEDGEMENT: &str = "축복이 배달 시스템에 접수되었습니다! (데모 기능)";

/// Delivery details collected by the mail form. Not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub address: String,
    pub phone: String,
}

impl DeliveryInfo {
    pub fn new(address: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            phone: phone.into(),
        }
    }
}

/// Confirmation of a settled dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub card_id: CardId,
    pub acknowledgement: String,
    pub sent_at: DateTime<Utc>,
}

impl DispatchReceipt {
    fn new(card_id: CardId) -> Self {
        Self {
            card_id,
            acknowledgement: DISPATCH_ACKNOWLEDGEMENT.to_string(),
            sent_at: Utc::now(),
        }
    }
}

/// One row of the mailbox view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxEntry {
    pub card: BlessingCard,
    pub sent: bool,
    pub display_date: String,
}

#[derive(Debug, Default)]
struct Marks {
    sent: HashSet<CardId>,
    pending: HashSet<CardId>,
}

/// Clears the pending flag even if the dispatch future is dropped
struct PendingGuard<'a> {
    marks: &'a Mutex<Marks>,
    card_id: CardId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.marks).pending.remove(&self.card_id);
    }
}

fn lock(marks: &Mutex<Marks>) -> MutexGuard<'_, Marks> {
    marks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Format a card's creation time for display
pub fn display_date(card: &BlessingCard) -> String {
    card.created_at_utc()
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Session-scoped mail simulator
#[derive(Debug, Clone)]
pub struct MailDispatchSimulator {
    store: CardStore,
    delay: Duration,
    marks: Arc<Mutex<Marks>>,
}

impl MailDispatchSimulator {
    pub fn new(store: CardStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            marks: Arc::new(Mutex::new(Marks::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_sent(&self, card_id: &CardId) -> bool {
        lock(&self.marks).sent.contains(card_id)
    }

    /// True while a dispatch for this card is waiting out its delay
    pub fn is_dispatching(&self, card_id: &CardId) -> bool {
        lock(&self.marks).pending.contains(card_id)
    }

    /// Ids of all sent cards
    pub fn sent_marks(&self) -> HashSet<CardId> {
        lock(&self.marks).sent.clone()
    }

    /// Simulate sending a card by post
    pub async fn dispatch(
        &self,
        card_id: &CardId,
        delivery: DeliveryInfo,
    ) -> Result<DispatchReceipt, MailError> {
        if !self.store.contains(card_id) {
            return Err(MailError::UnknownCard(card_id.clone()));
        }

        {
            let mut marks = lock(&self.marks);
            if marks.sent.contains(card_id) {
                debug!(card_id = %card_id, "card already sent, skipping dispatch");
                return Ok(DispatchReceipt::new(card_id.clone()));
            }
            marks.pending.insert(card_id.clone());
        }
        let _pending = PendingGuard {
            marks: &self.marks,
            card_id: card_id.clone(),
        };

        debug!(
            card_id = %card_id,
            address_len = delivery.address.len(),
            "dispatching card"
        );
        tokio::time::sleep(self.delay).await;

        lock(&self.marks).sent.insert(card_id.clone());
        info!(card_id = %card_id, "card dispatched");
        Ok(DispatchReceipt::new(card_id.clone()))
    }

    /// Run `dispatch` as a task whose completion can be awaited
    pub fn spawn_dispatch(
        &self,
        card_id: CardId,
        delivery: DeliveryInfo,
    ) -> JoinHandle<Result<DispatchReceipt, MailError>> {
        let this = self.clone();
        tokio::spawn(async move { this.dispatch(&card_id, delivery).await })
    }

    /// Every stored card with its sent status, newest first
    pub fn mailbox(&self) -> Vec<MailboxEntry> {
        let sent = self.sent_marks();
        self.store
            .list()
            .into_iter()
            .map(|card| MailboxEntry {
                sent: sent.contains(card.id()),
                display_date: display_date(&card),
                card,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CardFactory;
    use blessing_types::{CardRequest, CardStyle, ImageRef};

    fn stored_card(store: &CardStore, recipient: &str) -> BlessingCard {
        let card = CardFactory::new().build(
            CardRequest::new(recipient, "주제", CardStyle::default()),
            "메시지".to_string(),
            ImageRef::empty(),
        );
        store.append(card.clone());
        card
    }

    fn delivery() -> DeliveryInfo {
        DeliveryInfo::new("서울시 중구 세종대로 110", "010-0000-0000")
    }

    #[tokio::test(start_paused = true)]
    async fn test_sent_only_after_delay() {
        let store = CardStore::new();
        let card = stored_card(&store, "지은");
        let mailer = MailDispatchSimulator::new(store, Duration::from_secs(3));

        let handle = mailer.spawn_dispatch(card.id().clone(), delivery());
        tokio::task::yield_now().await;
        assert!(mailer.is_dispatching(card.id()));
        assert!(!mailer.is_sent(card.id()));

        tokio::time::advance(Duration::from_millis(2900)).await;
        assert!(!mailer.is_sent(card.id()));

        let receipt = handle.await.unwrap().unwrap();
        assert_eq!(&receipt.card_id, card.id());
        assert_eq!(receipt.acknowledgement, DISPATCH_ACKNOWLEDGEMENT);
        assert!(mailer.is_sent(card.id()));
        assert!(!mailer.is_dispatching(card.id()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_card_is_error() {
        let mailer = MailDispatchSimulator::new(CardStore::new(), Duration::from_secs(3));
        let missing = CardId::new("ghost");
        let err = mailer.dispatch(&missing, delivery()).await.unwrap_err();
        assert_eq!(err, MailError::UnknownCard(missing.clone()));
        assert!(!mailer.is_sent(&missing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redispatch_is_immediate_noop() {
        let store = CardStore::new();
        let card = stored_card(&store, "지은");
        let mailer = MailDispatchSimulator::new(store, Duration::from_secs(3));

        mailer.dispatch(card.id(), delivery()).await.unwrap();
        let before = tokio::time::Instant::now();
        mailer.dispatch(card.id(), delivery()).await.unwrap();
        assert_eq!(before.elapsed(), Duration::ZERO);
        assert_eq!(mailer.sent_marks().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mailbox_reports_sent_status() {
        let store = CardStore::new();
        let first = stored_card(&store, "하나");
        let second = stored_card(&store, "둘");
        let mailer = MailDispatchSimulator::new(store, Duration::from_secs(1));

        mailer.dispatch(first.id(), delivery()).await.unwrap();

        let entries = mailer.mailbox();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].card, second);
        assert!(!entries[0].sent);
        assert_eq!(entries[1].card, first);
        assert!(entries[1].sent);
        assert_eq!(entries[1].display_date.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_dispatch_clears_pending() {
        let store = CardStore::new();
        let card = stored_card(&store, "지은");
        let mailer = MailDispatchSimulator::new(store, Duration::from_secs(3));

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            mailer.dispatch(card.id(), delivery()),
        )
        .await;
        assert!(result.is_err());
        assert!(!mailer.is_dispatching(card.id()));
        assert!(!mailer.is_sent(card.id()));
    }
}
