//! Visitor sessions.
//!
//! Every page render creates a [`Visitor`]: the in-memory state behind one
//! view of the landing page. It owns one contact form, one chat widget and
//! the colour theme. Nothing is persisted; reloading the page starts a new
//! visitor, so the form and transcript reset exactly as a fresh page would.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use softsell::scheduler::ManualScheduler;
//! use softsell::visitor::VisitorStore;
//!
//! let store = VisitorStore::new(Arc::new(ManualScheduler::new()));
//! let visitor = store.create();
//! visitor.chat().send("Hello!");
//!
//! assert_eq!(visitor.chat().transcript().len(), 2);
//! assert!(store.get(visitor.id()).is_some());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::{ChatWidget, DEFAULT_REPLY_DELAY};
use crate::contact::ContactForm;
use crate::scheduler::Scheduler;

/// Default idle timeout (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often an open page pings the server to keep its visitor alive.
/// Must stay well below the idle timeout.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Page colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// State behind one rendered page.
#[derive(Debug)]
pub struct Visitor {
    inner: Arc<VisitorInner>,
}

#[derive(Debug)]
struct VisitorInner {
    id: String,
    contact: ContactForm,
    chat: ChatWidget,
    theme: RwLock<Theme>,
    created_at: DateTime<Utc>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Clone for Visitor {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Visitor {
    fn new(id: String, chat: ChatWidget) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(VisitorInner {
                id,
                contact: ContactForm::new(),
                chat,
                theme: RwLock::new(Theme::default()),
                created_at: now,
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Visitor ID, embedded in the page so fragments can find their state.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn contact(&self) -> &ContactForm {
        &self.inner.contact
    }

    #[must_use]
    pub fn chat(&self) -> &ChatWidget {
        &self.inner.chat
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        *self.inner.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch between light and dark. Returns the new theme.
    pub fn toggle_theme(&self) -> Theme {
        let mut guard = self.inner.theme.write().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.toggled();
        *guard
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record activity now.
    pub fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Time since the last activity.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        (Utc::now() - self.last_activity())
            .to_std()
            .unwrap_or_default()
    }

    /// Whether the visitor has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        self.idle_for() > timeout
    }
}

/// Thread-safe store of live visitors.
#[derive(Debug, Clone)]
pub struct VisitorStore {
    inner: Arc<VisitorStoreInner>,
}

#[derive(Debug)]
struct VisitorStoreInner {
    visitors: RwLock<HashMap<String, Visitor>>,
    scheduler: Arc<dyn Scheduler>,
    reply_delay: Duration,
}

impl VisitorStore {
    /// Create a store whose chat widgets reply through `scheduler`.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_reply_delay(scheduler, DEFAULT_REPLY_DELAY)
    }

    /// Same as [`VisitorStore::new`] with a custom chat reply delay.
    #[must_use]
    pub fn with_reply_delay(scheduler: Arc<dyn Scheduler>, reply_delay: Duration) -> Self {
        Self {
            inner: Arc::new(VisitorStoreInner {
                visitors: RwLock::new(HashMap::new()),
                scheduler,
                reply_delay,
            }),
        }
    }

    /// Create a visitor with a fresh ID.
    #[must_use]
    pub fn create(&self) -> Visitor {
        let id = Uuid::new_v4().to_string();
        let visitor = self.build(id.clone());
        self.write().insert(id, visitor.clone());
        visitor
    }

    /// Look up a visitor and mark it active.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Visitor> {
        let visitor = self.read().get(id).cloned()?;
        visitor.touch();
        Some(visitor)
    }

    /// Look up a visitor, recreating it under the same ID if it was swept.
    ///
    /// A page can outlive its visitor (the sweeper only sees server-side
    /// activity), so requests from that page get a fresh visitor instead of an
    /// error. Only IDs this store could have issued are accepted; anything
    /// that is not a UUID returns `None`.
    #[must_use]
    pub fn resume(&self, id: &str) -> Option<Visitor> {
        if let Some(visitor) = self.get(id) {
            return Some(visitor);
        }
        let id = Uuid::parse_str(id).ok()?.to_string();
        let visitor = self
            .write()
            .entry(id.clone())
            .or_insert_with(|| {
                info!(name: "visitor.restored", session_id = %id, "Visitor restored after expiry");
                self.build(id.clone())
            })
            .clone();
        visitor.touch();
        Some(visitor)
    }

    /// Remove a visitor.
    pub fn remove(&self, id: &str) -> Option<Visitor> {
        self.write().remove(id)
    }

    /// Number of live visitors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove visitors idle for longer than [`DEFAULT_IDLE_TIMEOUT`].
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    /// Remove visitors idle for longer than `timeout`.
    ///
    /// Returns the number removed. Pending chat replies for a removed visitor
    /// still run but land in a store nobody can reach.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, visitor| !visitor.is_expired_with_timeout(timeout));
        let removed = before - guard.len();
        if removed > 0 {
            debug!(name: "visitor.expired", removed, "Expired idle visitors");
        }
        removed
    }

    /// IDs of all live visitors.
    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn build(&self, id: String) -> Visitor {
        let chat = ChatWidget::new(Arc::clone(&self.inner.scheduler))
            .with_reply_delay(self.inner.reply_delay);
        Visitor::new(id, chat)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Visitor>> {
        self.inner
            .visitors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Visitor>> {
        self.inner
            .visitors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    fn store() -> (VisitorStore, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let store = VisitorStore::new(Arc::clone(&scheduler) as Arc<dyn Scheduler>);
        (store, scheduler)
    }

    #[test]
    fn test_visitor_store() {
        let (store, _) = store();
        assert!(store.is_empty());

        let visitor = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(visitor.id()).unwrap();
        assert_eq!(retrieved.id(), visitor.id());
        assert_eq!(store.list_ids(), vec![visitor.id().to_string()]);

        store.remove(visitor.id());
        assert!(store.is_empty());
        assert!(store.get(visitor.id()).is_none());
    }

    #[test]
    fn test_visitors_are_independent() {
        let (store, scheduler) = store();
        let a = store.create();
        let b = store.create();

        a.chat().send("sell");
        a.chat().open();
        scheduler.run_until_idle();

        assert_eq!(a.chat().transcript().len(), 3);
        assert_eq!(b.chat().transcript().len(), 1);
        assert!(!b.chat().is_open());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_handles_share_state() {
        let (store, _) = store();
        let visitor = store.create();
        let again = store.get(visitor.id()).unwrap();

        again.contact().set_field(crate::contact::FormField::Name, "Jane");
        assert_eq!(visitor.contact().state().form.name, "Jane");
    }

    #[test]
    fn test_theme_toggle() {
        let (store, _) = store();
        let visitor = store.create();
        assert_eq!(visitor.theme(), Theme::Light);
        assert_eq!(visitor.toggle_theme(), Theme::Dark);
        assert_eq!(visitor.toggle_theme(), Theme::Light);
    }

    #[test]
    fn test_cleanup_expired() {
        let (store, _) = store();
        let _visitor = store.create();

        assert_eq!(store.cleanup_expired(), 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_millis(5)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_resume_recreates_swept_visitor() {
        let (store, scheduler) = store();
        let visitor = store.create();
        let id = visitor.id().to_string();
        visitor.chat().send("sell");
        scheduler.run_until_idle();

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_millis(5)), 1);
        assert!(store.get(&id).is_none());

        let resumed = store.resume(&id).unwrap();
        assert_eq!(resumed.id(), id);
        assert_eq!(resumed.chat().transcript().len(), 1);
        assert_eq!(store.len(), 1);

        // A second resume finds the same visitor rather than building another.
        resumed.contact().set_field(crate::contact::FormField::Name, "Jane");
        assert_eq!(store.resume(&id).unwrap().contact().state().form.name, "Jane");
    }

    #[test]
    fn test_resume_keeps_live_visitor() {
        let (store, scheduler) = store();
        let visitor = store.create();
        visitor.chat().send("paid");
        scheduler.run_until_idle();

        let resumed = store.resume(visitor.id()).unwrap();
        assert_eq!(resumed.chat().transcript().len(), 3);
    }

    #[test]
    fn test_resume_rejects_foreign_ids() {
        let (store, _) = store();
        assert!(store.resume("missing").is_none());
        assert!(store.resume("").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_custom_reply_delay_reaches_widgets() {
        let scheduler = Arc::new(ManualScheduler::new());
        let store = VisitorStore::with_reply_delay(
            Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            Duration::from_millis(50),
        );
        let visitor = store.create();
        assert_eq!(visitor.chat().reply_delay(), Duration::from_millis(50));

        visitor.chat().send("paid");
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(visitor.chat().transcript().len(), 3);
    }
}
