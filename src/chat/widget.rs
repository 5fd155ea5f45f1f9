//! Chat widget component: visibility plus the transcript.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{ChatMessage, Transcript, classify};
use crate::scheduler::Scheduler;
use crate::store::Store;

/// Delay between a user message and the scripted reply.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(800);

/// Whether the chat panel is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

/// Everything the chat widget renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatState {
    pub visibility: Visibility,
    pub transcript: Transcript,
    /// Text typed into the input but not sent yet.
    pub draft: String,
}

impl ChatState {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }
}

/// The chat widget component.
///
/// User messages land in the transcript immediately; the reply is appended
/// later by a task handed to the injected [`Scheduler`]. Replies to messages
/// sent in quick succession are appended in whatever order their tasks run.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    store: Store<ChatState>,
    scheduler: Arc<dyn Scheduler>,
    reply_delay: Duration,
}

impl ChatWidget {
    /// Create a closed widget with a greeting-only transcript.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            store: Store::default(),
            scheduler,
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }

    /// Override the reply delay.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    /// Underlying state container, for subscribing to changes.
    #[must_use]
    pub fn store(&self) -> &Store<ChatState> {
        &self.store
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ChatState {
        self.store.get_state()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.store.with_state(ChatState::is_open)
    }

    /// Snapshot of the transcript.
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.store.with_state(|s| s.transcript.clone())
    }

    pub fn open(&self) {
        self.set_visibility(Visibility::Open);
    }

    pub fn close(&self) {
        self.set_visibility(Visibility::Closed);
    }

    /// Current unsent input.
    #[must_use]
    pub fn draft(&self) -> String {
        self.store.with_state(|s| s.draft.clone())
    }

    /// Record what is sitting in the input box.
    pub fn set_draft(&self, text: impl Into<String>) {
        let text = text.into();
        self.store.set_state(|s| s.draft = text);
    }

    /// Flip between open and closed. Returns the new visibility.
    pub fn toggle(&self) -> Visibility {
        self.store.set_state(|s| {
            s.visibility = match s.visibility {
                Visibility::Open => Visibility::Closed,
                Visibility::Closed => Visibility::Open,
            };
            s.visibility
        })
    }

    /// Send a user message and schedule the scripted reply.
    ///
    /// Empty input is ignored and returns `false`. Sending clears the draft.
    pub fn send(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let reply = classify(text);
        self.store.set_state(|s| {
            s.transcript.push(ChatMessage::user(text));
            s.draft.clear();
        });
        debug!(
            name: "chat.reply.scheduled",
            delay = ?self.reply_delay,
            "Scheduled scripted reply"
        );

        let store = self.store.clone();
        self.scheduler.schedule(
            self.reply_delay,
            Box::new(move || {
                store.set_state(|s| s.transcript.push(ChatMessage::bot(reply)));
                debug!(name: "chat.reply.sent", reply, "Scripted reply appended");
            }),
        );
        true
    }

    fn set_visibility(&self, visibility: Visibility) {
        self.store.set_state(|s| s.visibility = visibility);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{FALLBACK_REPLY, GREETING, Sender};
    use crate::scheduler::ManualScheduler;

    fn widget() -> (ChatWidget, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let widget = ChatWidget::new(Arc::clone(&scheduler) as Arc<dyn Scheduler>);
        (widget, scheduler)
    }

    #[test]
    fn test_starts_closed_with_greeting() {
        let (widget, _) = widget();
        assert!(!widget.is_open());
        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].text, GREETING);
    }

    #[test]
    fn test_user_message_is_immediate_reply_is_delayed() {
        let (widget, scheduler) = widget();

        assert!(widget.send("How fast do I get paid?"));
        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().sender, Sender::User);

        scheduler.advance(Duration::from_millis(799));
        assert_eq!(widget.transcript().len(), 2);

        scheduler.advance(Duration::from_millis(1));
        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        let reply = transcript.last().unwrap();
        assert_eq!(reply.sender, Sender::Bot);
        assert!(reply.text.contains("24 hours"));
    }

    #[test]
    fn test_each_send_adds_user_then_bot() {
        let (widget, scheduler) = widget();

        for (i, text) in ["sell", "asdkjf", "safe?"].iter().enumerate() {
            widget.send(text);
            scheduler.run_until_idle();
            let transcript = widget.transcript();
            assert_eq!(transcript.len(), 1 + 2 * (i + 1));
            let tail = &transcript.messages()[transcript.len() - 2..];
            assert_eq!(tail[0], ChatMessage::user(*text));
            assert_eq!(tail[1].sender, Sender::Bot);
        }
        assert_eq!(widget.transcript().messages()[4].text, FALLBACK_REPLY);
    }

    #[test]
    fn test_empty_input_is_ignored() {
        let (widget, scheduler) = widget();
        assert!(!widget.send(""));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(widget.transcript().len(), 1);
    }

    #[test]
    fn test_open_close_leaves_transcript_alone() {
        let (widget, scheduler) = widget();
        widget.send("is my data safe");
        scheduler.run_until_idle();
        let before = widget.transcript();

        widget.open();
        assert!(widget.is_open());
        widget.close();
        assert!(!widget.is_open());
        assert_eq!(widget.toggle(), Visibility::Open);
        assert_eq!(widget.toggle(), Visibility::Closed);

        assert_eq!(widget.transcript(), before);
    }

    #[test]
    fn test_draft_survives_until_sent() {
        let (widget, scheduler) = widget();
        widget.set_draft("how fast");
        widget.close();
        widget.open();
        assert_eq!(widget.draft(), "how fast");

        assert!(!widget.send(""));
        assert_eq!(widget.draft(), "how fast");

        widget.send("how fast do I get paid");
        assert!(widget.draft().is_empty());
        scheduler.run_until_idle();
        assert_eq!(widget.transcript().len(), 3);
    }

    #[test]
    fn test_reply_lands_while_closed() {
        let (widget, scheduler) = widget();
        widget.open();
        widget.send("sell");
        widget.close();
        scheduler.run_until_idle();
        assert_eq!(widget.transcript().len(), 3);
    }

    #[test]
    fn test_overlapping_sends_resolve_in_timer_order() {
        let (widget, scheduler) = widget();
        let widget = widget.with_reply_delay(Duration::from_millis(800));

        widget.send("sell");
        scheduler.advance(Duration::from_millis(100));
        widget.send("paid");
        scheduler.run_until_idle();

        let senders: Vec<Sender> = widget.transcript().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::User, Sender::Bot, Sender::Bot]
        );
    }
}
