//! Scripted chat assistant.
//!
//! - [`rules`]: keyword rules and [`classify`]
//! - [`transcript`]: messages and the append-only [`Transcript`]
//! - [`widget`]: the [`ChatWidget`] component
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use softsell::chat::ChatWidget;
//! use softsell::scheduler::ManualScheduler;
//!
//! let scheduler = Arc::new(ManualScheduler::new());
//! let widget = ChatWidget::new(scheduler.clone());
//! widget.send("Is my data safe?");
//! scheduler.advance(Duration::from_millis(800));
//! assert_eq!(widget.transcript().len(), 3);
//! ```

pub mod rules;
pub mod transcript;
pub mod widget;

pub use rules::{FALLBACK_REPLY, KEYWORD_RULES, KeywordRule, classify};
pub use transcript::{ChatMessage, EXAMPLE_QUESTIONS, GREETING, Sender, Transcript};
pub use widget::{ChatState, ChatWidget, DEFAULT_REPLY_DELAY, Visibility};
