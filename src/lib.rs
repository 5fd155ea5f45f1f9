//! SoftSell landing page
//!
//! A server-rendered marketing page for a software-license resale platform,
//! with a contact form and a scripted chat assistant. HTML-first: the page is
//! rendered on the server and HTMX swaps fragments in place.
//!
//! # Architecture
//!
//! - **Components**: the contact form and chat widget are plain library types
//!   holding their state in a [`store::Store`], testable without any HTML.
//! - **Scheduling**: chat replies are delayed through an injectable
//!   [`scheduler::Scheduler`].
//! - **Server**: Axum routes that map form posts onto component operations
//!   and render the resulting fragment.
//!
//! # Modules
//!
//! - [`contact`]: contact form record, validation and submit state machine
//! - [`chat`]: keyword rules, transcript and chat widget
//! - [`store`]: state container with subscribers
//! - [`scheduler`]: delayed callbacks (tokio and manual clocks)
//! - [`visitor`]: per-page-view sessions
//! - [`page`]: static content and HTML rendering
//! - [`server`]: router, handlers and startup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod contact;
pub mod error;
pub mod page;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod visitor;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::scheduler::Scheduler;
use crate::visitor::VisitorStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live visitor sessions.
    pub visitors: VisitorStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state whose chat replies run on `scheduler`.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, scheduler: Arc<dyn Scheduler>) -> Self {
        let visitors = VisitorStore::with_reply_delay(scheduler, config.chat.reply_delay());
        Self { visitors, config }
    }
}
