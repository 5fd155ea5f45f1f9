//! Landing page content and HTML rendering.
//!
//! # Structure
//!
//! - [`content`]: static copy (metadata, steps, features, testimonials)
//! - [`render`]: full page and HTMX fragments rendered from component state

pub mod content;
pub mod render;

pub use content::METADATA;
pub use render::{chat_transcript, chat_widget, contact_form, escape_html, page_root, render_page};
