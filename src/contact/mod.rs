//! Contact form: field record, presence validation and submit state machine.
//!
//! The form is all-or-nothing: a submit succeeds only when all five fields
//! are non-empty, and a successful submit is final for the lifetime of the
//! component.
//!
//! # Example
//!
//! ```rust
//! use softsell::contact::{ContactForm, FormField, Submission};
//!
//! let form = ContactForm::new();
//! assert!(form.submit().is_err());
//!
//! for field in FormField::ALL {
//!     form.set_field(field, "x");
//! }
//! assert_eq!(form.submit().unwrap(), Submission::Accepted);
//! assert!(form.is_submitted());
//! ```

mod component;
mod error;
mod form;

pub use component::{ContactForm, ContactFormState, FormPhase, Submission};
pub use error::ContactError;
pub use form::{FormField, FormState, LICENSE_TYPES, validate};
