//! Contact form component state machine.

use serde::Serialize;
use tracing::debug;

use super::{ContactError, FormField, FormState, validate};
use crate::store::Store;

/// Where the form is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    /// Accepting input; submit may be attempted any number of times.
    #[default]
    Editing,
    /// Submitted successfully. Terminal.
    Submitted,
}

/// Everything the contact form renders from.
///
/// `phase` and `error` are derived from submit attempts and live beside the
/// form record rather than inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactFormState {
    pub form: FormState,
    pub phase: FormPhase,
    pub error: Option<String>,
}

impl ContactFormState {
    /// Whether the confirmation replaces the submit control.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == FormPhase::Submitted
    }
}

/// Outcome of a submit that did not fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// This call moved the form to [`FormPhase::Submitted`].
    Accepted,
    /// The form was already submitted; nothing changed.
    AlreadySubmitted,
}

/// The contact form component.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    store: Store<ContactFormState>,
}

impl ContactForm {
    /// Create an empty form in the editing phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying state container, for subscribing to changes.
    #[must_use]
    pub fn store(&self) -> &Store<ContactFormState> {
        &self.store
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ContactFormState {
        self.store.get_state()
    }

    /// Whether the form has been submitted.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.store.with_state(ContactFormState::is_submitted)
    }

    /// The inline error from the last failed submit, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.store.with_state(|s| s.error.clone())
    }

    /// Update a single field.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        self.store.set_state(|s| s.form.set(field, value));
    }

    /// Replace every field at once, as a full form post does.
    pub fn set_form(&self, form: FormState) {
        self.store.set_state(|s| s.form = form);
    }

    /// Attempt to submit the current values.
    ///
    /// Validation is re-run from scratch on every attempt. Once submitted,
    /// further calls return [`Submission::AlreadySubmitted`] without touching
    /// state or notifying subscribers.
    pub fn submit(&self) -> Result<Submission, ContactError> {
        let outcome = self.store.try_set_state(|s| {
            if s.is_submitted() {
                return None;
            }
            Some(match validate(&s.form) {
                Ok(()) => {
                    s.phase = FormPhase::Submitted;
                    s.error = None;
                    Ok(Submission::Accepted)
                }
                Err(err) => {
                    s.error = Some(err.to_string());
                    Err(err)
                }
            })
        });

        match outcome {
            Some(result) => result,
            None => {
                debug!(name: "contact.resubmit.ignored", "Contact form already submitted");
                Ok(Submission::AlreadySubmitted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fill(form: &ContactForm) {
        form.set_field(FormField::Name, "John Smith");
        form.set_field(FormField::Email, "john@beta.test");
        form.set_field(FormField::Company, "Beta Ltd");
        form.set_field(FormField::LicenseType, "Microsoft");
        form.set_field(FormField::Message, "Selling 40 Office seats");
    }

    #[test]
    fn test_missing_fields_sets_error_and_stays_editing() {
        let form = ContactForm::new();
        form.set_field(FormField::Name, "John Smith");

        let err = form.submit().unwrap_err();
        assert!(matches!(err, ContactError::MissingFields { ref missing } if missing.len() == 4));

        let state = form.state();
        assert_eq!(state.phase, FormPhase::Editing);
        assert_eq!(state.error.as_deref(), Some("Please fill all fields."));
        assert_eq!(state.form.name, "John Smith");
    }

    #[test]
    fn test_correcting_input_then_submitting_clears_error() {
        let form = ContactForm::new();
        assert!(form.submit().is_err());
        assert!(form.error().is_some());

        fill(&form);
        assert_eq!(form.submit().unwrap(), Submission::Accepted);
        assert!(form.is_submitted());
        assert!(form.error().is_none());
    }

    #[test]
    fn test_resubmit_is_a_no_op() {
        let form = ContactForm::new();
        fill(&form);
        form.submit().unwrap();

        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        form.store().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let before = form.state();
        assert_eq!(form.submit().unwrap(), Submission::AlreadySubmitted);
        assert_eq!(form.state(), before);
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_resubmit_after_clearing_a_field_still_no_error() {
        let form = ContactForm::new();
        fill(&form);
        form.submit().unwrap();

        form.set_field(FormField::Email, "");
        assert_eq!(form.submit().unwrap(), Submission::AlreadySubmitted);
        assert!(form.is_submitted());
        assert!(form.error().is_none());
    }

    #[test]
    fn test_set_form_replaces_all_fields() {
        let form = ContactForm::new();
        form.set_form(FormState {
            name: "a".into(),
            email: "b".into(),
            company: "c".into(),
            license_type: "Other".into(),
            message: "e".into(),
        });
        assert!(form.state().form.is_complete());
    }
}
