use thiserror::Error;

use super::FormField;

/// Errors produced by the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// At least one field is empty. Recoverable: entered values are kept.
    #[error("Please fill all fields.")]
    MissingFields {
        /// Empty fields in display order.
        missing: Vec<FormField>,
    },

    /// A form body named a field the form does not have.
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}
