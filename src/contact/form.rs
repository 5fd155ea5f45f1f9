//! Contact form record and presence validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ContactError;

/// License types offered by the select box.
pub const LICENSE_TYPES: [&str; 4] = ["Microsoft", "Adobe", "Autodesk", "Other"];

/// One of the five contact form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Company,
    LicenseType,
    Message,
}

impl FormField {
    /// All fields in display order.
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Email,
        FormField::Company,
        FormField::LicenseType,
        FormField::Message,
    ];

    /// Name used for the HTML `name` attribute and form bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Company => "company",
            Self::LicenseType => "license_type",
            Self::Message => "message",
        }
    }

    /// Placeholder shown in the empty input.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Company => "Company",
            Self::LicenseType => "Select License Type",
            Self::Message => "Message",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ContactError::UnknownField(s.to_string()))
    }
}

/// Values typed into the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub license_type: String,
    #[serde(default)]
    pub message: String,
}

impl FormState {
    /// Current value of `field`.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Company => &self.company,
            FormField::LicenseType => &self.license_type,
            FormField::Message => &self.message,
        }
    }

    /// Replace the value of `field`.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Company => &mut self.company,
            FormField::LicenseType => &mut self.license_type,
            FormField::Message => &mut self.message,
        };
        *slot = value.into();
    }

    /// Fields that are still empty, in display order.
    ///
    /// Only the empty string counts; whitespace is a value.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    /// True when every field has a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        FormField::ALL
            .into_iter()
            .all(|field| !self.get(field).is_empty())
    }
}

/// Presence check: every field must be non-empty. No format checks.
pub fn validate(form: &FormState) -> Result<(), ContactError> {
    let missing = form.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ContactError::MissingFields { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> FormState {
        FormState {
            name: "Jane Doe".into(),
            email: "jane@acme.test".into(),
            company: "Acme Corp".into(),
            license_type: "Adobe".into(),
            message: "Two seats to sell".into(),
        }
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let err = validate(&FormState::default()).unwrap_err();
        match err {
            ContactError::MissingFields { missing } => {
                assert_eq!(missing, FormField::ALL.to_vec());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_any_single_empty_field_fails() {
        for field in FormField::ALL {
            let mut form = complete();
            form.set(field, "");
            let err = validate(&form).unwrap_err();
            assert_eq!(
                err,
                ContactError::MissingFields {
                    missing: vec![field]
                },
                "field {field} should be reported"
            );
        }
    }

    #[test]
    fn test_presence_only_accepts_malformed_values() {
        let mut form = complete();
        form.set(FormField::Email, "not-an-email");
        form.set(FormField::LicenseType, "Something Custom");
        form.set(FormField::Message, " ");
        assert!(validate(&form).is_ok());
        assert!(form.is_complete());
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in FormField::ALL {
            assert_eq!(field.as_str().parse::<FormField>().unwrap(), field);
        }
        assert!(matches!(
            "phone".parse::<FormField>(),
            Err(ContactError::UnknownField(name)) if name == "phone"
        ));
    }
}
