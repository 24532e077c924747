//! Dashboard form handling.
//!
//! Forms arrive as flat string maps. [`FormReader`] pulls typed values out of
//! one, collecting every problem instead of stopping at the first, so a
//! re-rendered form can mark all bad fields at once. Records then run their
//! own [`Record::validate`](forgepilot_core::Record::validate) on top.
//!
//! Free-text JSON fields are lenient: malformed input is logged and the
//! field keeps its previous value, and the save goes ahead.

mod fields;
mod records;

use std::collections::HashMap;
use std::str::FromStr;

use forgepilot_core::{Email, PublishStatus, Record, RecordError, Slug};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

pub use fields::{FieldView, SelectOption, with_errors};
pub(crate) use records::{date, truncate};

/// A submitted form.
pub type FormData = HashMap<String, String>;

/// One problem with a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{label} is required")]
    Required {
        field: &'static str,
        label: &'static str,
    },
    #[error("{label} must be a number")]
    Number {
        field: &'static str,
        label: &'static str,
    },
    #[error("{label}: {reason}")]
    Invalid {
        field: &'static str,
        label: &'static str,
        reason: String,
    },
}

impl FormError {
    /// Name of the offending input.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required { field, .. }
            | Self::Number { field, .. }
            | Self::Invalid { field, .. } => *field,
        }
    }
}

impl From<RecordError> for FormError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Required(field) => Self::Required {
                field,
                label: field,
            },
            RecordError::Invalid { field, reason } => Self::Invalid {
                field,
                label: field,
                reason,
            },
            RecordError::OutOfRange { field, min, max } => Self::Invalid {
                field,
                label: field,
                reason: format!("must be between {min} and {max}"),
            },
        }
    }
}

/// All problems with a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FormError>);

impl FormErrors {
    pub fn push(&mut self, error: FormError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for `field`, for inline display.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<String> {
        self.0
            .iter()
            .find(|e| e.field() == field)
            .map(ToString::to_string)
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl From<FormError> for FormErrors {
    fn from(error: FormError) -> Self {
        Self(vec![error])
    }
}

impl From<RecordError> for FormErrors {
    fn from(error: RecordError) -> Self {
        FormError::from(error).into()
    }
}

/// A record type the dashboard can list, create and edit.
pub trait Editable: Record + Default {
    /// URL segment under `/dashboard`.
    const KIND: &'static str;
    /// Plural label for navigation and headings.
    const LABEL: &'static str;
    /// Singular label for buttons ("New service").
    const SINGULAR: &'static str;

    /// Table column headers.
    fn columns() -> Vec<&'static str>;

    /// Table cells, one per column.
    fn cells(&self) -> Vec<String>;

    /// Form inputs pre-filled from this record.
    fn fields(&self) -> Vec<FieldView>;

    /// Overwrite this record with submitted values.
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found.
    fn apply(&mut self, form: &FormData) -> Result<(), FormErrors>;

    /// [`Self::apply`] followed by the record's own validation.
    ///
    /// # Errors
    ///
    /// Returns field problems, or the first record constraint violated.
    fn apply_and_validate(&mut self, form: &FormData) -> Result<(), FormErrors> {
        self.apply(form)?;
        self.validate().map_err(FormErrors::from)
    }
}

/// Typed reads from a [`FormData`], accumulating errors.
pub struct FormReader<'a> {
    data: &'a FormData,
    errors: FormErrors,
}

impl<'a> FormReader<'a> {
    #[must_use]
    pub fn new(data: &'a FormData) -> Self {
        Self {
            data,
            errors: FormErrors::default(),
        }
    }

    /// Trimmed value, empty when absent.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.data
            .get(field)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Value with line endings normalized but inner whitespace kept, for
    /// markdown bodies.
    #[must_use]
    pub fn body(&self, field: &str) -> String {
        self.data
            .get(field)
            .map(|v| v.replace("\r\n", "\n").trim_end().to_string())
            .unwrap_or_default()
    }

    pub fn required(&mut self, field: &'static str, label: &'static str) -> String {
        let value = self.text(field);
        if value.is_empty() {
            self.errors.push(FormError::Required { field, label });
        }
        value
    }

    /// A number; empty input yields `default`.
    pub fn number<T: FromStr>(&mut self, field: &'static str, label: &'static str, default: T) -> T {
        let value = self.text(field);
        if value.is_empty() {
            return default;
        }
        value.parse().unwrap_or_else(|_| {
            self.errors.push(FormError::Number { field, label });
            default
        })
    }

    /// A decimal amount; accepts a leading currency symbol and thousands separators.
    pub fn decimal(&mut self, field: &'static str, label: &'static str) -> Decimal {
        let value = self.text(field);
        let cleaned: String = value
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '.')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if cleaned.is_empty() {
            return Decimal::ZERO;
        }
        Decimal::from_str(&cleaned).unwrap_or_else(|_| {
            self.errors.push(FormError::Number { field, label });
            Decimal::ZERO
        })
    }

    /// Checkbox inputs are only submitted when ticked.
    #[must_use]
    pub fn checkbox(&self, field: &str) -> bool {
        self.data
            .get(field)
            .is_some_and(|v| matches!(v.as_str(), "on" | "true" | "1" | "yes"))
    }

    /// One entry per non-blank line.
    #[must_use]
    pub fn lines(&self, field: &str) -> Vec<String> {
        self.data
            .get(field)
            .map(|v| {
                v.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Comma-separated tags, deduplicated.
    #[must_use]
    pub fn tags(&self, field: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.text(field).split(',').map(str::trim) {
            if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    /// A free-text JSON field.
    ///
    /// Absent keeps `previous`, blank clears to the default, and malformed
    /// JSON is logged and keeps `previous`. Never an error.
    pub fn json<T: DeserializeOwned + Default>(&self, field: &str, previous: T) -> T {
        let Some(raw) = self.data.get(field) else {
            return previous;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return T::default();
        }
        match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(field, error = %e, "Malformed JSON in form field, keeping previous value");
                previous
            }
        }
    }

    /// A slug, derived from `title` when left blank.
    pub fn slug(&mut self, field: &'static str, label: &'static str, title: &str) -> String {
        let value = self.text(field);
        if value.is_empty() {
            return Slug::slugify(title).to_string();
        }
        match Slug::parse(&value) {
            Ok(slug) => slug.to_string(),
            Err(e) => {
                self.errors.push(FormError::Invalid {
                    field,
                    label,
                    reason: e.to_string(),
                });
                value
            }
        }
    }

    /// An optional email address.
    pub fn email(&mut self, field: &'static str, label: &'static str) -> String {
        let value = self.text(field);
        if value.is_empty() {
            return value;
        }
        if let Err(e) = Email::parse(&value) {
            self.errors.push(FormError::Invalid {
                field,
                label,
                reason: e.to_string(),
            });
        }
        value
    }

    #[must_use]
    pub fn status(&self, field: &str) -> PublishStatus {
        PublishStatus::from_form(&self.text(field))
    }

    /// Record a problem found by the caller.
    pub fn invalid(&mut self, field: &'static str, label: &'static str, reason: impl Into<String>) {
        self.errors.push(FormError::Invalid {
            field,
            label,
            reason: reason.into(),
        });
    }

    /// # Errors
    ///
    /// Returns the collected problems, if any.
    pub fn finish(self) -> Result<(), FormErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
