//! Business outcomes.
//!
//! Services report expected, user-facing refusals (insufficient stock, empty
//! cart, invalid coupon) as [`Outcome::Rejected`] values. The `Err` channel is
//! reserved for exceptional conditions: missing session identity, validation
//! failures, and store errors. The two channels are never conflated.

use std::collections::BTreeMap;

/// Result of a service operation on the business channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation took effect.
    Completed(T),

    /// The operation was refused with a user-facing message. Nothing was
    /// persisted.
    Rejected { message: String },
}

impl<T> Outcome<T> {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns the completed value, or `None` when rejected.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// Returns the rejection message, or `None` when completed.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected { message } => Some(message),
        }
    }
}

/// Field-level validation failures: field name to human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }

                write!(f, "{field}: {message}")?;
                first = false;
            }
        }

        Ok(())
    }
}
