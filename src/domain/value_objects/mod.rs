use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

const NATIONAL_NUMBER_LEN: usize = 10;
const MIN_INTERNATIONAL_LEN: usize = 11;
const MAX_INTERNATIONAL_LEN: usize = 15;

/// Destination address in canonical international-digits form (no leading `+`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipient(String);

impl Recipient {
    /// Normalizes a raw phone number.
    ///
    /// Separators (spaces, dashes, dots, parentheses) and an international
    /// prefix (`+` or `00`) are stripped. A bare national number of ten digits
    /// gets `default_country_code` prepended.
    pub fn parse(raw: &str, default_country_code: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation("recipient is empty".to_string()));
        }

        let without_prefix = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let mut digits = String::with_capacity(without_prefix.len());
        for ch in without_prefix.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => {
                    return Err(DomainError::Validation(format!(
                        "recipient contains invalid character '{other}'"
                    )));
                }
            }
        }

        if let Some(rest) = digits.strip_prefix("00") {
            digits = rest.to_string();
        }

        if digits.len() == NATIONAL_NUMBER_LEN && !trimmed.starts_with('+') {
            digits = format!("{default_country_code}{digits}");
        }

        if !(MIN_INTERNATIONAL_LEN..=MAX_INTERNATIONAL_LEN).contains(&digits.len()) {
            return Err(DomainError::Validation(format!(
                "recipient must have {MIN_INTERNATIONAL_LEN}-{MAX_INTERNATIONAL_LEN} digits, got {}",
                digits.len()
            )));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
