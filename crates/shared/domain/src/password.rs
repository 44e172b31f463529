//! Password value object and strength scoring.

use serde::{Deserialize, Serialize};

use crate::constants::{COLOR_INVALID, COLOR_NEUTRAL, COLOR_VALID, COLOR_WARNING, MIN_PASSWORD_LENGTH};

/// Plain-text password held only long enough to be sent to the backend.
///
/// Never read back from the API. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(plain: impl Into<String>) -> Self {
        Self(plain.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score this password against the strength criteria
    pub fn strength(&self) -> PasswordStrength {
        PasswordStrength::evaluate(&self.0)
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Strength tier of a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum StrengthTier {
    Weak,
    Medium,
    Strong,
}

impl StrengthTier {
    /// Percentage shown on the strength bar
    pub fn percent(self) -> u8 {
        match self {
            StrengthTier::Weak => 33,
            StrengthTier::Medium => 66,
            StrengthTier::Strong => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StrengthTier::Weak => "Weak",
            StrengthTier::Medium => "Medium",
            StrengthTier::Strong => "Strong",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StrengthTier::Weak => COLOR_INVALID,
            StrengthTier::Medium => COLOR_WARNING,
            StrengthTier::Strong => COLOR_VALID,
        }
    }
}

/// Which of the five criteria a password satisfies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Criteria {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl Criteria {
    pub fn of(plain: &str) -> Self {
        Self {
            length: plain.chars().count() >= MIN_PASSWORD_LENGTH,
            uppercase: plain.chars().any(|c| c.is_uppercase()),
            lowercase: plain.chars().any(|c| c.is_lowercase()),
            digit: plain.chars().any(|c| c.is_ascii_digit()),
            symbol: plain.chars().any(|c| !c.is_alphanumeric()),
        }
    }

    /// Number of satisfied criteria, 0 to 5
    pub fn count(&self) -> u8 {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.digit,
            self.symbol,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }
}

/// Evaluated strength: criteria, tier and the feedback derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub criteria: Criteria,
    /// `None` for an empty password, which gets neutral feedback
    pub tier: Option<StrengthTier>,
}

impl PasswordStrength {
    pub fn evaluate(plain: &str) -> Self {
        let criteria = Criteria::of(plain);
        let tier = if plain.is_empty() {
            None
        } else {
            Some(match criteria.count() {
                0..=2 => StrengthTier::Weak,
                3..=4 => StrengthTier::Medium,
                _ => StrengthTier::Strong,
            })
        };
        Self { criteria, tier }
    }

    pub fn percent(&self) -> u8 {
        self.tier.map(StrengthTier::percent).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        self.tier.map(StrengthTier::label).unwrap_or("")
    }

    pub fn color(&self) -> &'static str {
        self.tier.map(StrengthTier::color).unwrap_or(COLOR_NEUTRAL)
    }
}

/// Feedback for the confirmation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PasswordMatch {
    /// Confirmation not typed yet
    Empty,
    Matches,
    Mismatch,
}

impl PasswordMatch {
    pub fn check(password: &str, confirmation: &str) -> Self {
        if confirmation.is_empty() {
            PasswordMatch::Empty
        } else if password == confirmation {
            PasswordMatch::Matches
        } else {
            PasswordMatch::Mismatch
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PasswordMatch::Empty => COLOR_NEUTRAL,
            PasswordMatch::Matches => COLOR_VALID,
            PasswordMatch::Mismatch => COLOR_INVALID,
        }
    }
}
