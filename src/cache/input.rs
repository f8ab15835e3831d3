use std::fmt;

/// A present score: an integer in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Accept a stored number only if it is an integer in range.
    pub fn from_persisted(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 && (0.0..=100.0).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed raw input for one criterion field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInput {
    /// Empty input: the score becomes absent.
    Clear,
    Set(Score),
}

impl ScoreInput {
    /// Parse raw field text. `None` means the input is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(Self::Clear);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Leading zeros are fine; anything too long for u8 is out of range.
        let value: u8 = trimmed.parse().ok()?;
        Score::new(value).map(Self::Set)
    }
}
