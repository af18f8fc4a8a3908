//! Weight expressions and the change-detection policy.
//!
//! HAProxy reports relative weights as small integers (the configured
//! baseline reads back as `"1"`) while accepting `N%` on input. Apart from
//! the two literal equivalences in [`is_change_needed`], a requested value is
//! compared to the reported one by string identity only. `"50%"` against a
//! reported `"1"` therefore always counts as a change. Adding percentage
//! arithmetic here would change which runs report `changed`.

use std::fmt;
use std::str::FromStr;

use crate::error::ReconcileError;

/// Largest absolute weight HAProxy accepts.
pub const MAX_ABSOLUTE_WEIGHT: u16 = 256;

/// Largest relative weight, in percent.
pub const MAX_RELATIVE_WEIGHT: u8 = 100;

/// A validated `set weight` argument. Keeps the caller's original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightExpr(String);

impl WeightExpr {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_relative(&self) -> bool {
        self.0.ends_with('%')
    }
}

impl FromStr for WeightExpr {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ReconcileError::InvalidWeight {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() || s.starts_with('+') {
            return Err(invalid("expected an integer or a percentage"));
        }

        let digits = s.strip_suffix('%').unwrap_or(s);
        if digits.len() > 1 && digits.starts_with('0') {
            // Reported weights are never zero-padded.
            return Err(invalid("leading zeros are not allowed"));
        }

        match s.strip_suffix('%') {
            Some(pct) => {
                let value: u8 = pct
                    .parse()
                    .map_err(|_| invalid("expected a percentage between 0% and 100%"))?;
                if value > MAX_RELATIVE_WEIGHT {
                    return Err(invalid("relative weights must be between 0% and 100%"));
                }
            }
            None => {
                let value: u16 = s
                    .parse()
                    .map_err(|_| invalid("expected an integer or a percentage"))?;
                if value > MAX_ABSOLUTE_WEIGHT {
                    return Err(invalid("absolute weights must be between 0 and 256"));
                }
            }
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for WeightExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decide whether `requested` differs from the server's `current` weight.
pub fn is_change_needed(requested: Option<&WeightExpr>, current: &str) -> bool {
    let Some(requested) = requested else {
        return false;
    };

    match (requested.as_str(), current) {
        // Full relative weight, already in effect.
        ("100%", "1") => false,
        // Fully drained, already in effect.
        ("0%", "0") => false,
        (req, cur) => req != cur,
    }
}
