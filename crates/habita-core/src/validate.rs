//! Input validation helpers.
//!
//! All checks fail fast with a `Validation` error carrying a
//! field-specific message, before any side effect runs.

use crate::error::{HabitaError, HabitaResult};

/// Reject absent or blank required fields.
pub fn required(field: &str, value: &str) -> HabitaResult<()> {
    if value.trim().is_empty() {
        return Err(HabitaError::validation(format!(
            "missing required field: {field}"
        )));
    }
    Ok(())
}

/// Basic `local@domain.tld` shape check.
///
/// Deliberately minimal; the identity provider performs its own
/// verification; this only rejects obviously malformed input early.
pub fn email_shape(email: &str) -> HabitaResult<()> {
    let invalid = || HabitaError::validation("invalid email format");

    if email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(required("email", "").is_err());
        assert!(required("email", "   ").is_err());
        assert!(required("email", "a@b.com").is_ok());
    }

    #[test]
    fn email_shape_accepts_plain_addresses() {
        for ok in ["a@b.com", "first.last@sub.domain.co", "x+tag@y.io"] {
            assert!(email_shape(ok).is_ok(), "{ok} should pass");
        }
    }

    #[test]
    fn email_shape_rejects_malformed() {
        for bad in [
            "", "plain", "@b.com", "a@", "a@b", "a b@c.com", "a@b..", "a@.com", "a@@b.com",
        ] {
            assert!(email_shape(bad).is_err(), "{bad} should fail");
        }
    }
}
