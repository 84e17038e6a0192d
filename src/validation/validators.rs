//! Field validators used with `#[validate(custom(function = ...))]`

use std::borrow::Cow;
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects text that is empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be blank"));
    }
    Ok(())
}

pub fn validate_uuid(id: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| invalid("uuid", "must be a valid UUID"))
}

/// Organization slugs: lowercase alphanumerics and hyphens, no leading or
/// trailing hyphen, at most 63 characters.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() || slug.len() > 63 {
        return Err(invalid("slug", "must be 1 to 63 characters"));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            "slug",
            "must contain only lowercase letters, digits and hyphens",
        ));
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(invalid("slug", "must not start or end with a hyphen"));
    }

    Ok(())
}

/// Layout slot names: `[a-z0-9_-]{1,64}`
pub fn validate_slot(slot: &str) -> Result<(), ValidationError> {
    let well_formed = !slot.is_empty()
        && slot.len() <= 64
        && slot
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(invalid(
            "slot",
            "must be 1 to 64 lowercase letters, digits, hyphens or underscores",
        ))
    }
}

/// E.164 (`+` and up to 15 digits) or a plain 10-digit number, ignoring
/// spaces, hyphens and parentheses.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if let Some(digits) = cleaned.strip_prefix('+') {
        if !digits.is_empty() && digits.len() <= 15 && digits.chars().all(|c| c.is_ascii_digit())
        {
            return Ok(());
        }
    }

    if cleaned.len() == 10 && cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    Err(invalid("phone", "must be a valid phone number"))
}

/// Data model schemas must be JSON objects.
pub fn validate_json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(invalid("json_object", "must be a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("invalid-uuid").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Glass bank").is_ok());
        assert!(validate_not_blank("  x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t\n ").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("acme-recycling").is_ok());
        assert!(validate_slug("acme2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Acme").is_err());
        assert!(validate_slug("acme_recycling").is_err());
        assert!(validate_slug("-acme").is_err());
        assert!(validate_slug(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_slot() {
        assert!(validate_slot("dashboard-modules").is_ok());
        assert!(validate_slot("nav_items").is_ok());
        assert!(validate_slot(&"s".repeat(64)).is_ok());
        assert!(validate_slot(&"s".repeat(65)).is_err());
        assert!(validate_slot("Nav").is_err());
        assert!(validate_slot("a/b").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+4915123456789").is_ok());
        assert!(validate_phone("(555) 123-4567").is_ok());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_json_object() {
        assert!(validate_json_object(&serde_json::json!({"fields": []})).is_ok());
        assert!(validate_json_object(&serde_json::json!([1, 2])).is_err());
        assert!(validate_json_object(&serde_json::json!("text")).is_err());
    }
}
