/// Read `VERDANT_{key}`, falling back to plain `{key}`.
///
/// The fallback keeps platform conventions working (`PORT`, `DATABASE_URL`)
/// while still letting a deployment pin values under the app prefix.
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("VERDANT_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse an environment value, ignoring it when it does not parse.
pub fn parse_env_with_prefix<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env_with_prefix(key).and_then(|value| value.trim().parse().ok())
}

/// Current Unix time in seconds.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("VERDANT_ENV_TEST_PREFIXED", "prefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_PREFIXED"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("VERDANT_ENV_TEST_PREFIXED");
        }

        unsafe {
            std::env::set_var("ENV_TEST_FALLBACK", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_FALLBACK"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_FALLBACK");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_MISSING"), None);
    }

    #[test]
    fn test_parse_env_ignores_garbage() {
        unsafe {
            std::env::set_var("VERDANT_ENV_TEST_NUMBER", "not-a-number");
        }
        assert_eq!(parse_env_with_prefix::<u16>("ENV_TEST_NUMBER"), None);
        unsafe {
            std::env::set_var("VERDANT_ENV_TEST_NUMBER", " 42 ");
        }
        assert_eq!(parse_env_with_prefix::<u16>("ENV_TEST_NUMBER"), Some(42));
        unsafe {
            std::env::remove_var("VERDANT_ENV_TEST_NUMBER");
        }
    }
}
