use cookie::{Cookie, SameSite};

use super::AuthConfig;

/// Builds the `Set-Cookie` values for the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// HttpOnly, SameSite=Lax cookie holding `token`
    pub fn issue(&self, token: &str) -> String {
        Cookie::build((self.name.clone(), token.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
            .to_string()
    }

    /// Expired, empty cookie that makes the browser drop the session
    pub fn clear(&self) -> String {
        let mut cookie = Cookie::build((self.name.clone(), String::new()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build();
        cookie.make_removal();
        cookie.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_flags() {
        let cookie = SessionCookie::new(&AuthConfig::default()).issue("tok");
        assert!(cookie.starts_with("verdant_session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_clear_expires_cookie() {
        let mut config = AuthConfig::default();
        config.cookie_secure = false;
        let cookie = SessionCookie::new(&config).clear();
        assert!(cookie.starts_with("verdant_session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}
