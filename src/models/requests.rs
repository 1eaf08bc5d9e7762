use serde::Deserialize;
use std::fmt;

const MAX_USERNAME_CHARS: usize = 64;
const MAX_PASSWORD_BYTES: usize = 256;

/// Body of `/register` and `/login`
///
/// Both fields are optional at the serde level so a missing field yields a
/// validation message instead of a deserialization rejection.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Validated username and password
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl CredentialsRequest {
    /// Validate and clean the username
    ///
    /// # Validation Rules
    ///
    /// - Must not be empty after trimming
    /// - At most 64 characters
    pub fn validate_username(username: &str) -> Result<String, String> {
        let cleaned = username.trim();

        if cleaned.is_empty() {
            return Err("username and password are required".to_string());
        }

        if cleaned.chars().count() > MAX_USERNAME_CHARS {
            return Err(format!(
                "username must be {} characters or less",
                MAX_USERNAME_CHARS
            ));
        }

        Ok(cleaned.to_string())
    }

    /// Validate the password
    ///
    /// Passwords are never trimmed; whitespace is significant.
    pub fn validate_password(password: &str) -> Result<(), String> {
        if password.is_empty() {
            return Err("username and password are required".to_string());
        }

        if password.len() > MAX_PASSWORD_BYTES {
            return Err(format!(
                "password must be {} bytes or less",
                MAX_PASSWORD_BYTES
            ));
        }

        Ok(())
    }

    /// Check presence and bounds of both fields
    ///
    /// # Returns
    ///
    /// Validated credentials, or a client-facing error message
    pub fn validate(self) -> Result<Credentials, String> {
        let (Some(username), Some(password)) = (self.username, self.password) else {
            return Err("username and password are required".to_string());
        };

        let username = Self::validate_username(&username)?;
        Self::validate_password(&password)?;

        Ok(Credentials { username, password })
    }
}

/// Query of `/games`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamesQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl GamesQuery {
    /// The search term, if present and non-blank
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: Option<&str>, password: Option<&str>) -> CredentialsRequest {
        CredentialsRequest {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_credentials() {
        let creds = request(Some("alice"), Some("s3cret")).validate().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn test_username_trimmed_password_kept() {
        let creds = request(Some("  alice "), Some(" s3cret ")).validate().unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, " s3cret ");
    }

    #[test]
    fn test_missing_or_empty_fields_rejected() {
        let cases = [
            (None, None),
            (None, Some("s3cret")),
            (Some("alice"), None),
            (Some(""), Some("s3cret")),
            (Some("   "), Some("s3cret")),
            (Some("alice"), Some("")),
            (Some(""), Some("")),
        ];

        for (username, password) in cases {
            assert!(
                request(username, password).validate().is_err(),
                "expected rejection for {:?}/{:?}",
                username,
                password
            );
        }
    }

    #[test]
    fn test_username_too_long() {
        let long_name = "a".repeat(65);
        assert!(CredentialsRequest::validate_username(&long_name).is_err());
        assert!(CredentialsRequest::validate_username(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_password_too_long() {
        assert!(CredentialsRequest::validate_password(&"p".repeat(257)).is_err());
        assert!(CredentialsRequest::validate_password(&"p".repeat(256)).is_ok());
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let parsed: CredentialsRequest = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(parsed.username.as_deref(), Some("alice"));
        assert!(parsed.password.is_none());

        let empty: CredentialsRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let req = request(Some("alice"), Some("hunter2"));
        assert!(!format!("{:?}", req).contains("hunter2"));

        let creds = req.validate().unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_games_query_term() {
        let query = GamesQuery {
            search: Some("  witcher ".to_string()),
        };
        assert_eq!(query.term(), Some("witcher"));

        assert_eq!(GamesQuery::default().term(), None);
        assert_eq!(
            GamesQuery {
                search: Some("   ".to_string())
            }
            .term(),
            None
        );
    }
}
