//! OAuth2 access tokens.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Seconds before the actual expiry at which a token is treated as expired.
pub const EXPIRY_DELTA_SECS: i64 = 10;

/// An access token issued by the token endpoint.
#[derive(Clone)]
pub struct Token {
    access_token: SecretString,
    token_type: String,
    expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Creates a new token.
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expiry: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            token_type: token_type.into(),
            expiry,
        }
    }

    /// Returns the access token (exposing the secret).
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Returns the expiry time, if the server sent one.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Returns the token type with well-known schemes case-normalized.
    ///
    /// Unknown types such as `BearerToken` are returned untouched.
    pub fn token_type(&self) -> &str {
        let token_type = self.token_type.as_str();
        if token_type.is_empty() || token_type.eq_ignore_ascii_case("bearer") {
            "Bearer"
        } else if token_type.eq_ignore_ascii_case("mac") {
            "MAC"
        } else if token_type.eq_ignore_ascii_case("basic") {
            "Basic"
        } else {
            token_type
        }
    }

    /// Returns the `Authorization` header value for this token.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type(), self.access_token())
    }

    /// Returns true if the token has expired at `now`, counting the early
    /// expiry window.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry - Duration::seconds(EXPIRY_DELTA_SECS) < now)
    }

    /// Returns true if the token is non-empty and not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token().is_empty() && !self.is_expired_at(Utc::now())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Token endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Parses a form-encoded token response.
    pub fn from_form(body: &[u8]) -> Self {
        let mut response = TokenResponse {
            access_token: String::new(),
            token_type: String::new(),
            expires_in: None,
        };

        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "access_token" => response.access_token = value.into_owned(),
                "token_type" => response.token_type = value.into_owned(),
                "expires_in" => response.expires_in = value.parse().ok(),
                _ => {}
            }
        }

        response
    }

    /// Converts the response into a token issued at `now`.
    ///
    /// A lifetime that does not fit in a timestamp means no expiry.
    pub fn into_token(self, now: DateTime<Utc>) -> Token {
        let expiry = self
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        Token::new(self.access_token, self.token_type, expiry)
    }
}

/// Some servers send `expires_in` as a string.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) if s.is_empty() => None,
        Some(NumberOrString::String(s)) => {
            Some(s.parse().map_err(serde::de::Error::custom)?)
        }
        None => None,
    })
}
