// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for browser-tab authentication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the identity provider redirects back into the app once login finishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Callback {
    /// Redirect to a custom URL scheme, e.g. `myapp://`.
    CustomScheme(String),
    /// Redirect to an HTTPS URL on a verified host.
    Https { host: String, path: String },
}

impl std::fmt::Display for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::CustomScheme(scheme) => write!(f, "{scheme}://"),
            Callback::Https { host, path } => write!(f, "https://{host}{path}"),
        }
    }
}

/// Which browsing state the browser tab may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserSession {
    /// No cookies or storage survive the attempt.
    Ephemeral,
    /// Use the browser's ambient cookie store.
    #[default]
    Shared,
}

/// A browser-tab request, built before the tab is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthTabIntent {
    pub ephemeral_browsing: bool,
}

impl AuthTabIntent {
    pub fn builder() -> AuthTabIntentBuilder {
        AuthTabIntentBuilder::default()
    }

    /// Build the request matching a browser session preference.
    pub fn for_session(session: BrowserSession) -> Self {
        Self::builder()
            .ephemeral_browsing_enabled(session == BrowserSession::Ephemeral)
            .build()
    }
}

#[derive(Debug, Default)]
pub struct AuthTabIntentBuilder {
    ephemeral_browsing: bool,
}

impl AuthTabIntentBuilder {
    pub fn ephemeral_browsing_enabled(mut self, enabled: bool) -> Self {
        self.ephemeral_browsing = enabled;
        self
    }

    pub fn build(self) -> AuthTabIntent {
        AuthTabIntent {
            ephemeral_browsing: self.ephemeral_browsing,
        }
    }
}

/// Unique key for one activity-result registration.
///
/// Carries no meaning beyond keeping concurrent registrations apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    /// Fresh random key, with `prefix` prepended when it is not empty.
    pub fn new(prefix: &str) -> Self {
        let id = Uuid::new_v4();
        if prefix.is_empty() {
            Self(id.to_string())
        } else {
            Self(format!("{prefix}{id}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// -- Activity result codes ---------------------------------------------------

/// The browser tab returned a redirect.
pub const RESULT_OK: i32 = -1;
/// The user closed the browser tab.
pub const RESULT_CANCELED: i32 = 0;
/// The browser reported a result it could not classify.
pub const RESULT_UNKNOWN_CODE: i32 = -2;
/// HTTPS redirect verification failed.
pub const RESULT_VERIFICATION_FAILED: i32 = 2;
/// HTTPS redirect verification did not finish in time.
pub const RESULT_VERIFICATION_TIMED_OUT: i32 = 3;

/// Name of a known result code, for diagnostics.
pub fn describe_result_code(code: i32) -> Option<&'static str> {
    match code {
        RESULT_OK => Some("ok"),
        RESULT_CANCELED => Some("canceled"),
        RESULT_UNKNOWN_CODE => Some("unknown code"),
        RESULT_VERIFICATION_FAILED => Some("verification failed"),
        RESULT_VERIFICATION_TIMED_OUT => Some("verification timed out"),
        _ => None,
    }
}

/// Intent payload attached to an activity result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultIntent {
    /// `Intent.getData()` rendered as a string, if present.
    pub data_uri: Option<String>,
    /// Platform description of the whole intent.
    pub description: String,
}

impl ResultIntent {
    pub fn with_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self {
            description: format!("Intent {{ dat={uri} }}"),
            data_uri: Some(uri),
        }
    }
}

/// One event delivered by the host's activity-result dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    pub result_code: i32,
    pub data: Option<ResultIntent>,
}

impl ActivityResult {
    pub fn ok(uri: impl Into<String>) -> Self {
        Self {
            result_code: RESULT_OK,
            data: Some(ResultIntent::with_uri(uri)),
        }
    }

    pub fn canceled() -> Self {
        Self {
            result_code: RESULT_CANCELED,
            data: None,
        }
    }

    /// How the payload is quoted in diagnostics.
    pub fn describe_data(&self) -> String {
        match &self.data {
            Some(intent) => intent.description.clone(),
            None => "null".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_shared() {
        assert_eq!(BrowserSession::default(), BrowserSession::Shared);
    }

    #[test]
    fn intent_follows_session() {
        assert!(AuthTabIntent::for_session(BrowserSession::Ephemeral).ephemeral_browsing);
        assert!(!AuthTabIntent::for_session(BrowserSession::Shared).ephemeral_browsing);
    }

    #[test]
    fn request_keys_are_unique_and_prefixed() {
        let a = RequestKey::new("websession-");
        let b = RequestKey::new("websession-");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("websession-"));
        assert_eq!(RequestKey::new("").as_str().len(), 36);
    }

    #[test]
    fn callback_display() {
        assert_eq!(Callback::CustomScheme("myapp".into()).to_string(), "myapp://");
        let https = Callback::Https {
            host: "example.com".into(),
            path: "/auth/done".into(),
        };
        assert_eq!(https.to_string(), "https://example.com/auth/done");
    }

    #[test]
    fn missing_payload_described_as_null() {
        assert_eq!(ActivityResult::canceled().describe_data(), "null");
    }

    #[test]
    fn verification_codes_have_names() {
        assert_eq!(describe_result_code(2), Some("verification failed"));
        assert_eq!(describe_result_code(42), None);
    }
}
