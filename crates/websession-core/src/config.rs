// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::BrowserSession;

/// Settings applied to every `authenticate` call of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Browsing state used when the caller passes no preference.
    pub default_browser_session: BrowserSession,
    /// Prepended to activity-result registry keys (empty = bare UUID).
    pub request_key_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_browser_session: BrowserSession::Shared,
            request_key_prefix: String::new(),
        }
    }
}

impl SessionConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WebAuthError;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_document() {
        let config = SessionConfig::from_json(r#"{"default_browser_session":"ephemeral"}"#).unwrap();
        assert_eq!(config.default_browser_session, BrowserSession::Ephemeral);
        assert!(config.request_key_prefix.is_empty());
    }

    #[test]
    fn malformed_document_is_serialization_error() {
        let err = SessionConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, WebAuthError::Serialization(_)));
    }
}
