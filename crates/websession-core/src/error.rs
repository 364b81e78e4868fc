// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error type for web authentication sessions.

use thiserror::Error;

/// Error domain reported alongside [`WebAuthErrorCode`].
pub const ERROR_DOMAIN: &str = "WebAuthenticationSession";

/// Numeric codes shared with the web-authentication-session error model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum WebAuthErrorCode {
    CanceledLogin = 1,
    PresentationContextNotProvided = 2,
    PresentationContextInvalid = 3,
}

/// Terminal failure of one authentication attempt.
#[derive(Debug, Error)]
pub enum WebAuthError {
    /// The user dismissed the browser tab without completing the login.
    #[error("the user canceled the login")]
    CanceledLogin,

    /// Part of the shared error model. The Android flow never raises it.
    #[error("no presentation context was provided")]
    PresentationContextNotProvided,

    /// There is no foreground activity to host the browser tab.
    #[error("no valid presentation context is available")]
    PresentationContextInvalid,

    /// Anything the browser-tab component reports that has no dedicated code.
    #[error("web authentication session failed: {0}")]
    Platform(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WebAuthError {
    /// The shared numeric code, if this error has one.
    pub fn code(&self) -> Option<WebAuthErrorCode> {
        match self {
            WebAuthError::CanceledLogin => Some(WebAuthErrorCode::CanceledLogin),
            WebAuthError::PresentationContextNotProvided => {
                Some(WebAuthErrorCode::PresentationContextNotProvided)
            }
            WebAuthError::PresentationContextInvalid => {
                Some(WebAuthErrorCode::PresentationContextInvalid)
            }
            WebAuthError::Platform(_) | WebAuthError::Serialization(_) => None,
        }
    }

    /// True when the user backed out of the login rather than something failing.
    pub fn is_user_cancellation(&self) -> bool {
        matches!(self, WebAuthError::CanceledLogin)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WebAuthError>;
