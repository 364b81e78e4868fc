// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for authentication failures.
//
// A cancelled login is the user's own choice, so it maps to `Silent` and the
// UI should not show an error dialog for it.

use crate::error::WebAuthError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user backed out. Show nothing.
    Silent,
    /// Something outside the app went wrong. Trying again may help.
    Transient,
    /// The app or device is misconfigured. Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives whether and how the UI reports it).
    pub severity: Severity,
}

/// Convert a `WebAuthError` into a `HumanError`.
pub fn humanize_error(err: &WebAuthError) -> HumanError {
    match err {
        WebAuthError::CanceledLogin => HumanError {
            message: "Sign-in was cancelled.".into(),
            suggestion: "Start the sign-in again whenever you're ready.".into(),
            severity: Severity::Silent,
        },

        WebAuthError::PresentationContextNotProvided
        | WebAuthError::PresentationContextInvalid => HumanError {
            message: "We couldn't open the sign-in page.".into(),
            suggestion: "Bring the app to the front, then try signing in again.".into(),
            severity: Severity::Transient,
        },

        WebAuthError::Platform(detail) => HumanError {
            message: "Something went wrong while signing in.".into(),
            suggestion: format!("Please try again. ({detail})"),
            severity: Severity::Transient,
        },

        WebAuthError::Serialization(detail) => HumanError {
            message: "The sign-in settings could not be read.".into(),
            suggestion: format!("Reinstalling the app may fix this. ({detail})"),
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_silent() {
        let human = humanize_error(&WebAuthError::CanceledLogin);
        assert_eq!(human.severity, Severity::Silent);
    }

    #[test]
    fn platform_detail_is_kept() {
        let human = humanize_error(&WebAuthError::Platform("unknown result code: 7".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.suggestion.contains("unknown result code: 7"));
    }

    #[test]
    fn missing_activity_suggests_foregrounding() {
        let human = humanize_error(&WebAuthError::PresentationContextInvalid);
        assert!(human.suggestion.contains("front"));
    }
}
