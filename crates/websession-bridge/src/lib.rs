// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! websession: browser-tab web authentication sessions.
//!
//! [`WebAuthenticationSession`] opens the platform's trusted browser tab for
//! an OAuth/OpenID login and resolves with the redirect URL. The platform side
//! is reached through the traits in [`traits`], so the same flow runs against
//! Android (JNI), the desktop stub, or the in-memory test host.

pub mod broker;
pub mod session;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

pub use session::WebAuthenticationSession;
pub use websession_core::error::{Result, WebAuthError};
pub use websession_core::{BrowserSession, Callback, SessionConfig, Url};

/// Retrieves the host implementation for the target operating system.
pub fn platform_host() -> Arc<dyn traits::PresentationHost> {
    #[cfg(target_os = "android")]
    {
        // Android: the hosting Activity is reached through `jni` + `ndk-context`.
        Arc::new(android::AndroidHost::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no browser tab, every attempt reports no surface.
        Arc::new(stub::StubHost)
    }
}
