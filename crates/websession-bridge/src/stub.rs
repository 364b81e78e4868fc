// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where no browser tab is available.
//
// There is never a foreground surface, so every authentication attempt fails
// with `PresentationContextInvalid` before anything is registered.

use std::sync::Arc;

use crate::traits::{PresentationHost, PresentationSurface};

/// Host returned on platforms without a browser-tab bridge.
pub struct StubHost;

impl PresentationHost for StubHost {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn foreground_surface(&self) -> Option<Arc<dyn PresentationSurface>> {
        tracing::warn!("PresentationHost::foreground_surface called on stub host");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebAuthenticationSession;
    use websession_core::error::WebAuthError;
    use websession_core::Url;

    #[tokio::test]
    async fn stub_rejects_every_attempt() {
        let session = WebAuthenticationSession::new(Arc::new(StubHost));
        let url = Url::parse("https://example.com/login").unwrap();

        let err = session.authenticate(&url, "myapp", None).await.unwrap_err();

        assert!(matches!(err, WebAuthError::PresentationContextInvalid));
    }
}
