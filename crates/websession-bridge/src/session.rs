// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web authentication session backed by the platform's browser tab.
//
// One `authenticate` call is one launch-and-await cycle: register a one-shot
// handler, open the browser tab, suspend until the handler fires, then
// unregister. Calls share nothing but the injected host, so concurrent
// attempts run independently under distinct registry keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};
use websession_core::error::{Result, WebAuthError};
use websession_core::{AuthTabIntent, BrowserSession, Callback, RequestKey, SessionConfig, Url};

use crate::broker::{Registration, ResultSlot};
use crate::traits::PresentationHost;

/// Entry point for browser-tab logins.
#[derive(Clone)]
pub struct WebAuthenticationSession {
    host: Arc<dyn PresentationHost>,
    config: SessionConfig,
}

impl WebAuthenticationSession {
    pub fn new(host: Arc<dyn PresentationHost>) -> Self {
        Self::with_config(host, SessionConfig::default())
    }

    pub fn with_config(host: Arc<dyn PresentationHost>, config: SessionConfig) -> Self {
        Self { host, config }
    }

    /// Session bound to the bridge for the target operating system.
    pub fn platform_default() -> Self {
        Self::new(crate::platform_host())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Log in at `url`, expecting a redirect to `callback_url_scheme://`.
    pub async fn authenticate(
        &self,
        url: &Url,
        callback_url_scheme: &str,
        preferred_browser_session: Option<BrowserSession>,
    ) -> Result<Url> {
        self.authenticate_with_callback(
            url,
            Callback::CustomScheme(callback_url_scheme.to_string()),
            preferred_browser_session,
            &BTreeMap::new(),
        )
        .await
    }

    /// Log in at `url` and resolve with the redirect URL matching `callback`.
    ///
    /// # Panics
    ///
    /// Panics if `additional_header_fields` is not empty. The browser tab
    /// cannot send custom headers, so passing any is a programming error.
    /// The panic happens before a handler is registered or a tab is opened.
    pub async fn authenticate_with_callback(
        &self,
        url: &Url,
        callback: Callback,
        preferred_browser_session: Option<BrowserSession>,
        additional_header_fields: &BTreeMap<String, String>,
    ) -> Result<Url> {
        if !additional_header_fields.is_empty() {
            panic!(
                "additional header fields are not supported by the browser tab (got {} field(s))",
                additional_header_fields.len()
            );
        }

        let Some(surface) = self.host.foreground_surface() else {
            return Err(WebAuthError::PresentationContextInvalid);
        };

        let session = preferred_browser_session.unwrap_or(self.config.default_browser_session);
        let intent = AuthTabIntent::for_session(session);

        let key = RequestKey::new(&self.config.request_key_prefix);
        debug!(%key, platform = self.host.platform_name(), "registering activity result handler");

        let (slot, receiver) = ResultSlot::new(key.clone());
        let registration = Registration::new(surface.register(&key, slot.handler())?);
        {
            let launcher = registration.launcher();
            info!(
                %key,
                %callback,
                ephemeral = intent.ephemeral_browsing,
                "launching browser tab"
            );
            match &callback {
                Callback::CustomScheme(scheme) => launcher.launch_custom_scheme(&intent, url, scheme)?,
                Callback::Https { host, path } => launcher.launch_https(&intent, url, host, path)?,
            }
        }

        // `registration` lives until this function returns or the future is
        // dropped, so the handler is unregistered on every path.
        let outcome = receiver.await.unwrap_or_else(|_| {
            Err(WebAuthError::Platform(
                "result handler dropped before delivering a result".into(),
            ))
        });
        drop(registration);

        match &outcome {
            Ok(_) => info!(%key, "browser tab login completed"),
            Err(err) => info!(%key, error = %err, "browser tab login ended without a redirect"),
        }
        outcome
    }
}
