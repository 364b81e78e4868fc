// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the collaborators the
// authentication session drives.
//
// The host supplies the foreground surface, the surface owns the
// activity-result registry, and each registration hands back a launcher
// that can start the browser tab and later be unregistered.

use std::sync::Arc;

use websession_core::error::Result;
use websession_core::{ActivityResult, AuthTabIntent, RequestKey, Url};

/// Callback invoked by the host when an activity result arrives.
///
/// Hosts promise a single delivery, but the handler tolerates repeats.
pub type ResultHandler = Arc<dyn Fn(ActivityResult) + Send + Sync>;

/// Source of the surface (activity/window) that hosts the browser tab.
pub trait PresentationHost: Send + Sync {
    /// Human-readable platform name (e.g. "Android", "Desktop (stub)").
    fn platform_name(&self) -> &str;

    /// The current foreground surface, or `None` when the app has none.
    fn foreground_surface(&self) -> Option<Arc<dyn PresentationSurface>>;
}

/// A foreground surface and its activity-result registry.
pub trait PresentationSurface: Send + Sync {
    /// Register `handler` under `key`.
    ///
    /// The returned launcher must be unregistered once the caller is done
    /// with it; dropping it without doing so leaks the registration.
    fn register(&self, key: &RequestKey, handler: ResultHandler) -> Result<Box<dyn ResultLauncher>>;
}

/// Launcher returned by [`PresentationSurface::register`].
pub trait ResultLauncher: Send {
    /// Key this launcher was registered under.
    fn key(&self) -> &RequestKey;

    /// Open the browser tab, expecting a redirect to `scheme://`.
    fn launch_custom_scheme(&self, intent: &AuthTabIntent, url: &Url, scheme: &str) -> Result<()>;

    /// Open the browser tab, expecting a redirect to `https://host/path`.
    fn launch_https(&self, intent: &AuthTabIntent, url: &Url, host: &str, path: &str) -> Result<()>;

    /// Remove the registration. Calling it again is a no-op.
    fn unregister(&mut self);
}
