// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory host for tests.
//
// `FakeSurface` acts as its own activity-result registry: it records every
// registration, launch and unregistration, and can deliver scripted or
// manual results to live handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use websession_core::error::{Result, WebAuthError};
use websession_core::{ActivityResult, AuthTabIntent, Callback, RequestKey, Url};

use crate::traits::{PresentationHost, PresentationSurface, ResultHandler, ResultLauncher};

/// One browser-tab launch seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub key: RequestKey,
    pub url: Url,
    pub callback: Callback,
    pub ephemeral_browsing: bool,
}

/// What the fake browser tab does when launched.
#[derive(Debug, Clone, Default)]
pub enum Script {
    /// Deliver nothing; the test calls [`FakeSurface::deliver`] itself.
    #[default]
    Hold,
    /// Deliver each result, in order, as soon as the tab launches.
    Respond(Vec<ActivityResult>),
    /// Fail the launch call itself.
    FailLaunch(String),
    /// Fail the registration call.
    FailRegister(String),
}

#[derive(Default)]
struct State {
    live: HashMap<RequestKey, ResultHandler>,
    registrations: usize,
    unregistrations: usize,
    launches: Vec<LaunchRecord>,
    script: Script,
}

/// Foreground surface with an in-memory activity-result registry.
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Arc<Mutex<State>>,
}

impl FakeSurface {
    pub fn new(script: Script) -> Self {
        let surface = Self::default();
        surface.lock().script = script;
        surface
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Handlers still registered.
    pub fn live_registrations(&self) -> usize {
        self.lock().live.len()
    }

    pub fn registrations(&self) -> usize {
        self.lock().registrations
    }

    /// Unregistrations that actually removed a handler.
    pub fn unregistrations(&self) -> usize {
        self.lock().unregistrations
    }

    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.lock().launches.clone()
    }

    /// Keys of the handlers still registered.
    pub fn live_keys(&self) -> Vec<RequestKey> {
        self.lock().live.keys().cloned().collect()
    }

    /// Dispatch `result` to the handler under `key`.
    ///
    /// Returns `false` when no handler is registered under that key. The
    /// handler runs outside the registry lock, like a host dispatch loop.
    pub fn deliver(&self, key: &RequestKey, result: ActivityResult) -> bool {
        let handler = self.lock().live.get(key).cloned();
        match handler {
            Some(handler) => {
                handler(result);
                true
            }
            None => false,
        }
    }

    fn record_launch(&self, record: LaunchRecord) -> Result<()> {
        let key = record.key.clone();
        let script = {
            let mut state = self.lock();
            state.launches.push(record);
            state.script.clone()
        };
        match script {
            Script::Hold | Script::FailRegister(_) => Ok(()),
            Script::Respond(results) => {
                for result in results {
                    self.deliver(&key, result);
                }
                Ok(())
            }
            Script::FailLaunch(message) => Err(WebAuthError::Platform(message)),
        }
    }
}

impl PresentationSurface for FakeSurface {
    fn register(&self, key: &RequestKey, handler: ResultHandler) -> Result<Box<dyn ResultLauncher>> {
        let mut state = self.lock();
        if let Script::FailRegister(message) = &state.script {
            return Err(WebAuthError::Platform(message.clone()));
        }
        state.live.insert(key.clone(), handler);
        state.registrations += 1;
        drop(state);
        Ok(Box::new(FakeLauncher {
            key: key.clone(),
            surface: self.clone(),
        }))
    }
}

struct FakeLauncher {
    key: RequestKey,
    surface: FakeSurface,
}

impl ResultLauncher for FakeLauncher {
    fn key(&self) -> &RequestKey {
        &self.key
    }

    fn launch_custom_scheme(&self, intent: &AuthTabIntent, url: &Url, scheme: &str) -> Result<()> {
        self.surface.record_launch(LaunchRecord {
            key: self.key.clone(),
            url: url.clone(),
            callback: Callback::CustomScheme(scheme.to_string()),
            ephemeral_browsing: intent.ephemeral_browsing,
        })
    }

    fn launch_https(&self, intent: &AuthTabIntent, url: &Url, host: &str, path: &str) -> Result<()> {
        self.surface.record_launch(LaunchRecord {
            key: self.key.clone(),
            url: url.clone(),
            callback: Callback::Https {
                host: host.to_string(),
                path: path.to_string(),
            },
            ephemeral_browsing: intent.ephemeral_browsing,
        })
    }

    fn unregister(&mut self) {
        let mut state = self.surface.lock();
        if state.live.remove(&self.key).is_some() {
            state.unregistrations += 1;
        }
    }
}

/// Host whose foreground surface can be swapped out by the test.
#[derive(Clone, Default)]
pub struct FakeHost {
    surface: Arc<Mutex<Option<FakeSurface>>>,
}

impl FakeHost {
    /// Host with `surface` in the foreground.
    pub fn with_surface(surface: FakeSurface) -> Self {
        Self {
            surface: Arc::new(Mutex::new(Some(surface))),
        }
    }

    /// Host with nothing in the foreground.
    pub fn headless() -> Self {
        Self::default()
    }

    /// Replace the foreground surface; `None` leaves the app without one.
    /// Clones of this host see the change.
    pub fn set_surface(&self, surface: Option<FakeSurface>) {
        *self.surface.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = surface;
    }
}

impl PresentationHost for FakeHost {
    fn platform_name(&self) -> &str {
        "Test"
    }

    fn foreground_surface(&self) -> Option<Arc<dyn PresentationSurface>> {
        let guard = self.surface.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .clone()
            .map(|surface| Arc::new(surface) as Arc<dyn PresentationSurface>)
    }
}
