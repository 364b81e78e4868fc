// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot result broker.
//
// Turns the registry's callback into a single awaitable result and keeps the
// registration alive only as long as the waiting future.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, warn};
use websession_core::error::{Result, WebAuthError};
use websession_core::{describe_result_code, ActivityResult, RequestKey, Url, RESULT_CANCELED, RESULT_OK};

use crate::traits::{ResultHandler, ResultLauncher};

/// Translate a platform activity result into the caller's outcome.
pub fn map_activity_result(result: &ActivityResult) -> Result<Url> {
    match result.result_code {
        RESULT_OK => {
            let uri = result.data.as_ref().and_then(|data| data.data_uri.as_deref());
            match uri.and_then(|uri| Url::parse(uri).ok()) {
                Some(url) => Ok(url),
                None => Err(WebAuthError::Platform(format!(
                    "invalid activity result data, should be a valid URL string, got: {}",
                    result.describe_data()
                ))),
            }
        }
        RESULT_CANCELED => Err(WebAuthError::CanceledLogin),
        code => Err(WebAuthError::Platform(match describe_result_code(code) {
            Some(name) => format!("unknown result code: {code} ({name})"),
            None => format!("unknown result code: {code}"),
        })),
    }
}

/// Single-write slot the registry handler resolves into.
pub struct ResultSlot {
    key: RequestKey,
    sender: Mutex<Option<oneshot::Sender<Result<Url>>>>,
}

impl ResultSlot {
    /// Create a slot and the receiver that will observe its one value.
    pub fn new(key: RequestKey) -> (Arc<Self>, oneshot::Receiver<Result<Url>>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Self {
            key,
            sender: Mutex::new(Some(tx)),
        });
        (slot, rx)
    }

    /// Write `outcome` if nothing has been written yet.
    ///
    /// Returns `false` when the slot was already resolved.
    pub fn resolve(&self, outcome: Result<Url>) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(tx) => {
                // The receiver may already be gone if the caller gave up.
                if tx.send(outcome).is_err() {
                    debug!(key = %self.key, "result arrived after the caller stopped waiting");
                }
                true
            }
            None => {
                debug!(key = %self.key, "ignoring duplicate activity result");
                false
            }
        }
    }

    /// Handler to register with the activity-result registry.
    pub fn handler(self: &Arc<Self>) -> ResultHandler {
        let slot = Arc::clone(self);
        Arc::new(move |result: ActivityResult| {
            debug!(key = %slot.key, result_code = result.result_code, "activity result received");
            let outcome = map_activity_result(&result);
            if let Err(err) = &outcome {
                if !err.is_user_cancellation() {
                    warn!(key = %slot.key, error = %err, "browser tab reported a failure");
                }
            }
            slot.resolve(outcome);
        })
    }
}

/// Owns a registered launcher and unregisters it when dropped.
pub struct Registration {
    launcher: Box<dyn ResultLauncher>,
    released: bool,
}

impl Registration {
    pub fn new(launcher: Box<dyn ResultLauncher>) -> Self {
        Self {
            launcher,
            released: false,
        }
    }

    pub fn launcher(&self) -> &dyn ResultLauncher {
        self.launcher.as_ref()
    }

    /// Unregister now. Later calls, including the one in `Drop`, do nothing.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        debug!(key = %self.launcher.key(), "unregistering activity result handler");
        self.launcher.unregister();
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use websession_core::{ResultIntent, RESULT_VERIFICATION_FAILED};

    #[test]
    fn ok_with_url_resolves_to_url() {
        let url = map_activity_result(&ActivityResult::ok("myapp://callback?token=abc")).unwrap();
        assert_eq!(url.as_str(), "myapp://callback?token=abc");
    }

    #[test]
    fn ok_without_data_is_platform_failure() {
        let result = ActivityResult {
            result_code: RESULT_OK,
            data: None,
        };
        let err = map_activity_result(&result).unwrap_err();
        assert!(matches!(&err, WebAuthError::Platform(msg) if msg.contains("got: null")));
    }

    #[test]
    fn ok_with_unparseable_uri_quotes_payload() {
        let result = ActivityResult {
            result_code: RESULT_OK,
            data: Some(ResultIntent::with_uri("not a url")),
        };
        let err = map_activity_result(&result).unwrap_err();
        assert!(matches!(&err, WebAuthError::Platform(msg) if msg.contains("not a url")));
    }

    #[test]
    fn ok_with_intent_but_no_uri() {
        let result = ActivityResult {
            result_code: RESULT_OK,
            data: Some(ResultIntent {
                data_uri: None,
                description: "Intent { flg=0x1 }".into(),
            }),
        };
        let err = map_activity_result(&result).unwrap_err();
        assert!(matches!(&err, WebAuthError::Platform(msg) if msg.contains("flg=0x1")));
    }

    #[test]
    fn canceled_maps_to_canceled_login() {
        let err = map_activity_result(&ActivityResult::canceled()).unwrap_err();
        assert!(matches!(err, WebAuthError::CanceledLogin));
    }

    #[test]
    fn unknown_code_is_reported() {
        let result = ActivityResult {
            result_code: 42,
            data: None,
        };
        let err = map_activity_result(&result).unwrap_err();
        assert!(matches!(&err, WebAuthError::Platform(msg) if msg.contains("42")));
    }

    #[test]
    fn verification_failure_is_named() {
        let result = ActivityResult {
            result_code: RESULT_VERIFICATION_FAILED,
            data: None,
        };
        let err = map_activity_result(&result).unwrap_err();
        assert!(matches!(&err, WebAuthError::Platform(msg) if msg.contains("verification failed")));
    }

    #[test]
    fn slot_resolves_once() {
        let (slot, mut rx) = ResultSlot::new(RequestKey::new(""));
        let handler = slot.handler();
        handler(ActivityResult::ok("myapp://first"));
        handler(ActivityResult::canceled());
        assert!(!slot.resolve(Err(WebAuthError::CanceledLogin)));
        let url = rx.try_recv().unwrap().unwrap();
        assert_eq!(url.as_str(), "myapp://first");
    }

    #[test]
    fn registration_unregisters_once() {
        use crate::testing::FakeSurface;
        use crate::traits::PresentationSurface;

        let surface = FakeSurface::default();
        let key = RequestKey::new("");
        let (slot, _rx) = ResultSlot::new(key.clone());
        let mut registration = Registration::new(surface.register(&key, slot.handler()).unwrap());

        assert_eq!(registration.launcher().key(), &key);
        registration.release();
        registration.release();
        drop(registration);

        assert_eq!(surface.live_registrations(), 0);
        assert_eq!(surface.unregistrations(), 1);
    }

    #[test]
    fn resolve_after_receiver_dropped_is_harmless() {
        let (slot, rx) = ResultSlot::new(RequestKey::new(""));
        drop(rx);
        assert!(slot.resolve(Err(WebAuthError::CanceledLogin)));
    }
}
