// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// websession: core types and error definitions shared by the bridge crate.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::SessionConfig;
pub use error::{WebAuthError, WebAuthErrorCode, ERROR_DOMAIN};
pub use types::*;
pub use url::Url;
