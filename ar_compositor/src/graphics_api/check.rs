/// Eager error checking after graphics API calls
///
/// The driver queues errors instead of returning them. Every call issued by
/// this crate is followed by `check` so the first failing call is reported
/// with its own name, never masked by a later one.

use crate::error::{Error, Result};
use crate::graphics_api::{ApiErrorCode, GraphicsApi};

/// Upper bound on codes drained at once (a broken driver could report forever)
const MAX_DRAINED_ERRORS: usize = 32;

fn drain_errors(api: &mut dyn GraphicsApi) -> Vec<ApiErrorCode> {
    let mut codes = Vec::new();
    while codes.len() < MAX_DRAINED_ERRORS {
        match api.get_error() {
            Some(code) => codes.push(code),
            None => break,
        }
    }
    codes
}

/// Drain the error queue, failing with every queued code if any
///
/// `reason` says what the caller was doing, `call` names the API call that
/// was just issued.
pub fn check(api: &mut dyn GraphicsApi, reason: &str, call: &'static str) -> Result<()> {
    let codes = drain_errors(api);
    if codes.is_empty() {
        Ok(())
    } else {
        Err(Error::GraphicsApiError {
            reason: reason.to_string(),
            call,
            codes,
        })
    }
}

/// Drain the error queue and log anything found at WARN level
///
/// Used on release paths, which must never fail.
pub fn log_errors(api: &mut dyn GraphicsApi, source: &str, reason: &str, call: &'static str) {
    if let Err(error) = check(api, reason, call) {
        crate::ar_warn!(source, "{}", error);
    }
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
