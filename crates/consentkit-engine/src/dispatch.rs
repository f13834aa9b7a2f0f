//! CallbackDispatcher: runs host callbacks in isolation.
//!
//! A failing callback (an `Err` return or a panic) is logged and reported
//! to the host's error hook, then swallowed so sibling callbacks and the
//! rest of the transition still run.

use crate::config::{Callback, ErrorHook};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Which callback failed, e.g. `analytics.onAccept` or `onAcceptAll`.
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No callback registered.
    Skipped,
    Completed,
    Failed,
}

#[derive(Clone, Default)]
pub struct CallbackDispatcher {
    on_error: Option<ErrorHook>,
}

impl CallbackDispatcher {
    pub fn new(on_error: Option<ErrorHook>) -> Self {
        Self { on_error }
    }

    pub fn dispatch(&self, source: &str, callback: Option<&Callback>) -> DispatchOutcome {
        let Some(cb) = callback else {
            return DispatchOutcome::Skipped;
        };
        debug!("dispatch {}", source);

        let message = match catch_unwind(AssertUnwindSafe(|| cb())) {
            Ok(Ok(())) => return DispatchOutcome::Completed,
            Ok(Err(e)) => format!("{:#}", e),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };

        warn!("Callback {} failed: {}", source, message);
        self.report(CallbackFailure {
            source: source.to_string(),
            message,
        });
        DispatchOutcome::Failed
    }

    fn report(&self, failure: CallbackFailure) {
        if let Some(hook) = &self.on_error {
            if catch_unwind(AssertUnwindSafe(|| hook(&failure))).is_err() {
                warn!("Error hook panicked while reporting {}", failure.source);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
