use tracing::warn;

use crate::domain::{Error, Warning, WarningSink};

/// Reports through the tracing subscriber, which writes to stderr.
#[derive(Default, Debug)]
pub struct StdErrSink {}

impl WarningSink for StdErrSink {
    fn reject(&self, error: &Error) {
        warn!(%error, "event rejected");
    }

    fn warn(&self, warning: &Warning) {
        warn!(%warning, "ledger warning");
    }
}
