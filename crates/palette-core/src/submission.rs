//! Form-submission alert: one text message per submission event.

use crate::notify::Notifier;
use crate::response::InvocationResponse;

/// Send `message` through `notifier`. The submission payload itself is not
/// inspected.
pub fn notify_submission(notifier: &dyn Notifier, message: &str) -> InvocationResponse {
    match notifier.notify(message) {
        Ok(receipt) => {
            tracing::info!(sid = %receipt.sid, "submission alert sent");
            InvocationResponse::success()
        }
        Err(e) => {
            tracing::error!(error = %e, "submission alert failed");
            InvocationResponse::failure(&e.to_string(), Some("notify"))
        }
    }
}
