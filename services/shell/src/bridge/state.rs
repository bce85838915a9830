//! services/shell/src/bridge/state.rs
//!
//! Defines the state shared by the bridge and its background tasks.

use crate::bridge::protocol::ShellEvent;
use growify_core::assessment::AssessmentAttempt;
use growify_core::payment::Checkout;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub type EventSender = mpsc::UnboundedSender<ShellEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ShellEvent>;

/// Queues an event for the view. A closed channel means the view is gone,
/// which is logged rather than treated as an error.
pub fn send_event(events: &EventSender, event: ShellEvent) {
    if events.send(event).is_err() {
        warn!("Event channel closed, dropping event.");
    }
}

//=========================================================================================
// ScreenLocal (Ephemeral State of the Mounted Screen)
//=========================================================================================

/// State that belongs to whichever screen is mounted and vanishes with it.
#[derive(Default)]
pub struct ScreenLocal {
    pub assessment: Option<AssessmentAttempt>,
    /// Stops the countdown of the current assessment only.
    pub assessment_token: Option<CancellationToken>,
    pub checkout: Option<Checkout>,
}

impl ScreenLocal {
    /// Ends the running assessment clock, if any.
    pub fn stop_countdown(&mut self) {
        if let Some(token) = self.assessment_token.take() {
            token.cancel();
        }
    }
}
