//! services/shell/src/bridge/countdown.rs
//!
//! The clock behind quizzes and challenges. One task per running assessment,
//! cancelled when the assessment is submitted or its screen unmounts.

use crate::bridge::protocol::ShellEvent;
use crate::bridge::state::{send_event, EventSender, ScreenLocal};
use async_stream::stream;
use futures::{Stream, StreamExt};
use growify_core::assessment::AssessmentPhase;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Yields the seconds left after each `tick`, ending once it reaches zero.
pub fn countdown(total_secs: u64, tick: Duration) -> impl Stream<Item = u64> {
    stream! {
        let mut interval = tokio::time::interval(tick);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;
        let mut remaining = total_secs;
        while remaining > 0 {
            interval.tick().await;
            remaining -= 1;
            yield remaining;
        }
    }
}

/// Drives the assessment held in `screen_local` until it is submitted, runs
/// out of time, or `cancellation_token` fires.
pub async fn countdown_process(
    screen_local: Arc<Mutex<ScreenLocal>>,
    events: EventSender,
    tick: Duration,
    cancellation_token: CancellationToken,
) {
    let total_secs = {
        let local = screen_local.lock().await;
        match local.assessment.as_ref() {
            Some(attempt) => attempt.remaining_secs(),
            None => return,
        }
    };
    info!(total_secs, "Countdown started.");

    let ticks = countdown(total_secs, tick);
    tokio::pin!(ticks);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Countdown cancelled.");
                return;
            }
            next = ticks.next() => {
                if next.is_none() {
                    return;
                }
                let mut local = screen_local.lock().await;
                // A tick that raced the unmount must not reach the next screen's attempt.
                if cancellation_token.is_cancelled() {
                    info!("Countdown cancelled.");
                    return;
                }
                let Some(attempt) = local.assessment.as_mut() else {
                    return;
                };
                if attempt.phase() != AssessmentPhase::InProgress {
                    return;
                }
                match attempt.tick().cloned() {
                    Some(result) => {
                        info!(score = result.score, "Time is up, assessment submitted.");
                        local.assessment_token = None;
                        send_event(&events, ShellEvent::AssessmentSubmitted { result });
                        return;
                    }
                    None => {
                        let remaining_secs = attempt.remaining_secs();
                        debug!(remaining_secs, "Countdown tick.");
                        send_event(&events, ShellEvent::CountdownTick { remaining_secs });
                    }
                }
            }
        }
    }
}
