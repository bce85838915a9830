//! services/shell/src/bridge/payment_task.rs
//!
//! Simulated payment processing: wait, then succeed. Leaving the payment screen
//! before the delay is over abandons the payment, and a cancelled task never
//! touches whatever checkout the next screen opened.

use crate::bridge::protocol::ShellEvent;
use crate::bridge::state::{send_event, EventSender, ScreenLocal};
use growify_core::ports::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn payment_process(
    screen_local: Arc<Mutex<ScreenLocal>>,
    events: EventSender,
    clock: Arc<dyn Clock>,
    delay: Duration,
    cancellation_token: CancellationToken,
) {
    tokio::select! {
        _ = cancellation_token.cancelled() => {
            // The checkout went away with its screen; nothing is left to roll back.
            info!("Payment processing cancelled.");
        }
        _ = tokio::time::sleep(delay) => {
            let mut local = screen_local.lock().await;
            // The screen may have been torn down while this task waited for the lock.
            if cancellation_token.is_cancelled() {
                info!("Payment processing cancelled.");
                return;
            }
            let Some(checkout) = local.checkout.as_mut() else {
                warn!("Checkout disappeared while processing.");
                return;
            };
            match checkout.complete(Uuid::new_v4(), clock.now()) {
                Ok(receipt) => {
                    info!(
                        transaction_id = %receipt.transaction_id,
                        course_id = receipt.course_id,
                        "Payment succeeded."
                    );
                    let receipt = receipt.clone();
                    send_event(&events, ShellEvent::PaymentSucceeded { receipt });
                }
                Err(e) => {
                    warn!(error = %e, "Payment could not be completed.");
                    send_event(&events, ShellEvent::Alert { message: e.to_string() });
                }
            }
        }
    }
}
