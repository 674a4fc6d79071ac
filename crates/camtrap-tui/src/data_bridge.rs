//! Enrichment bridge: forwards controller fetch outcomes to the action loop.
//!
//! The controller's fetch tasks never touch UI state. They report over an
//! unbounded channel; this task turns each report into an [`Action`] so it
//! is applied on the main loop, in order, by the single mutator.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use camtrap_core::EnrichmentOutcome;

use crate::action::Action;

pub async fn spawn_enrichment_bridge(
    mut outcome_rx: mpsc::UnboundedReceiver<EnrichmentOutcome>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            outcome = outcome_rx.recv() => {
                let Some(outcome) = outcome else { break };
                debug!(
                    site = %outcome.ticket.site_id,
                    generation = outcome.ticket.generation,
                    "forwarding weather outcome"
                );
                if action_tx.send(Action::EnrichmentArrived(outcome)).is_err() {
                    break;
                }
            }
        }
    }
    debug!("enrichment bridge shut down");
}
