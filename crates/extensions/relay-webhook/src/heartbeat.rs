//! Periodic liveness probe.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::WebhookClient;

/// Probe the endpoint every heartbeat interval until `cancel` fires.
///
/// The first probe runs immediately.
pub(crate) fn spawn(client: Arc<WebhookClient>, cancel: CancellationToken) -> JoinHandle<()> {
    let period = client.config().heartbeat_interval();
    let runtime = client.runtime().clone();

    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval_secs = period.as_secs(), "Heartbeat started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => break,
                        outcome = client.probe() => outcome,
                    };
                    debug!(?outcome, "Heartbeat probe");
                    client.record_probe(&outcome, &cancel);
                }
            }
        }

        debug!("Heartbeat stopped");
    })
}
