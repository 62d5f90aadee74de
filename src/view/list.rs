use crate::domain::device::DeviceSummary;
use crate::registry::{DeviceRegistry, TransportError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, PartialEq, Debug, Default)]
pub enum ListState {
    /// No snapshot received yet.
    #[default]
    Idle,
    /// The last snapshot the registry delivered, in registry order.
    Synced(Vec<DeviceSummary>),
}

#[derive(Debug, Default)]
pub struct DeviceListView {
    state: ListState,
}

impl DeviceListView {
    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// A successful response replaces the whole snapshot; a failure leaves
    /// the previous snapshot untouched. Stale-but-consistent beats torn.
    pub fn apply(&mut self, result: Result<Vec<DeviceSummary>, TransportError>) {
        match result {
            Ok(devices) => {
                debug!("🔄 Synced {} device(s)", devices.len());
                self.state = ListState::Synced(devices);
            }
            Err(e) => warn!("⚠️ Could not refresh the device list, keeping the last snapshot: {}", e),
        }
    }
}

/// Polls the registry on a fixed interval until deactivated, publishing
/// every snapshot wholesale over the watch channel. Ticks are serial: the
/// next one is only scheduled once the previous response was handled, and
/// a missed tick delays instead of bursting. Failed ticks never interrupt
/// the schedule.
#[instrument(skip_all)]
pub async fn sync_loop<R: DeviceRegistry>(registry: R, poll_interval: Duration, tx: watch::Sender<ListState>, mut shutdown: mpsc::Receiver<()>) {
    let mut view = DeviceListView::default();
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            // Deactivation drops the in-flight request future, so a late
            // response can never resurrect a stale view.
            _ = shutdown.recv() => break,
            result = registry.list_devices() => {
                view.apply(result);
                if tx.send(view.state().clone()).is_err() {
                    break;
                }
            }
        }
    }

    info!("🔄 Device list sync loop deactivated");
}
