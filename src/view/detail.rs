use crate::domain::device::Device;
use crate::registry::{ApprovalResult, DeviceRegistry, TransportError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, PartialEq, Debug, Default)]
pub enum DetailState {
    /// No device opened yet.
    #[default]
    Closed,
    Loading {
        id: String,
    },
    /// The initial fetch failed; surfaced, never retried automatically.
    Failed {
        id: String,
        detail: String,
    },
    Ready {
        device: Device,
    },
    /// Approval request in flight; the trigger stays disabled until the
    /// re-fetch lands.
    Approving {
        device: Device,
    },
}

impl DetailState {
    /// The approval trigger is only ever offered for a held, unapproved record.
    pub fn can_approve(&self) -> bool {
        matches!(self, DetailState::Ready { device } if !device.approved)
    }
}

/// A fetch issued by the view. Its result may only be applied while the
/// generation it was issued under is still the current one.
#[derive(Clone, PartialEq, Debug)]
pub struct Fetch {
    pub id: String,
    generation: u64,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Approval {
    pub id: String,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct DeviceDetailView {
    state: DetailState,
    generation: u64,
}

impl DeviceDetailView {
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Navigates to a device and returns the single fetch to issue. Bumping
    /// the generation here is what invalidates any still-in-flight result
    /// for the previous navigation.
    pub fn open(&mut self, id: String) -> Fetch {
        self.generation += 1;
        self.state = DetailState::Loading { id: id.clone() };

        Fetch {
            id,
            generation: self.generation,
        }
    }

    pub fn fetch_completed(&mut self, fetch: Fetch, result: Result<Device, TransportError>) {
        if fetch.generation != self.generation {
            debug!("🗑️ Discarding stale fetch result for device '{}'", fetch.id);
            return;
        }

        match result {
            Ok(device) => {
                debug!(device_id = device.id, "🔍 Loaded device '{}', {} sensor(s)", device.id, device.sensors.len());
                self.state = DetailState::Ready { device };
            }
            Err(e) => {
                if e.is_not_found() {
                    warn!(device_id = fetch.id, "⚠️ Device '{}' is unknown to the registry", fetch.id);
                } else {
                    warn!(device_id = fetch.id, "⚠️ Could not load device '{}': {}", fetch.id, e);
                }
                self.state = DetailState::Failed {
                    id: fetch.id,
                    detail: e.to_string(),
                };
            }
        }
    }

    /// Returns the approval to issue, or None when the trigger is not
    /// offered (nothing held, still loading, already approved, or an
    /// approval is already in flight).
    pub fn request_approval(&mut self) -> Option<Approval> {
        match &self.state {
            DetailState::Ready { device } if !device.approved => {
                let device = device.clone();
                let approval = Approval {
                    id: device.id.clone(),
                    generation: self.generation,
                };
                self.state = DetailState::Approving { device };
                Some(approval)
            }
            _ => {
                debug!("🚫 Ignoring approval request in state {:?}", self.state);
                None
            }
        }
    }

    /// The write never touches local state, whether it succeeded or not;
    /// the returned re-fetch is the only source of the post-approval
    /// record. It carries the approval's generation, so a navigation that
    /// happened in the meantime discards it on arrival.
    pub fn approval_completed(&self, approval: Approval, result: Result<ApprovalResult, TransportError>) -> Fetch {
        match result {
            Ok(ApprovalResult { success: true }) => info!(device_id = approval.id, "✅ Approved device '{}'", approval.id),
            Ok(ApprovalResult { success: false }) => {
                warn!(device_id = approval.id, "⚠️ Registry rejected the approval of device '{}'", approval.id)
            }
            Err(e) => warn!(device_id = approval.id, "⚠️ Approval request for device '{}' failed: {}", approval.id, e),
        }

        // Re-fetch unconditionally to reconcile with the registry's record
        Fetch {
            id: approval.id,
            generation: approval.generation,
        }
    }
}

#[derive(Debug)]
pub enum DetailCommand {
    Open(String),
    Approve,
}

#[derive(Debug)]
enum DetailEvent {
    FetchCompleted {
        fetch: Fetch,
        result: Result<Device, TransportError>,
    },
    ApprovalCompleted {
        approval: Approval,
        result: Result<ApprovalResult, TransportError>,
    },
}

/// Drives the detail view: commands come from the dashboard, request
/// completions come back as events from spawned tasks, and every state
/// change is published wholesale over the watch channel.
#[instrument(skip_all)]
pub async fn run<R>(registry: Arc<R>, mut commands: mpsc::Receiver<DetailCommand>, tx: watch::Sender<DetailState>, buffer_size: usize)
where
    R: DeviceRegistry + 'static,
{
    let (events_tx, mut events) = mpsc::channel::<DetailEvent>(buffer_size);
    let mut view = DeviceDetailView::default();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                None => break,
                Some(DetailCommand::Open(id)) => {
                    let fetch = view.open(id);
                    spawn_fetch(registry.clone(), fetch, events_tx.clone());
                }
                Some(DetailCommand::Approve) => {
                    if let Some(approval) = view.request_approval() {
                        spawn_approval(registry.clone(), approval, events_tx.clone());
                    }
                }
            },
            Some(event) = events.recv() => match event {
                DetailEvent::FetchCompleted { fetch, result } => view.fetch_completed(fetch, result),
                DetailEvent::ApprovalCompleted { approval, result } => {
                    let fetch = view.approval_completed(approval, result);
                    spawn_fetch(registry.clone(), fetch, events_tx.clone());
                }
            },
        }

        // Publish real transitions only; a discarded stale result must not
        // wake subscribers with an identical snapshot.
        tx.send_if_modified(|state| {
            if state == view.state() {
                return false;
            }
            *state = view.state().clone();
            true
        });

        if tx.is_closed() {
            break;
        }
    }

    info!("🔍 Device detail view deactivated");
}

fn spawn_fetch<R: DeviceRegistry + 'static>(registry: Arc<R>, fetch: Fetch, events: mpsc::Sender<DetailEvent>) {
    task::spawn(async move {
        let result = registry.get_device(&fetch.id).await;
        events.send(DetailEvent::FetchCompleted { fetch, result }).await.unwrap_or_default();
    });
}

fn spawn_approval<R: DeviceRegistry + 'static>(registry: Arc<R>, approval: Approval, events: mpsc::Sender<DetailEvent>) {
    task::spawn(async move {
        let result = registry.approve_device(&approval.id).await;
        events.send(DetailEvent::ApprovalCompleted { approval, result }).await.unwrap_or_default();
    });
}
