use crate::view::detail::{DetailCommand, DetailState};
use crate::view::list::ListState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument};

/// Line-oriented front end: renders list and detail snapshots as they
/// arrive and forwards the manual commands. Pure presentation; all state
/// lives in the views.
#[instrument(skip_all)]
pub async fn run(mut list_rx: watch::Receiver<ListState>, mut detail_rx: watch::Receiver<DetailState>, commands: mpsc::Sender<DetailCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Commands: ls | open <id> | approve | quit");
    loop {
        tokio::select! {
            changed = list_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render_list(&list_rx.borrow_and_update());
            }
            changed = detail_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render_detail(&detail_rx.borrow_and_update());
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    break;
                };

                match line.trim().split_once(' ').map_or((line.trim(), ""), |(command, rest)| (command, rest.trim())) {
                    ("ls", _) | ("", _) => render_list(&list_rx.borrow()),
                    ("open", id) if !id.is_empty() => {
                        if commands.send(DetailCommand::Open(id.to_string())).await.is_err() {
                            break;
                        }
                    }
                    ("approve", _) => {
                        if commands.send(DetailCommand::Approve).await.is_err() {
                            break;
                        }
                    }
                    ("quit", _) | ("q", _) => break,
                    _ => println!("Commands: ls | open <id> | approve | quit"),
                }
            }
        }
    }

    info!("🖥️ Dashboard closed");
}

fn render_list(state: &ListState) {
    match state {
        ListState::Idle => println!("(no snapshot from the registry yet)"),
        ListState::Synced(devices) => {
            println!("── devices ({}) ──", devices.len());
            for device in devices {
                let status = if device.approved { "approved" } else { "PENDING " };
                println!("{}  {}  {} sensor(s)", device.id, status, device.sensor_count);
            }
        }
    }
}

fn render_detail(state: &DetailState) {
    match state {
        DetailState::Closed => {}
        DetailState::Loading { id } => println!("Loading '{id}'..."),
        DetailState::Failed { id, detail } => println!("Unable to load '{id}': {detail}"),
        DetailState::Approving { device } => println!("Approving '{}'...", device.id),
        DetailState::Ready { device } => {
            let status = if device.approved { "approved" } else { "PENDING" };
            println!("── device {} ({status}) ──", device.id);
            for sensor in &device.sensors {
                println!("  #{}  {}  [{}]", sensor.id, sensor.name, sensor.r#type);
            }
            if state.can_approve() {
                println!("Type 'approve' to approve this device");
            }
        }
    }
}
