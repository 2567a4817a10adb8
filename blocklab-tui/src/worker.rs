//! Background worker thread: gateway calls run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the persistence gateway; the main thread only ever sees outcomes.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use blocklab_core::gateway::{GatewayError, PersistenceGateway, SavedStrategy};
use blocklab_core::save_gate::SaveRequest;

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Save(SaveRequest),
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    SaveFinished {
        outcome: Result<SavedStrategy, GatewayError>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    gateway: Box<dyn PersistenceGateway>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("blocklab-worker".into())
        .spawn(move || worker_loop(rx, tx, gateway))
}

fn worker_loop(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    gateway: Box<dyn PersistenceGateway>,
) {
    debug!(gateway = gateway.name(), "worker started");
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Save(request)) => {
                let outcome = gateway.persist(&request.document);
                if tx.send(WorkerResponse::SaveFinished { outcome }).is_err() {
                    warn!("save finished after the editor went away");
                    break;
                }
            }
        }
    }
    debug!("worker stopped");
}
