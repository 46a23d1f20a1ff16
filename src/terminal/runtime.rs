use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::debug;

use crate::app::{Command, Event};
use crate::gateway::ServerGateway;

/// Executes app commands off the UI thread. Each request gets its own
/// worker; completions come back through [`Runtime::poll`]. Nothing is
/// cancelled: a request always runs to its answer.
pub struct Runtime {
    gateway: Arc<dyn ServerGateway>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Runtime {
    pub fn new(gateway: Arc<dyn ServerGateway>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { gateway, tx, rx }
    }

    pub fn run(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Call(call) => {
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.tx.clone();
                    debug!("dispatching {call:?}");
                    thread::spawn(move || {
                        let outcome = call.perform(gateway.as_ref());
                        let _ = tx.send(Event::Completed(outcome));
                    });
                }
                Command::SettleUpload { generation, after } => {
                    let tx = self.tx.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = tx.send(Event::UploadSettled { generation });
                    });
                }
            }
        }
    }

    /// Next finished event, without blocking.
    pub fn poll(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}
