// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Run the search off the caller's thread and stream its progress back.
//!
//! Each `Optimize` request is answered by zero or more `Progress` messages
//! followed by exactly one `Done`. Abandoning a search means dropping the
//! receiver; the worker notices on its next send and stops once the current
//! request completes.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{OptimizerInput, OptimizerProgress, OptimizerResult};
use crate::optimizer::search::optimize_with_progress;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum WorkerRequest {
    Optimize(OptimizerInput),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum WorkerMessage {
    Progress(OptimizerProgress),
    Done(Vec<OptimizerResult>),
}

/// Serve requests until the request channel closes.
pub fn run_worker(rx: Receiver<WorkerRequest>, tx: Sender<WorkerMessage>) {
    while let Ok(request) = rx.recv() {
        match request {
            WorkerRequest::Optimize(input) => {
                debug!(cards = input.cards.len(), "Worker picked up optimize request");
                let results = optimize_with_progress(&input, |progress| {
                    let _ = tx.send(WorkerMessage::Progress(progress));
                });
                if tx.send(WorkerMessage::Done(results)).is_err() {
                    debug!("Result receiver dropped, worker exiting");
                    return;
                }
            }
        }
    }
}

pub struct OptimizeHandle {
    messages: Receiver<WorkerMessage>,
    thread: JoinHandle<()>,
}

/// Start one search on a dedicated thread.
pub fn spawn_optimize(input: OptimizerInput) -> OptimizeHandle {
    let (request_tx, request_rx) = mpsc::channel();
    let (message_tx, message_rx) = mpsc::channel();
    let thread = thread::spawn(move || run_worker(request_rx, message_tx));
    // The worker owns the receiving end, so this only fails if it already died,
    // which `wait` reports.
    let _ = request_tx.send(WorkerRequest::Optimize(input));
    OptimizeHandle {
        messages: message_rx,
        thread,
    }
}

impl OptimizeHandle {
    pub fn messages(&self) -> &Receiver<WorkerMessage> {
        &self.messages
    }

    /// Block until the search finishes, handing each progress update to
    /// `on_progress`.
    pub fn wait<F>(self, mut on_progress: F) -> Result<Vec<OptimizerResult>>
    where
        F: FnMut(&OptimizerProgress),
    {
        for message in self.messages.iter() {
            match message {
                WorkerMessage::Progress(progress) => on_progress(&progress),
                WorkerMessage::Done(results) => {
                    let _ = self.thread.join();
                    return Ok(results);
                }
            }
        }
        match self.thread.join() {
            Ok(()) => Err(anyhow!("Optimizer worker stopped without a result")),
            Err(_) => Err(anyhow!("Optimizer worker panicked")),
        }
    }
}
