//! Runs service calls off the UI thread.
//!
//! Every request is spawned on a small owned tokio runtime and its outcome,
//! stamped with the generation it was issued under, is posted back over a
//! channel. The UI applies outcomes between key events.

use std::future::Future;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use taskdeck_core::{Organization, Project, ProjectStatistics, Task, TaskComment};
use taskdeck_service::{DeckService, ServiceError};
use tokio::runtime::Runtime;

pub type Reply<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum Outcome {
    Organizations(u64, Reply<Vec<Organization>>),
    Projects(u64, Reply<Vec<Project>>),
    Statistics(u64, Reply<ProjectStatistics>),
    Tasks(u64, Reply<Vec<Task>>),
    BoardHeader(u64, Reply<Project>),
    TaskDetail(u64, Reply<Task>),
    ProjectSaved(u64, Reply<Project>),
    TaskSaved(u64, Reply<Task>),
    CommentAdded(u64, Reply<TaskComment>),
}

pub struct Dispatcher {
    runtime: Runtime,
    service: Arc<dyn DeckService>,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    in_flight: usize,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn DeckService>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("taskdeck-io")
            .enable_all()
            .build()
            .context("failed to start request runtime")?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            runtime,
            service,
            tx,
            rx,
            in_flight: 0,
        })
    }

    /// Spawn a request. `call` receives the shared service handle.
    pub fn spawn<F, Fut>(&mut self, call: F)
    where
        F: FnOnce(Arc<dyn DeckService>) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let fut = call(Arc::clone(&self.service));
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            // The receiver only goes away with the App itself.
            let _ = tx.send(fut.await);
        });
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn try_recv(&mut self) -> Option<Outcome> {
        let outcome = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }

    /// Waits up to `timeout` for the next outcome.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Outcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
