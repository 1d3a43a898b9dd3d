//! The sequencer worker: a single task that owns the job queue and runs
//! exactly one transfer strategy at a time.
//!
//! Failures advance the queue automatically; a cancellation parks the
//! sequencer in a suspended state until an explicit resume. No job-level
//! error ever escapes this task.

#![allow(clippy::redundant_pub_crate)]

use std::collections::VecDeque;

use mirra_config::MirrorConfig;
use mirra_core::MirrorJob;
use mirra_events::{Event, EventBus, JobOutcome, TransferPhase};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::command::EngineCommand;
use crate::strategy;

pub(crate) fn spawn(
    events: EventBus,
    mut commands: mpsc::Receiver<EngineCommand>,
    config: MirrorConfig,
) {
    tokio::spawn(async move {
        let mut worker = Worker::new(events, config);
        loop {
            let tick = if let Some(active) = worker.active.as_mut() {
                tokio::select! {
                    // Commands win ties: an accepted Enqueue must land in the
                    // queue before a finished job can declare the queue idle.
                    biased;
                    command = commands.recv() => Tick::Command(command),
                    outcome = &mut active.handle => Tick::Finished(outcome),
                }
            } else {
                Tick::Command(commands.recv().await)
            };

            match tick {
                Tick::Command(Some(command)) => worker.handle(command),
                Tick::Command(None) => break,
                Tick::Finished(outcome) => {
                    // Drain commands already accepted into the channel so the
                    // queue is complete before the idle decision.
                    while let Ok(command) = commands.try_recv() {
                        worker.handle(command);
                    }
                    worker.on_finished(outcome);
                }
            }
        }
        debug!("mirror sequencer worker stopped");
    });
}

enum Tick {
    Command(Option<EngineCommand>),
    Finished(Result<JobOutcome, tokio::task::JoinError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Queue empty, nothing running.
    Idle,
    /// One job's strategy is executing.
    Running,
    /// A cancellation finished; waiting for an explicit resume.
    Suspended,
}

struct ActiveJob {
    job_id: Uuid,
    label: String,
    handle: JoinHandle<JobOutcome>,
    cancel: watch::Sender<bool>,
}

struct Worker {
    events: EventBus,
    config: MirrorConfig,
    queue: VecDeque<MirrorJob>,
    state: State,
    active: Option<ActiveJob>,
}

impl Worker {
    fn new(events: EventBus, config: MirrorConfig) -> Self {
        Self {
            events,
            config,
            queue: VecDeque::new(),
            state: State::Idle,
            active: None,
        }
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Enqueue(job) => {
                info!(job = %job.label(), "queueing mirror job");
                self.events.publish(Event::JobQueued {
                    job_id: job.id,
                    label: job.label(),
                });
                self.queue.push_back(*job);
                if self.state == State::Idle {
                    self.start_next();
                }
            }
            EngineCommand::Cancel => {
                if let Some(active) = self.active.as_ref() {
                    info!(job = %active.label, "cancelling active mirror job");
                    let _ = active.cancel.send(true);
                } else {
                    debug!("cancel requested with no active job");
                }
            }
            EngineCommand::Resume => {
                if self.state == State::Suspended {
                    info!("resuming sequencer after cancellation");
                    self.start_next();
                } else {
                    debug!("resume requested while not suspended");
                }
            }
        }
    }

    fn on_finished(&mut self, outcome: Result<JobOutcome, tokio::task::JoinError>) {
        let Some(active) = self.active.take() else {
            return;
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(job = %active.label, error = %err, "strategy task aborted");
                self.events.publish(Event::Text {
                    job_id: active.job_id,
                    line: format!("{} aborted unexpectedly.", active.label),
                });
                JobOutcome::Failed {
                    phase: TransferPhase::Fetch,
                    exit_code: None,
                }
            }
        };

        match &outcome {
            JobOutcome::Success => info!(job = %active.label, "mirror job finished"),
            JobOutcome::Failed { phase, exit_code } => {
                warn!(job = %active.label, phase = phase.as_str(), ?exit_code, "mirror job failed");
            }
            JobOutcome::Cancelled => {
                self.events.publish(Event::Text {
                    job_id: active.job_id,
                    line: format!("{} cancelled.", active.label),
                });
                info!(job = %active.label, "mirror job cancelled");
            }
        }

        let cancelled = outcome == JobOutcome::Cancelled;
        self.events.publish(Event::JobFinished {
            job_id: active.job_id,
            outcome,
        });

        if cancelled {
            self.state = State::Suspended;
            self.events.publish(Event::Suspended {
                job_id: active.job_id,
            });
        } else {
            self.start_next();
        }
    }

    fn start_next(&mut self) {
        let Some(job) = self.queue.pop_front() else {
            self.state = State::Idle;
            self.events.publish(Event::QueueIdle);
            return;
        };

        let label = job.label();
        self.events.publish(Event::JobStarted {
            job_id: job.id,
            label: label.clone(),
        });

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(strategy::execute(
            job.clone(),
            self.config.clone(),
            self.events.clone(),
            cancel_rx,
        ));
        self.active = Some(ActiveJob {
            job_id: job.id,
            label,
            handle,
            cancel: cancel_tx,
        });
        self.state = State::Running;
    }
}
