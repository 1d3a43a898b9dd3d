//! Job submission and event-loop driving.

use anyhow::{Context, Result};
use mirra_core::{MirrorEngine, MirrorJob};
use mirra_engine::MirrorSync;
use mirra_events::{Event, EventBus, JobOutcome};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::output;

/// Outcome of a whole CLI invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every job succeeded.
    Clean,
    /// At least one job failed; the rest still ran.
    HadFailures,
    /// A cancellation parked the queue and the run stopped there.
    Cancelled,
}

impl RunStatus {
    /// Process exit code for this status.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::HadFailures => 1,
            Self::Cancelled => 130,
        }
    }
}

/// Enqueue all jobs and render events until the queue drains, a
/// cancellation suspends it, or Ctrl-C is pressed (which cancels the active
/// transfer and waits for the suspension).
///
/// # Errors
///
/// Returns an error when configuration loading fails or the engine stops
/// accepting commands.
pub async fn run(cli: &Cli) -> Result<RunStatus> {
    let config = mirra_config::load(cli.config.as_deref()).context("configuration rejected")?;
    let jobs = cli.parse_jobs()?;

    let events = EventBus::new();
    let mut stream = events.subscribe(None);
    let engine = MirrorSync::new(events, config);

    let total = jobs.len();
    info!(jobs = total, "submitting mirror jobs");
    for job in jobs {
        enqueue(&engine, job).await?;
    }

    let mut failures = 0usize;
    loop {
        tokio::select! {
            envelope = stream.next() => {
                let Some(envelope) = envelope else {
                    warn!("event stream closed before the queue drained");
                    return Ok(RunStatus::HadFailures);
                };
                if let Some(line) = output::render(&envelope, cli.json)? {
                    println!("{line}");
                }
                match envelope.event {
                    Event::JobFinished { outcome, .. } => {
                        if !outcome.is_success() && outcome != JobOutcome::Cancelled {
                            failures += 1;
                        }
                    }
                    Event::QueueIdle => break,
                    Event::Suspended { .. } => return Ok(RunStatus::Cancelled),
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupt received, cancelling active transfer");
                engine.cancel().await?;
            }
        }
    }

    Ok(if failures == 0 {
        RunStatus::Clean
    } else {
        RunStatus::HadFailures
    })
}

async fn enqueue(engine: &MirrorSync, job: MirrorJob) -> Result<()> {
    let label = job.label();
    engine
        .enqueue(job)
        .await
        .with_context(|| format!("failed to enqueue {label}"))
}
