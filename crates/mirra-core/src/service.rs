//! Interfaces exposed to front-ends.

use async_trait::async_trait;

use crate::model::MirrorJob;

/// Handle through which callers drive the mirror sequencer.
///
/// Implementations run exactly one job at a time; `enqueue` appends to the
/// FIFO queue and starts the head job when the sequencer is idle. After a
/// cancellation the sequencer parks itself and only `resume` advances it.
#[async_trait]
pub trait MirrorEngine: Send + Sync {
    /// Append a job to the queue.
    async fn enqueue(&self, job: MirrorJob) -> anyhow::Result<()>;

    /// Forcefully terminate the active transfer, if any.
    async fn cancel(&self) -> anyhow::Result<()>;

    /// Advance past a cancelled job and continue with the queue.
    async fn resume(&self) -> anyhow::Result<()>;
}
