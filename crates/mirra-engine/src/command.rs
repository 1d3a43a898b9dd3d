//! Command definitions for the sequencer worker.

use mirra_core::MirrorJob;

/// Commands accepted by the sequencer worker task.
#[derive(Debug)]
pub(crate) enum EngineCommand {
    /// Append a job to the tail of the queue.
    Enqueue(Box<MirrorJob>),
    /// Forcefully terminate the active transfer.
    Cancel,
    /// Advance past a cancelled job and continue with the queue.
    Resume,
}
