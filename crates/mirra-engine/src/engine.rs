//! Clonable handle driving the sequencer worker.

use anyhow::Result;
use mirra_config::MirrorConfig;
use mirra_core::{MirrorEngine, MirrorError, MirrorJob};
use mirra_events::EventBus;
use tokio::sync::mpsc;

use crate::command::EngineCommand;
use crate::worker;

const COMMAND_BUFFER: usize = 128;

/// Mirror sequencer handle. Cheap to clone; all clones feed the same
/// single-job-at-a-time worker, which publishes its progress on the shared
/// event bus.
#[derive(Clone)]
pub struct MirrorSync {
    commands: mpsc::Sender<EngineCommand>,
}

impl MirrorSync {
    /// Start the sequencer worker and return a handle hooked up to the
    /// shared event bus.
    #[must_use]
    pub fn new(events: EventBus, config: MirrorConfig) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        worker::spawn(events, rx, config);
        Self { commands }
    }

    async fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| MirrorError::EngineClosed)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MirrorEngine for MirrorSync {
    async fn enqueue(&self, job: MirrorJob) -> Result<()> {
        self.send_command(EngineCommand::Enqueue(Box::new(job))).await
    }

    async fn cancel(&self) -> Result<()> {
        self.send_command(EngineCommand::Cancel).await
    }

    async fn resume(&self) -> Result<()> {
        self.send_command(EngineCommand::Resume).await
    }
}
