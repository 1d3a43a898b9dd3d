//! Per-family transfer strategies.
//!
//! Every failure inside a strategy is converted into text events and a
//! terminal [`JobOutcome`] here; nothing propagates upward to the sequencer
//! as an error.

mod one_phase;
mod two_phase;

use mirra_config::MirrorConfig;
use mirra_core::{MirrorJob, OsFamily};
use mirra_events::{Event, EventBus, JobOutcome};
use tokio::sync::watch;
use uuid::Uuid;

/// Execute the strategy matching the job's OS family to completion.
pub(crate) async fn execute(
    job: MirrorJob,
    config: MirrorConfig,
    events: EventBus,
    mut cancel: watch::Receiver<bool>,
) -> JobOutcome {
    let reporter = Reporter {
        events: &events,
        job_id: job.id,
    };
    match job.os_family {
        OsFamily::AlmaLinux | OsFamily::RockyLinux => {
            one_phase::run(&job, &config, &reporter, &mut cancel).await
        }
        OsFamily::Debian => two_phase::run_debian(&job, &config, &reporter, &mut cancel).await,
        OsFamily::Proxmox => two_phase::run_proxmox(&job, &config, &reporter, &mut cancel).await,
    }
}

/// Per-job publisher for text and percent events.
pub(crate) struct Reporter<'a> {
    events: &'a EventBus,
    job_id: Uuid,
}

impl Reporter<'_> {
    pub(crate) fn text(&self, line: impl Into<String>) {
        self.events.publish(Event::Text {
            job_id: self.job_id,
            line: line.into(),
        });
    }

    /// Publish a percentage, clamping out-of-range parser output to 0..=100.
    pub(crate) fn percent(&self, value: i64) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value.clamp(0, 100) as u8;
        self.events.publish(Event::Percent {
            job_id: self.job_id,
            value,
        });
    }
}
