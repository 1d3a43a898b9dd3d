//! Single-pass rsync strategy for AlmaLinux and Rocky Linux trees.
//!
//! Fetches straight into the final destination with append-verify and
//! partial-transfer retention; rsync's own partial files are the sole
//! resumability mechanism, so no staging area is involved. The fetch exit
//! status is not inspected: the job reports a completion line, 100%, and
//! success whatever rsync returned (cancellation excepted). The non-zero
//! code is still logged.

use mirra_config::MirrorConfig;
use mirra_core::{MirrorError, MirrorJob};
use mirra_events::{JobOutcome, TransferPhase};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::process::{self, ProcessEnd};
use crate::progress::scan_rsync_percent;
use crate::strategy::Reporter;

pub(crate) async fn run(
    job: &MirrorJob,
    config: &MirrorConfig,
    reporter: &Reporter<'_>,
    cancel: &mut watch::Receiver<bool>,
) -> JobOutcome {
    let fetch_failed = |exit_code| JobOutcome::Failed {
        phase: TransferPhase::Fetch,
        exit_code,
    };

    let dest = match job.destination_dir() {
        Ok(dest) => dest,
        Err(err) => {
            reporter.text(err.to_string());
            return fetch_failed(None);
        }
    };
    if let Err(source) = tokio::fs::create_dir_all(&dest).await {
        let err = MirrorError::DestinationUnwritable {
            path: dest,
            source,
        };
        reporter.text(err.to_string());
        return fetch_failed(None);
    }

    let source = format!(
        "rsync://{}@{}/{}/{}/",
        job.credential,
        config.remote.host,
        job.os_family.as_str(),
        job.distribution
    );
    info!(job = %job.label(), %source, "starting one-phase mirror fetch");

    let mut command = Command::new(&config.tools.rsync);
    command
        .args([
            "-rlt",
            "--partial",
            "--partial-dir=.rsync-partial",
            "--append-verify",
            "--no-inplace",
            "--progress",
        ])
        .arg(&source)
        .arg(&dest);

    let end = process::stream_lines(command, &config.tools.rsync, cancel, |line| {
        let percent = scan_rsync_percent(&line);
        reporter.text(line);
        if let Some(value) = percent {
            reporter.percent(value);
        }
    })
    .await;

    match end {
        Err(err) => {
            reporter.text(err.to_string());
            fetch_failed(None)
        }
        Ok(ProcessEnd::Cancelled) => JobOutcome::Cancelled,
        Ok(ProcessEnd::Exited { exit_code }) => {
            if exit_code != Some(0) {
                warn!(job = %job.label(), ?exit_code, "rsync exited non-zero; job still reported complete");
            }
            reporter.text(format!("{} complete.", job.label()));
            reporter.percent(100);
            JobOutcome::Success
        }
    }
}
