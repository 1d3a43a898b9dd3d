//! Two-phase debmirror strategy for Debian and Proxmox repositories.
//!
//! Phase 1 fetches into a private staging area; a non-zero debmirror exit
//! fails the job before the destination is touched. Phase 2 commits the
//! staging tree into the final destination with mirror semantics (extraneous
//! destination files deleted). The staging area is released on every path
//! out of this module, including failures and cancellation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mirra_config::MirrorConfig;
use mirra_core::{MirrorError, MirrorJob};
use mirra_events::{JobOutcome, TransferPhase};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::process::{self, ProcessEnd};
use crate::progress::DebmirrorProgress;
use crate::staging::StagingArea;
use crate::strategy::Reporter;

/// Resolved inputs for one two-phase run.
struct FetchPlan {
    label: String,
    staging_key: String,
    dest: PathBuf,
    module_root: String,
    suite: String,
    sections: String,
    include_sources: bool,
}

pub(crate) async fn run_debian(
    job: &MirrorJob,
    config: &MirrorConfig,
    reporter: &Reporter<'_>,
    cancel: &mut watch::Receiver<bool>,
) -> JobOutcome {
    let Some((dest, staging_key)) = plan_paths(job, reporter) else {
        return JobOutcome::Failed {
            phase: TransferPhase::Fetch,
            exit_code: None,
        };
    };
    let plan = FetchPlan {
        label: job.label(),
        staging_key,
        dest,
        module_root: "debian".to_string(),
        suite: job.distribution.clone(),
        sections: config.debmirror.debian_sections.join(","),
        include_sources: true,
    };
    run(job, config, reporter, cancel, plan).await
}

pub(crate) async fn run_proxmox(
    job: &MirrorJob,
    config: &MirrorConfig,
    reporter: &Reporter<'_>,
    cancel: &mut watch::Receiver<bool>,
) -> JobOutcome {
    // Selector problems abort before any process spawn or staging mutation.
    let selector = match job.proxmox_selector() {
        Ok(selector) => selector,
        Err(err) => {
            reporter.text(err.to_string());
            return JobOutcome::Failed {
                phase: TransferPhase::Fetch,
                exit_code: None,
            };
        }
    };
    let Some(repo) = config.proxmox_repo(selector.category) else {
        reporter.text(format!(
            "no repository table entry for proxmox category '{}'",
            selector.category.as_str()
        ));
        return JobOutcome::Failed {
            phase: TransferPhase::Fetch,
            exit_code: None,
        };
    };

    let Some((dest, staging_key)) = plan_paths(job, reporter) else {
        return JobOutcome::Failed {
            phase: TransferPhase::Fetch,
            exit_code: None,
        };
    };
    let plan = FetchPlan {
        label: job.label(),
        staging_key,
        dest,
        module_root: repo.root,
        suite: selector.suite,
        sections: repo.section,
        include_sources: false,
    };
    run(job, config, reporter, cancel, plan).await
}

/// Destination directory and staging key for a two-phase job. Selector
/// problems are reported through the text sink and yield `None`.
fn plan_paths(job: &MirrorJob, reporter: &Reporter<'_>) -> Option<(PathBuf, String)> {
    debug_assert!(job.os_family.is_two_phase());
    let dest = match job.destination_dir() {
        Ok(dest) => dest,
        Err(err) => {
            reporter.text(err.to_string());
            return None;
        }
    };
    match job.staging_key() {
        Ok(Some(key)) => Some((dest, key)),
        // One-phase families never reach this strategy.
        Ok(None) => None,
        Err(err) => {
            reporter.text(err.to_string());
            None
        }
    }
}

async fn run(
    job: &MirrorJob,
    config: &MirrorConfig,
    reporter: &Reporter<'_>,
    cancel: &mut watch::Receiver<bool>,
    plan: FetchPlan,
) -> JobOutcome {
    let fetch_failed = |exit_code| JobOutcome::Failed {
        phase: TransferPhase::Fetch,
        exit_code,
    };

    reporter.text(format!("--- starting {} ---", plan.label));
    let staging = match StagingArea::acquire(&config.staging.resolved_root(), &plan.staging_key)
        .await
    {
        Ok(staging) => staging,
        Err(err) => {
            reporter.text(format!("{err:#}"));
            return fetch_failed(None);
        }
    };
    reporter.text(format!(
        "[step 1/2] fetching into {}",
        staging.path().display()
    ));
    reporter.percent(0);
    info!(job = %plan.label, staging = %staging.path().display(), "starting two-phase mirror fetch");

    let mut command = Command::new(&config.tools.debmirror);
    command
        .arg(staging.path())
        .arg(format!("--host={}@{}", job.credential, config.remote.host))
        .arg(format!("--root={}", plan.module_root))
        .arg("--method=rsync")
        .arg(format!("--dist={}", plan.suite))
        .arg(format!("--section={}", plan.sections))
        .arg(format!("--arch={}", config.debmirror.arch));
    if plan.include_sources {
        command.args(["--source", "--i18n"]);
    }
    command.args(["--ignore-release-gpg", "--progress"]);
    for pattern in &config.debmirror.excludes {
        command.arg(format!("--exclude={pattern}"));
    }

    let mut parser = DebmirrorProgress::new();
    let end = process::stream_lines(command, &config.tools.debmirror, cancel, |line| {
        let values = parser.observe(&line);
        reporter.text(line);
        for value in values {
            reporter.percent(value);
        }
    })
    .await;

    match end {
        Err(err) => {
            reporter.text(err.to_string());
            staging.release().await;
            return fetch_failed(None);
        }
        Ok(ProcessEnd::Cancelled) => {
            staging.release().await;
            return JobOutcome::Cancelled;
        }
        Ok(ProcessEnd::Exited { exit_code }) if exit_code != Some(0) => {
            reporter.text(format!(
                "debmirror failed for {} (code {}) - aborting.",
                plan.label,
                describe_exit(exit_code)
            ));
            staging.release().await;
            return fetch_failed(exit_code);
        }
        Ok(ProcessEnd::Exited { .. }) => {}
    }

    reporter.text(format!("[step 2/2] committing to {}", plan.dest.display()));
    if let Err(source) = tokio::fs::create_dir_all(&plan.dest).await {
        let err = MirrorError::DestinationUnwritable {
            path: plan.dest,
            source,
        };
        reporter.text(err.to_string());
        staging.release().await;
        return JobOutcome::Failed {
            phase: TransferPhase::Commit,
            exit_code: None,
        };
    }

    let mut command = Command::new(&config.tools.rsync);
    command
        .args([
            "-rlt",
            "--delete",
            "--no-inplace",
            "--partial",
            "--append-verify",
        ])
        .arg(trailing_slash(staging.path()))
        .arg(trailing_slash(&plan.dest));

    let end = process::stream_lines(command, &config.tools.rsync, cancel, |line| {
        // Commit progress is not surfaced as a percentage.
        reporter.text(line);
    })
    .await;

    match end {
        Err(err) => {
            reporter.text(err.to_string());
            staging.release().await;
            JobOutcome::Failed {
                phase: TransferPhase::Commit,
                exit_code: None,
            }
        }
        Ok(ProcessEnd::Cancelled) => {
            staging.release().await;
            JobOutcome::Cancelled
        }
        Ok(ProcessEnd::Exited { exit_code }) => {
            if exit_code != Some(0) {
                warn!(job = %plan.label, ?exit_code, "commit rsync exited non-zero");
            }
            staging.release().await;
            reporter.text(format!("mirror {} complete.", plan.label));
            reporter.percent(100);
            JobOutcome::Success
        }
    }
}

/// Trailing-slash form of a directory path: copy contents, not the
/// directory itself.
fn trailing_slash(path: &Path) -> OsString {
    let mut arg = path.as_os_str().to_os_string();
    arg.push("/");
    arg
}

fn describe_exit(exit_code: Option<i32>) -> String {
    exit_code.map_or_else(|| "signal".to_string(), |code| code.to_string())
}
