//! Argument parsing.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mirra_core::{MirrorJob, OsFamily};

/// Mirror large public software repositories onto local storage.
#[derive(Debug, Parser)]
#[command(name = "mirra", version, about)]
pub struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(long, env = "MIRRA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the local mirror tree.
    #[arg(long)]
    pub dest: PathBuf,

    /// rsync credential threaded through every transfer.
    #[arg(long, env = "MIRRA_CREDENTIAL")]
    pub credential: String,

    /// Emit events as JSON lines instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Jobs to run, in order. `<family>:<dist>`, e.g. `almalinux:9.4`,
    /// `debian:bookworm`, or `proxmox:pve:bookworm`.
    #[arg(required = true, value_name = "JOB")]
    pub jobs: Vec<String>,
}

impl Cli {
    /// Turn the positional job specs into engine jobs, in order.
    ///
    /// # Errors
    ///
    /// Returns an error for specs without a family prefix, unknown families,
    /// or empty distribution selectors. Malformed proxmox composites are
    /// accepted here and surface as per-job failures, matching the engine's
    /// error taxonomy.
    pub fn parse_jobs(&self) -> Result<Vec<MirrorJob>> {
        self.jobs
            .iter()
            .map(|spec| self.parse_job(spec))
            .collect()
    }

    fn parse_job(&self, spec: &str) -> Result<MirrorJob> {
        let Some((family, selector)) = spec.split_once(':') else {
            bail!("job spec '{spec}' is missing a '<family>:' prefix");
        };
        let family: OsFamily = family
            .parse()
            .with_context(|| format!("in job spec '{spec}'"))?;
        MirrorJob::new(family, selector, &self.dest, &self.credential)
            .with_context(|| format!("in job spec '{spec}'"))
    }
}
