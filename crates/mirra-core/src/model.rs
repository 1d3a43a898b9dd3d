//! Job descriptors and selector parsing.
//!
//! # Design
//! - Pure data carriers consumed by the sequencer and the transfer
//!   strategies; jobs are immutable once constructed.
//! - Proxmox composite selectors (`category:suite`) are parsed lazily so a
//!   malformed selector surfaces as a per-job error event rather than a
//!   submission failure.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MirrorError, MirrorResult};

/// Operating-system families the engine knows how to mirror.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// AlmaLinux trees, mirrored with a single resumable rsync pass.
    AlmaLinux,
    /// Debian suites, mirrored via debmirror into staging then committed.
    Debian,
    /// Proxmox repositories (pve/pbs/ceph), debmirror + commit.
    Proxmox,
    /// Rocky Linux trees, single resumable rsync pass.
    RockyLinux,
}

impl OsFamily {
    /// Render the family as its on-disk / rsync-module name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlmaLinux => "almalinux",
            Self::Debian => "debian",
            Self::Proxmox => "proxmox",
            Self::RockyLinux => "rockylinux",
        }
    }

    /// Whether this family fetches into a staging area before committing.
    #[must_use]
    pub const fn is_two_phase(self) -> bool {
        matches!(self, Self::Debian | Self::Proxmox)
    }
}

impl FromStr for OsFamily {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "almalinux" => Ok(Self::AlmaLinux),
            "debian" => Ok(Self::Debian),
            "proxmox" => Ok(Self::Proxmox),
            "rockylinux" => Ok(Self::RockyLinux),
            other => Err(MirrorError::UnknownOsFamily {
                value: other.to_string(),
            }),
        }
    }
}

/// Proxmox repository categories covered by the repository table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProxmoxCategory {
    /// Proxmox Virtual Environment.
    Pve,
    /// Proxmox Backup Server.
    Pbs,
    /// Ceph Reef packages.
    CephReef,
    /// Ceph Squid packages.
    CephSquid,
}

impl ProxmoxCategory {
    /// Render the category as its selector / path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pve => "pve",
            Self::Pbs => "pbs",
            Self::CephReef => "ceph-reef",
            Self::CephSquid => "ceph-squid",
        }
    }
}

impl FromStr for ProxmoxCategory {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pve" => Ok(Self::Pve),
            "pbs" => Ok(Self::Pbs),
            "ceph-reef" => Ok(Self::CephReef),
            "ceph-squid" => Ok(Self::CephSquid),
            other => Err(MirrorError::UnknownCategory {
                value: other.to_string(),
            }),
        }
    }
}

/// Resolved proxmox selector: repository category plus Debian-style suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxmoxSelector {
    /// Repository category.
    pub category: ProxmoxCategory,
    /// Underlying Debian suite name, e.g. `bookworm`.
    pub suite: String,
}

impl ProxmoxSelector {
    /// Parse a `category:suite` composite selector.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::MalformedSelector`] when the composite cannot
    /// be split, and [`MirrorError::UnknownCategory`] when the category is
    /// not covered by the repository table.
    pub fn parse(selector: &str) -> MirrorResult<Self> {
        let (category, suite) = selector
            .split_once(':')
            .ok_or_else(|| MirrorError::MalformedSelector {
                selector: selector.to_string(),
            })?;
        if category.is_empty() || suite.is_empty() || suite.contains(':') {
            return Err(MirrorError::MalformedSelector {
                selector: selector.to_string(),
            });
        }
        Ok(Self {
            category: category.parse()?,
            suite: suite.to_string(),
        })
    }
}

/// One mirror job, immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorJob {
    /// Unique job identifier.
    pub id: Uuid,
    /// Operating-system family selecting the transfer strategy.
    pub os_family: OsFamily,
    /// Distribution selector. For proxmox jobs without an explicit
    /// `proxmox_category` this is a `category:suite` composite.
    pub distribution: String,
    /// Explicit proxmox category, when the caller already split the selector.
    pub proxmox_category: Option<ProxmoxCategory>,
    /// Root of the local mirror tree.
    pub destination_root: PathBuf,
    /// Credential (rsync user) threaded through every transfer invocation.
    pub credential: String,
}

impl MirrorJob {
    /// Construct a job, validating that the distribution selector is
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::EmptyDistribution`] for an empty selector.
    pub fn new(
        os_family: OsFamily,
        distribution: impl Into<String>,
        destination_root: impl Into<PathBuf>,
        credential: impl Into<String>,
    ) -> MirrorResult<Self> {
        let distribution = distribution.into();
        if distribution.trim().is_empty() {
            return Err(MirrorError::EmptyDistribution);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            os_family,
            distribution,
            proxmox_category: None,
            destination_root: destination_root.into(),
            credential: credential.into(),
        })
    }

    /// Attach an explicit proxmox category, marking `distribution` as the
    /// bare suite name.
    #[must_use]
    pub fn with_category(mut self, category: ProxmoxCategory) -> Self {
        self.proxmox_category = Some(category);
        self
    }

    /// Resolve the proxmox selector for this job.
    ///
    /// # Errors
    ///
    /// Returns a selector error for malformed composites or unknown
    /// categories; callers report it through the text sink without spawning
    /// any process.
    pub fn proxmox_selector(&self) -> MirrorResult<ProxmoxSelector> {
        self.proxmox_category.map_or_else(
            || ProxmoxSelector::parse(&self.distribution),
            |category| {
                Ok(ProxmoxSelector {
                    category,
                    suite: self.distribution.clone(),
                })
            },
        )
    }

    /// Human-readable label used in logs and events.
    #[must_use]
    pub fn label(&self) -> String {
        match self.os_family {
            OsFamily::Proxmox => match self.proxmox_selector() {
                Ok(selector) => format!(
                    "proxmox/{}/{}",
                    selector.category.as_str(),
                    selector.suite
                ),
                Err(_) => format!("proxmox/{}", self.distribution),
            },
            family => format!("{}/{}", family.as_str(), self.distribution),
        }
    }

    /// Final destination directory for this job's mirror tree.
    ///
    /// `<root>/<family>/<dist>`, or `<root>/proxmox/<category>/<suite>` for
    /// proxmox jobs.
    ///
    /// # Errors
    ///
    /// Proxmox jobs propagate selector errors; other families never fail.
    pub fn destination_dir(&self) -> MirrorResult<PathBuf> {
        match self.os_family {
            OsFamily::Proxmox => {
                let selector = self.proxmox_selector()?;
                Ok(self
                    .destination_root
                    .join("proxmox")
                    .join(selector.category.as_str())
                    .join(&selector.suite))
            }
            family => Ok(self
                .destination_root
                .join(family.as_str())
                .join(&self.distribution)),
        }
    }

    /// Deterministic staging-directory key for two-phase jobs.
    ///
    /// # Errors
    ///
    /// Proxmox jobs propagate selector errors. One-phase families have no
    /// staging area and yield `None`.
    pub fn staging_key(&self) -> MirrorResult<Option<String>> {
        match self.os_family {
            OsFamily::Debian => Ok(Some(format!("debmirror-debian-{}", self.distribution))),
            OsFamily::Proxmox => {
                let selector = self.proxmox_selector()?;
                Ok(Some(format!(
                    "debmirror-proxmox-{}-{}",
                    selector.category.as_str(),
                    selector.suite
                )))
            }
            OsFamily::AlmaLinux | OsFamily::RockyLinux => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_distribution() {
        let result = MirrorJob::new(OsFamily::Debian, "  ", "/srv/mirror", "syncer");
        assert!(matches!(result, Err(MirrorError::EmptyDistribution)));
    }

    #[test]
    fn parses_composite_selector() {
        let selector = ProxmoxSelector::parse("pve:bookworm").unwrap();
        assert_eq!(selector.category, ProxmoxCategory::Pve);
        assert_eq!(selector.suite, "bookworm");
    }

    #[test]
    fn malformed_composites_are_distinct_errors() {
        assert!(matches!(
            ProxmoxSelector::parse("bookworm"),
            Err(MirrorError::MalformedSelector { .. })
        ));
        assert!(matches!(
            ProxmoxSelector::parse("pve:"),
            Err(MirrorError::MalformedSelector { .. })
        ));
        assert!(matches!(
            ProxmoxSelector::parse("unknown:bookworm"),
            Err(MirrorError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn destination_layout() {
        let job = MirrorJob::new(OsFamily::AlmaLinux, "9.4", "/srv/mirror", "syncer").unwrap();
        assert_eq!(
            job.destination_dir().unwrap(),
            PathBuf::from("/srv/mirror/almalinux/9.4")
        );

        let job = MirrorJob::new(OsFamily::Proxmox, "pbs:bookworm", "/srv/mirror", "syncer")
            .unwrap();
        assert_eq!(
            job.destination_dir().unwrap(),
            PathBuf::from("/srv/mirror/proxmox/pbs/bookworm")
        );
    }

    #[test]
    fn staging_keys_only_for_two_phase_families() {
        let alma = MirrorJob::new(OsFamily::AlmaLinux, "9.4", "/srv", "u").unwrap();
        assert_eq!(alma.staging_key().unwrap(), None);

        let debian = MirrorJob::new(OsFamily::Debian, "bookworm", "/srv", "u").unwrap();
        assert_eq!(
            debian.staging_key().unwrap().as_deref(),
            Some("debmirror-debian-bookworm")
        );

        let proxmox = MirrorJob::new(OsFamily::Proxmox, "ceph-reef:bookworm", "/srv", "u")
            .unwrap()
            .with_category(ProxmoxCategory::CephSquid);
        // Explicit category wins; distribution is then the bare suite.
        let proxmox = MirrorJob {
            distribution: "bookworm".into(),
            ..proxmox
        };
        assert_eq!(
            proxmox.staging_key().unwrap().as_deref(),
            Some("debmirror-proxmox-ceph-squid-bookworm")
        );
    }
}
