//! Typed configuration models and defaults.
//!
//! # Design
//! - Pure data carriers used by the loader and the engine.
//! - Every section and field has a serde default so partial TOML files merge
//!   with the built-in behaviour.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use mirra_core::ProxmoxCategory;
use serde::{Deserialize, Serialize};

/// Directory name of the per-user staging cache root.
const STAGING_DIR_NAME: &str = "mirra-staging";

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Remote mirror endpoint.
    pub remote: RemoteConfig,
    /// External transfer tool binaries.
    pub tools: ToolsConfig,
    /// Staging cache location.
    pub staging: StagingConfig,
    /// debmirror invocation parameters shared by two-phase strategies.
    pub debmirror: DebmirrorConfig,
    /// Proxmox repository table: category name to rsync module root and
    /// mirroring section.
    pub proxmox: BTreeMap<String, ProxmoxRepo>,
}

impl MirrorConfig {
    /// Look up the proxmox repository entry for a category, falling back to
    /// the built-in table when the configuration file did not override it.
    #[must_use]
    pub fn proxmox_repo(&self, category: ProxmoxCategory) -> Option<ProxmoxRepo> {
        self.proxmox
            .get(category.as_str())
            .cloned()
            .or_else(|| builtin_proxmox_repo(category))
    }
}

/// Remote mirror endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Hostname of the rsync-accessible mirror.
    pub host: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "mirror.example.net".to_string(),
        }
    }
}

/// Binary names (or paths) of the external transfer tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// rsync binary used for one-phase fetches and commit syncs.
    pub rsync: String,
    /// debmirror binary used for two-phase fetches.
    pub debmirror: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rsync: "rsync".to_string(),
            debmirror: "debmirror".to_string(),
        }
    }
}

/// Staging cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StagingConfig {
    /// Override for the staging cache root. When unset, a per-user cache
    /// directory is used.
    pub root: Option<PathBuf>,
}

impl StagingConfig {
    /// Resolve the effective staging root.
    ///
    /// Defaults to `$XDG_CACHE_HOME/mirra-staging` (or `~/.cache/...`),
    /// falling back to the system temp directory when no home is available.
    #[must_use]
    pub fn resolved_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            env::var_os("XDG_CACHE_HOME")
                .map(PathBuf::from)
                .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
                .unwrap_or_else(env::temp_dir)
                .join(STAGING_DIR_NAME)
        })
    }
}

/// Parameters shared by every debmirror invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DebmirrorConfig {
    /// Package architecture to mirror.
    pub arch: String,
    /// Section list for plain Debian suites.
    pub debian_sections: Vec<String>,
    /// Package-name patterns excluded from every fetch. Known-problematic
    /// packages are denied by name substring.
    pub excludes: Vec<String>,
}

impl Default for DebmirrorConfig {
    fn default() -> Self {
        Self {
            arch: "amd64".to_string(),
            debian_sections: vec![
                "main".to_string(),
                "non-free".to_string(),
                "non-free-firmware".to_string(),
            ],
            excludes: vec!["aircrack".to_string(), "aircrack-ng".to_string()],
        }
    }
}

/// One proxmox repository table entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProxmoxRepo {
    /// rsync module root on the remote mirror.
    pub root: String,
    /// debmirror section name for this category.
    pub section: String,
}

fn builtin_proxmox_repo(category: ProxmoxCategory) -> Option<ProxmoxRepo> {
    let (root, section) = match category {
        ProxmoxCategory::Pve => ("proxmox-pve", "pve-no-subscription"),
        ProxmoxCategory::Pbs => ("proxmox-pbs", "pbs-no-subscription"),
        ProxmoxCategory::CephReef => ("proxmox-ceph-reef", "no-subscription"),
        ProxmoxCategory::CephSquid => ("proxmox-ceph-squid", "no-subscription"),
    };
    Some(ProxmoxRepo {
        root: root.to_string(),
        section: section.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_proxmox_table_covers_all_categories() {
        for category in [
            ProxmoxCategory::Pve,
            ProxmoxCategory::Pbs,
            ProxmoxCategory::CephReef,
            ProxmoxCategory::CephSquid,
        ] {
            let repo = MirrorConfig::default().proxmox_repo(category).unwrap();
            assert!(!repo.root.is_empty());
            assert!(!repo.section.is_empty());
        }
    }

    #[test]
    fn pve_resolves_to_no_subscription_section() {
        let repo = MirrorConfig::default()
            .proxmox_repo(ProxmoxCategory::Pve)
            .unwrap();
        assert_eq!(repo.root, "proxmox-pve");
        assert_eq!(repo.section, "pve-no-subscription");
    }

    #[test]
    fn config_overrides_shadow_builtin_table() {
        let mut config = MirrorConfig::default();
        config.proxmox.insert(
            "pve".to_string(),
            ProxmoxRepo {
                root: "custom-pve".to_string(),
                section: "enterprise".to_string(),
            },
        );
        let repo = config.proxmox_repo(ProxmoxCategory::Pve).unwrap();
        assert_eq!(repo.root, "custom-pve");
    }

    #[test]
    fn staging_root_honours_override() {
        let staging = StagingConfig {
            root: Some(PathBuf::from("/tmp/elsewhere")),
        };
        assert_eq!(staging.resolved_root(), PathBuf::from("/tmp/elsewhere"));
    }
}
