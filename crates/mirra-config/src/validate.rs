//! Validation helpers for loaded configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::model::MirrorConfig;

/// Validate a configuration before the engine consumes it.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming the first offending field.
pub fn validate(config: &MirrorConfig) -> ConfigResult<()> {
    ensure(!config.remote.host.trim().is_empty(), "remote", "host")?;
    ensure(!config.tools.rsync.trim().is_empty(), "tools", "rsync")?;
    ensure(
        !config.tools.debmirror.trim().is_empty(),
        "tools",
        "debmirror",
    )?;
    ensure(!config.debmirror.arch.trim().is_empty(), "debmirror", "arch")?;
    ensure(
        !config.debmirror.debian_sections.is_empty(),
        "debmirror",
        "debian_sections",
    )?;
    if config
        .debmirror
        .excludes
        .iter()
        .any(|pattern| pattern.trim().is_empty())
    {
        return Err(ConfigError::InvalidField {
            section: "debmirror",
            field: "excludes",
            reason: "exclusion patterns must not be empty",
        });
    }
    for (name, repo) in &config.proxmox {
        if repo.root.trim().is_empty() || repo.section.trim().is_empty() {
            tracing::warn!(category = %name, "rejecting proxmox repo entry with blank fields");
            return Err(ConfigError::InvalidField {
                section: "proxmox",
                field: "root",
                reason: "repository root and section must not be empty",
            });
        }
    }
    Ok(())
}

fn ensure(ok: bool, section: &'static str, field: &'static str) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section,
            field,
            reason: "value must not be empty",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProxmoxRepo;

    #[test]
    fn default_config_is_valid() {
        validate(&MirrorConfig::default()).unwrap();
    }

    #[test]
    fn blank_host_is_rejected() {
        let mut config = MirrorConfig::default();
        config.remote.host = "  ".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                section: "remote",
                field: "host",
                ..
            })
        ));
    }

    #[test]
    fn blank_proxmox_entry_is_rejected() {
        let mut config = MirrorConfig::default();
        config.proxmox.insert(
            "pve".to_string(),
            ProxmoxRepo {
                root: String::new(),
                section: "pve-no-subscription".to_string(),
            },
        );
        assert!(validate(&config).is_err());
    }
}
