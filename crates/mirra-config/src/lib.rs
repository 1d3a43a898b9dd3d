#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration for the mirror engine.
//!
//! Layout: `model.rs` (typed config models and defaults), `loader.rs`
//! (TOML file loading), `validate.rs` (validation helpers).
//!
//! Every field carries a default mirroring the engine's built-in behaviour,
//! so an absent or partial configuration file is always usable. The proxmox
//! repository table and the package-exclusion denylist live here as data so
//! new categories and exclusions are additive.

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::load;
pub use model::{
    DebmirrorConfig, MirrorConfig, ProxmoxRepo, RemoteConfig, StagingConfig, ToolsConfig,
};
