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

//! Mirror synchronization engine.
//!
//! Sequences heterogeneous download strategies per operating-system family,
//! supervises the external `rsync`/`debmirror` processes that do the actual
//! byte transfer, parses their unstructured output into normalized progress
//! events, and runs jobs strictly one at a time.
//!
//! Layout: `progress.rs` (output parsers), `staging.rs` (temporary staging
//! areas for two-phase jobs), `process.rs` (cancellable subprocess
//! supervision), `strategy/` (per-family transfer pipelines),
//! `worker.rs`/`command.rs`/`engine.rs` (the sequencer task and its clonable
//! [`MirrorSync`] handle).

mod command;
mod engine;
mod process;
pub mod progress;
pub mod staging;
mod strategy;
mod worker;

pub use engine::MirrorSync;
