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

//! Command-line front-end for the mirror synchronization engine.
//!
//! Job specs arrive as positional arguments instead of an interactive
//! selector, run strictly FIFO, and the engine's event stream is rendered to
//! the terminal (plain text or JSON lines).

pub mod cli;
pub mod output;
pub mod run;
