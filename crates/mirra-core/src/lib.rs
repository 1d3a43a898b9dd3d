//! Engine-agnostic mirror job model and interfaces.
//!
//! Layout: `model.rs` (job descriptors and selectors), `error.rs` (engine
//! error taxonomy), `service.rs` (the `MirrorEngine` trait consumed by
//! front-ends).

pub mod error;
pub mod model;
pub mod service;

pub use error::{MirrorError, MirrorResult};
pub use model::{MirrorJob, OsFamily, ProxmoxCategory, ProxmoxSelector};
pub use service::MirrorEngine;
