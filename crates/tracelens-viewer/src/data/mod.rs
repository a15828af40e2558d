//! Loading of precomputed JSON off the UI thread.

pub mod loader;
pub mod protocol;

pub use loader::{spawn_loader, DataPaths};
pub use protocol::{Incoming, IncomingKind, Request};
