//! OS adapters for terractl: external command execution, process and
//! supervisor probing, filesystem capacity and backup archive listing.
//!
//! Every type here implements a port from `terractl_core::ports`.

#![deny(unsafe_code)]

mod archive;
mod disk;
mod probe;
mod runner;

pub use archive::TarArchiveLister;
pub use disk::StatvfsDiskProbe;
pub use probe::{SupervisorProbe, process_table_matches};
pub use runner::ScriptRunner;
