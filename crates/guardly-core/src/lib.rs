//! Reactive data layer between `guardly-api` and consumers (CLI, scripts).
//!
//! - [`Controller`]: lifecycle, commands, queries and diagnostics
//! - [`Snapshot`]: everything read in one poll cycle, published through a
//!   `watch` channel and consumed via [`SnapshotStream`]
//! - [`capability`]: the version → feature table
//! - [`model::merge`]: read-merge-write for whole-record updates

pub mod aggregate;
pub mod capability;
pub mod command;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod poller;
pub mod snapshot;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{TopEntry, top_n};
pub use capability::{Capability, CapabilitySet, RemoteVersion, capabilities_for};
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, Credentials, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use poller::{FailureLatch, PollState, ReadKey};
pub use snapshot::{CycleOutcome, Section, Snapshot};
pub use stream::{SnapshotStream, SnapshotWatchStream};
