//! Polling, caching, and control layer between `dantewatch-api` and a host.
//!
//! - **[`Aggregator`]** -- Central facade. [`start()`](Aggregator::start)
//!   spawns the collection loop, [`get_snapshot()`](Aggregator::get_snapshot)
//!   returns site-level statistics, [`get_fleet()`](Aggregator::get_fleet)
//!   returns normalized per-device statistics, and
//!   [`apply_control()`](Aggregator::apply_control) toggles device clock
//!   preferences or switches the selected site.
//!
//! - **[`DeviceCache`]** -- Mutex-guarded per-device property maps, replaced
//!   domain by domain by the collection loop and patched in place by
//!   successful controls.
//!
//! - **[`ActivityGate`]** -- Pauses collection when nobody has asked for the
//!   fleet within the inactivity window.
//!
//! - **Property catalog** ([`model::catalog`]) -- Static table of every
//!   normalized property with its group prefix and display transform.

pub mod activity;
pub mod aggregator;
pub mod config;
pub mod control;
pub mod error;
pub mod extract;
pub mod model;
pub mod snapshot;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activity::ActivityGate;
pub use aggregator::Aggregator;
pub use config::{DirectorConfig, TlsVerification};
pub use control::{ControlOutcome, ControlRequest};
pub use error::CoreError;
pub use store::DeviceCache;

pub use model::{
    ClockControl, ControlDescriptor, ControlKind, DeviceRecord, Domain, DomainStatus, FleetDevice,
    SiteSelection, SiteStatus, Statistics,
};
