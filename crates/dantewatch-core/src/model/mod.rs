// ── Domain model types ──
//
// Normalized types produced from raw Director payloads. The catalog is
// the single source of truth for property names, groups, and transforms.

pub mod catalog;
pub mod device;
pub mod site;
pub mod stats;

pub use catalog::{ClockControl, PropertySpec, SiteStatus, Transform};
pub use device::{DeviceRecord, FleetDevice};
pub use site::{Domain, DomainStatus, SiteSelection};
pub use stats::{ControlDescriptor, ControlKind, Statistics};
