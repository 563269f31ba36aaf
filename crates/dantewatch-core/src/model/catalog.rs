// ── Property catalog ──
//
// Static table of every device property the snapshot builder emits.
// Each entry names the raw cache key, the group prefix it is published
// under, and the transform applied to the cached string.

use strum::{EnumIter, EnumString, IntoStaticStr};

use crate::model::site::DomainStatus;

/// Value used for any absent or empty property.
pub const NONE: &str = "None";

/// Separator between a group prefix and a property name.
pub const GROUP_DELIMITER: char = '#';

pub const STATUS_GROUP: &str = "Status#";
pub const CLOCK_GROUP: &str = "ClockSynchronisation#";
pub const RECEIVE_CHANNEL_GROUP: &str = "ReceiveChannels#";

pub const SITE_NAME: &str = "SiteName";
pub const NUMBER_OF_DEVICES: &str = "NumberOfDevices";

/// Raw keys feeding the derived `Unicast` statistic.
pub const UNICAST_LEADER: &str = "UnicastLeader";
pub const UNICAST_FOLLOWER: &str = "UnicastFollower";

pub const SWITCH_ON: &str = "On";
pub const SWITCH_OFF: &str = "Off";

// ── Transforms ───────────────────────────────────────────────────────

/// How a cached raw string becomes one or more published statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Copy the value, substituting `None` when absent.
    Plain,
    /// Reformat the ISO timestamp for display.
    ConnectedSince,
    /// `"true"` becomes `Grand Leader`.
    GrandLeader,
    /// `"true"` becomes `Leader`, anything else `Follower`.
    MulticastRole,
    /// Derived from `UnicastLeader` / `UnicastFollower`.
    Unicast,
    /// Boolean preference exposed as a switch control.
    Toggle(ClockControl),
    /// JSON channel list fanned out into one statistic per channel.
    ReceiveChannels,
}

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub group: &'static str,
    pub transform: Transform,
}

impl PropertySpec {
    const fn new(name: &'static str, group: &'static str, transform: Transform) -> Self {
        Self {
            name,
            group,
            transform,
        }
    }

    /// Published statistic key, `group` + `name`.
    pub fn key(&self) -> String {
        format!("{}{}", self.group, self.name)
    }
}

/// Every per-device property, in publication order.
pub static DEVICE_PROPERTIES: &[PropertySpec] = &[
    PropertySpec::new("Manufacturer", "", Transform::Plain),
    PropertySpec::new("ProductVersion", "", Transform::Plain),
    PropertySpec::new("ConnectedSince(GMT)", "", Transform::ConnectedSince),
    PropertySpec::new("EnrolmentState", "", Transform::Plain),
    PropertySpec::new("Clocking", STATUS_GROUP, Transform::Plain),
    PropertySpec::new("Connectivity", STATUS_GROUP, Transform::Plain),
    PropertySpec::new("Latency", STATUS_GROUP, Transform::Plain),
    PropertySpec::new("Subscriptions", STATUS_GROUP, Transform::Plain),
    PropertySpec::new("Location", "", Transform::Plain),
    PropertySpec::new("Description", "", Transform::Plain),
    PropertySpec::new("Comments", "", Transform::Plain),
    PropertySpec::new("DiscoveryType", "", Transform::Plain),
    PropertySpec::new("DiscoveryDomainName", "", Transform::Plain),
    PropertySpec::new("IPAddress", "", Transform::Plain),
    PropertySpec::new("MACAddress", "", Transform::Plain),
    PropertySpec::new("DanteSoftwareVersion", "", Transform::Plain),
    PropertySpec::new("DanteVersion", "", Transform::Plain),
    PropertySpec::new("SiteName", "", Transform::Plain),
    PropertySpec::new("MuteStatus", CLOCK_GROUP, Transform::Plain),
    PropertySpec::new("SyncStatus", CLOCK_GROUP, Transform::Plain),
    PropertySpec::new("DomainClocking", CLOCK_GROUP, Transform::GrandLeader),
    PropertySpec::new("PrimaryMulticast", CLOCK_GROUP, Transform::MulticastRole),
    PropertySpec::new("Unicast", CLOCK_GROUP, Transform::Unicast),
    PropertySpec::new(
        "SyncToExternalWordClock",
        CLOCK_GROUP,
        Transform::Toggle(ClockControl::ExternalWordClock),
    ),
    PropertySpec::new(
        "PreferredLeader",
        CLOCK_GROUP,
        Transform::Toggle(ClockControl::PreferredLeader),
    ),
    PropertySpec::new(
        "UnicastClocking",
        CLOCK_GROUP,
        Transform::Toggle(ClockControl::UnicastClocking),
    ),
    PropertySpec::new(
        "V1DelayRequests",
        CLOCK_GROUP,
        Transform::Toggle(ClockControl::DelayRequests),
    ),
    PropertySpec::new("FrequencyOffset(ppm)", CLOCK_GROUP, Transform::Plain),
    PropertySpec::new("ReceiveChannels", CLOCK_GROUP, Transform::ReceiveChannels),
];

/// Look up a catalog row by its raw name.
pub fn find(name: &str) -> Option<&'static PropertySpec> {
    DEVICE_PROPERTIES.iter().find(|spec| spec.name == name)
}

// ── Clock controls ───────────────────────────────────────────────────

/// A writable boolean clock preference.
///
/// Parsing is case-insensitive on the property name, so `preferredleader`
/// resolves to [`ClockControl::PreferredLeader`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr,
    serde::Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ClockControl {
    #[strum(serialize = "SyncToExternalWordClock")]
    ExternalWordClock,
    #[strum(serialize = "PreferredLeader")]
    PreferredLeader,
    #[strum(serialize = "UnicastClocking")]
    UnicastClocking,
    #[strum(serialize = "V1DelayRequests")]
    DelayRequests,
}

impl ClockControl {
    /// Property name as it appears in the cache and in statistics.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// GraphQL mutation field.
    pub fn mutation(self) -> &'static str {
        match self {
            Self::ExternalWordClock => "DeviceClockingSyncToExternalSet",
            Self::PreferredLeader => "DeviceClockingPreferredLeaderSet",
            Self::UnicastClocking => "DeviceClockingUnicastSet",
            Self::DelayRequests => "DeviceClockingPTPV1UnicastDelayRequestSet",
        }
    }

    /// GraphQL input type for [`mutation`](Self::mutation).
    pub fn input_type(self) -> &'static str {
        match self {
            Self::ExternalWordClock => "DeviceClockingSyncToExternalSetInput",
            Self::PreferredLeader => "DeviceClockingPreferredLeaderSetInput",
            Self::UnicastClocking => "DeviceClockingUnicastSetInput",
            Self::DelayRequests => "DeviceClockingPTPV1UnicastDelayRequestSetInput",
        }
    }

    /// Cache key of the capability flag that gates this control.
    pub fn capability_key(self) -> &'static str {
        match self {
            Self::ExternalWordClock => "ExtWordClockCapability",
            Self::PreferredLeader => "LeaderCapability",
            Self::UnicastClocking => "UnicastClockingCapability",
            Self::DelayRequests => "V1DelayRequestsCapability",
        }
    }
}

// ── Site-level statistics ────────────────────────────────────────────

/// Aggregate health indicators reported per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum SiteStatus {
    Clocking,
    Connectivity,
    Latency,
    Subscriptions,
}

impl SiteStatus {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Pick this indicator out of a domain's status block.
    pub fn pick(self, status: &DomainStatus) -> Option<&str> {
        match self {
            Self::Clocking => status.clocking.as_deref(),
            Self::Connectivity => status.connectivity.as_deref(),
            Self::Latency => status.latency.as_deref(),
            Self::Subscriptions => status.subscriptions.as_deref(),
        }
    }
}
