// ── Control dispatch ──
//
// Applies one host-issued control: either a site switch (selects a
// domain by name) or a boolean clock preference on one device.
// Successful device controls are written straight back into the cache.

use dantewatch_api::DirectorClient;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::SiteSelection;
use crate::model::catalog::{ClockControl, GROUP_DELIMITER, SITE_NAME, SWITCH_OFF, SWITCH_ON};
use crate::store::DeviceCache;

/// A property change requested by the host.
///
/// `device_id` is `None` for site-level controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub device_id: Option<String>,
    pub property: String,
    pub value: String,
}

impl ControlRequest {
    /// Switch the selected site to the domain named `name`.
    pub fn site(name: impl Into<String>) -> Self {
        Self {
            device_id: None,
            property: SITE_NAME.to_owned(),
            value: name.into(),
        }
    }

    pub fn device(
        device_id: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            device_id: Some(device_id.into()),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Property name with any `Group#` prefix stripped.
    pub fn property_name(&self) -> &str {
        self.property
            .split_once(GROUP_DELIMITER)
            .map_or(self.property.as_str(), |(_, name)| name)
    }

    /// `"1"` enables; any other value disables.
    pub fn enabled(&self) -> bool {
        self.value == "1"
    }
}

/// Result of a control that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ControlOutcome {
    SiteSelected {
        domain_id: String,
        name: String,
    },
    Applied {
        device_id: String,
        control: ClockControl,
        enabled: bool,
    },
    /// Unsupported or not permitted on this device; nothing was sent.
    Ignored { reason: String },
}

pub fn switch_label(enabled: bool) -> &'static str {
    if enabled { SWITCH_ON } else { SWITCH_OFF }
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Apply one control. The caller holds the snapshot/control lock.
pub(crate) async fn dispatch(
    client: &DirectorClient,
    cache: &DeviceCache,
    sites: &mut SiteSelection,
    request: &ControlRequest,
) -> Result<ControlOutcome, CoreError> {
    let property = request.property_name();

    if property == SITE_NAME {
        return select_site(sites, &request.value);
    }

    let Some(device_id) = request.device_id.as_deref() else {
        return Err(CoreError::invalid(format!(
            "Unable to control property: {property} without a device id."
        )));
    };

    apply_clock_control(client, cache, device_id, property, request.enabled()).await
}

fn select_site(sites: &mut SiteSelection, name: &str) -> Result<ControlOutcome, CoreError> {
    let domain = sites.select_by_name(name).ok_or_else(|| {
        CoreError::invalid(format!("Unable to control SiteName: site {name} does not exist."))
    })?;

    info!(domain_id = %domain.id, site = %domain.name, "site selected");
    Ok(ControlOutcome::SiteSelected {
        domain_id: domain.id.clone(),
        name: domain.name.clone(),
    })
}

async fn apply_clock_control(
    client: &DirectorClient,
    cache: &DeviceCache,
    device_id: &str,
    property: &str,
    enabled: bool,
) -> Result<ControlOutcome, CoreError> {
    let Some(record) = cache.get(device_id) else {
        return Err(CoreError::invalid(format!(
            "Unable to control property: {property} as the device does not exist."
        )));
    };

    let Ok(control) = property.parse::<ClockControl>() else {
        warn!(device_id, property, "unsupported control property, ignoring");
        return Ok(ControlOutcome::Ignored {
            reason: format!("{property} is not controllable"),
        });
    };

    if record.property(control.capability_key()) != Some("true") {
        warn!(
            device_id,
            property = control.name(),
            "device lacks capability, ignoring control"
        );
        return Ok(ControlOutcome::Ignored {
            reason: format!("{} is not supported by this device", control.name()),
        });
    }

    client
        .set_clock_preference(control.mutation(), control.input_type(), device_id, enabled)
        .await
        .map_err(|e| CoreError::ControlFailed {
            property: control.name().to_owned(),
            label: switch_label(enabled).to_owned(),
            reason: e.to_string(),
        })?;

    cache.update_property(device_id, control.name(), if enabled { "true" } else { "false" });
    info!(device_id, property = control.name(), enabled, "control applied");

    Ok(ControlOutcome::Applied {
        device_id: device_id.to_owned(),
        control,
        enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_prefix_is_stripped() {
        let req = ControlRequest::device("dev-1", "ClockSynchronisation#PreferredLeader", "1");
        assert_eq!(req.property_name(), "PreferredLeader");
        assert!(req.enabled());

        let req = ControlRequest::device("dev-1", "UnicastClocking", "0");
        assert_eq!(req.property_name(), "UnicastClocking");
        assert!(!req.enabled());
    }

    #[test]
    fn only_one_enables() {
        assert!(!ControlRequest::device("d", "PreferredLeader", "true").enabled());
        assert!(!ControlRequest::device("d", "PreferredLeader", "").enabled());
    }

    #[test]
    fn site_request_shape() {
        let req = ControlRequest::site("Site B");
        assert!(req.device_id.is_none());
        assert_eq!(req.property_name(), SITE_NAME);
        assert_eq!(req.value, "Site B");
    }
}
