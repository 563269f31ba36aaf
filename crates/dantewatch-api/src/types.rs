// Wire types for the Director GraphQL API.
//
// Domain summaries are typed; device payloads stay as raw JSON and are
// flattened by the extractor in `dantewatch-core`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Envelope ─────────────────────────────────────────────────────────

/// Request body accepted by the endpoint.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// Standard `{data, errors}` response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

impl GraphQlError {
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.code.as_deref()
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.code() == Some("UNAUTHENTICATED")
    }
}

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DomainsData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub domains: Vec<DomainSummary>,
}

/// A domain (site) with aggregate health.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<DeviceRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: DomainStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainStatus {
    pub clocking: Option<String>,
    pub connectivity: Option<String>,
    pub latency: Option<String>,
    pub subscriptions: Option<String>,
    pub summary: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DomainDevicesData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub domains: Vec<DomainDevices>,
}

/// One domain's device payloads, untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainDevices {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Value>,
}

// ── Mutations ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockControlInput<'a> {
    pub device_id: &'a str,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct InputVariables<T: Serialize> {
    pub input: T,
}

#[derive(Debug, Deserialize)]
pub struct MutationResult {
    #[serde(default)]
    pub ok: Option<bool>,
}
