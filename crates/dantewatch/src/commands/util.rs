//! Shared helpers for command handlers.

use dantewatch_core::{Aggregator, FleetDevice};

use crate::error::CliError;

/// Run one full refresh, then read the fleet.
///
/// A one-shot CLI cannot wait on the background cadence, so the first
/// refresh is driven directly and its error surfaced.
pub async fn load_fleet(
    aggregator: &Aggregator,
    ids: &[String],
) -> Result<Vec<FleetDevice>, CliError> {
    aggregator.full_refresh().await?;
    let filter = (!ids.is_empty()).then_some(ids);
    let fleet = aggregator.get_fleet(filter).await;
    aggregator.stop().await;
    Ok(fleet)
}

/// `value` or `-` when absent.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}
