//! Continuous polling (`watch`).

use dantewatch_core::{Aggregator, FleetDevice};
use tracing::debug;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

fn line(device: &FleetDevice, color: bool) -> String {
    let prop = |key: &str| {
        device
            .properties
            .get(key)
            .map_or("-", String::as_str)
            .to_owned()
    };
    format!(
        "{:<24} {:<20} {:<8} sync={} clock={} latency={}",
        device.device_id,
        device.device_name.as_deref().unwrap_or("-"),
        output::online_label(device.online, color),
        prop("ClockSynchronisation#SyncStatus"),
        prop("Status#Clocking"),
        prop("Status#Latency"),
    )
}

/// Print every refresh until Ctrl-C.
///
/// Each refresh reads the fleet, which keeps the activity gate open.
pub async fn handle(
    aggregator: &Aggregator,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    debug!(
        refresh = ?aggregator.config().refresh_interval,
        ids = args.ids.len(),
        "watching fleet"
    );
    let color = output::should_color(&global.color);
    let filter = (!args.ids.is_empty()).then_some(args.ids.as_slice());
    let mut refreshed = aggregator.refreshed();

    // Kick off the loop; the first fleet read is always empty.
    aggregator.get_fleet(filter).await;

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = refreshed.changed() => {
                if changed.is_err() {
                    break;
                }
                let at = *refreshed.borrow_and_update();
                let fleet = aggregator.get_fleet(filter).await;
                if let Some(at) = at {
                    output::print_output(
                        &format!("── {} ({} devices)", at.format("%H:%M:%S"), fleet.len()),
                        global.quiet,
                    );
                }
                for device in &fleet {
                    output::print_output(&line(device, color), global.quiet);
                }
            }
        }
    }

    aggregator.stop().await;
    Ok(())
}
