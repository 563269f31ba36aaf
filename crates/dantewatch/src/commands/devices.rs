//! Device listing.

use dantewatch_core::FleetDevice;
use tabled::Tabled;

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Clocking")]
    clocking: String,
}

fn row(d: &FleetDevice, color: bool) -> DeviceRow {
    let prop = |key: &str| util::or_dash(d.properties.get(key).map(String::as_str));
    DeviceRow {
        id: d.device_id.clone(),
        name: util::or_dash(d.device_name.as_deref()),
        model: util::or_dash(d.device_model.as_deref()),
        state: output::online_label(d.online, color),
        site: prop("SiteName"),
        ip: prop("IPAddress"),
        clocking: prop("Status#Clocking"),
    }
}

fn detail(d: &FleetDevice, color: bool) -> String {
    let mut lines = vec![
        format!("ID:       {}", d.device_id),
        format!("Name:     {}", d.device_name.as_deref().unwrap_or("-")),
        format!("Model:    {}", d.device_model.as_deref().unwrap_or("-")),
        format!("State:    {}", output::online_label(d.online, color)),
        String::new(),
        output::render_key_values(&d.properties),
    ];
    if !d.controls.is_empty() {
        let names: Vec<&str> = d.controls.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("Controls: {}", names.join(", ")));
    }
    lines.join("\n")
}

pub async fn handle(
    aggregator: &dantewatch_core::Aggregator,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fleet = util::load_fleet(aggregator, &args.ids).await?;
    let color = output::should_color(&global.color);

    let out = match fleet.as_slice() {
        [single] if args.ids.len() == 1 => output::render_single(
            &global.output,
            single,
            |d| detail(d, color),
            |d| d.device_id.clone(),
        )?,
        [] if !args.ids.is_empty() => {
            return Err(CliError::InvalidArgument {
                message: format!("no device matches: {}", args.ids.join(", ")),
            });
        }
        _ => output::render_list(
            &global.output,
            &fleet,
            |d| row(d, color),
            |d| d.device_id.clone(),
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
