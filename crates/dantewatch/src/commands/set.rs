//! Toggle a device clock preference.

use dantewatch_core::control::switch_label;
use dantewatch_core::{Aggregator, ControlOutcome, ControlRequest};

use crate::cli::{GlobalOpts, OutputFormat, SetArgs};
use crate::error::CliError;
use crate::output;

fn summary(device: &str, outcome: &ControlOutcome) -> String {
    match outcome {
        ControlOutcome::Applied {
            device_id,
            control,
            enabled,
        } => format!(
            "{device_id}: {} set to {}",
            control.name(),
            switch_label(*enabled)
        ),
        ControlOutcome::Ignored { reason } => format!("{device}: ignored ({reason})"),
        ControlOutcome::SiteSelected { name, .. } => format!("site selected: {name}"),
    }
}

pub async fn handle(
    aggregator: &Aggregator,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    aggregator.full_refresh().await?;

    let request = ControlRequest::device(
        args.device.clone(),
        args.property.clone(),
        args.state.as_control_value(),
    );
    let outcome = aggregator.apply_control(&request).await?;

    let out = output::render_single(
        &global.output,
        &outcome,
        |o| summary(&args.device, o),
        |o| summary(&args.device, o),
    )?;
    output::print_output(&out, global.quiet);

    // Table output also shows the device's controls as now cached.
    if matches!(global.output, OutputFormat::Table)
        && matches!(outcome, ControlOutcome::Applied { .. })
    {
        let ids = [args.device];
        let fleet = aggregator.get_fleet(Some(&ids)).await;
        if let Some(device) = fleet.first() {
            let controls = device.controls.iter().map(|c| (&c.name, &c.value));
            output::print_output(&output::render_key_values(controls), global.quiet);
        }
    }

    aggregator.stop().await;
    Ok(())
}
