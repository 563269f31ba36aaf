//! Site statistics (`stats`, `site <name>`).

use dantewatch_core::{Aggregator, ControlKind, ControlRequest, Statistics};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(stats: &Statistics) -> String {
    let mut out = output::render_key_values(&stats.statistics);
    for control in &stats.controls {
        if let ControlKind::Dropdown { ref options } = control.kind {
            out.push_str(&format!("\nAvailable {}: {}", control.name, options.join(", ")));
        }
    }
    out
}

fn plain(stats: &Statistics) -> String {
    stats
        .statistics
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(
    aggregator: &Aggregator,
    site: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut stats = aggregator.get_snapshot().await?;

    if let Some(name) = site {
        aggregator.apply_control(&ControlRequest::site(name)).await?;
        stats = aggregator.get_snapshot().await?;
    }

    let out = output::render_single(&global.output, &stats, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
