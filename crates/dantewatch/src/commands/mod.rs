//! Command dispatch: bridges CLI args -> aggregator calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod set;
pub mod stats;
pub mod util;
pub mod watch;

use dantewatch_core::Aggregator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a Director-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    aggregator: &Aggregator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Stats => stats::handle(aggregator, None, global).await,
        Command::Site(args) => stats::handle(aggregator, Some(&args.name), global).await,
        Command::Devices(args) => devices::handle(aggregator, args, global).await,
        Command::Set(args) => set::handle(aggregator, args, global).await,
        Command::Watch(args) => watch::handle(aggregator, args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
    }
}
