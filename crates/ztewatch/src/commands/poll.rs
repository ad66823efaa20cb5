//! `ztewatch poll`: one cycle, one snapshot.

use tracing::debug;

use ztewatch_core::{Poller, RouterConfig};

use crate::cli::{GlobalOpts, PollArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: &PollArgs,
    router: &RouterConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut poller = Poller::new(router)?;
    let snapshot = poller.run_cycle().await;
    debug!(
        cycle = snapshot.cycle,
        failed = snapshot.group_errors.len(),
        "poll finished"
    );

    let rendered = output::render_snapshot(
        global.output,
        &snapshot,
        output::should_color(global.color),
    )?;
    output::print_output(&rendered, global.quiet);

    if let Some(err) = super::unreachable_router(&snapshot, router) {
        return Err(err);
    }

    let unavailable = super::unavailable_groups(&snapshot);
    if args.strict && unavailable > 0 {
        return Err(CliError::Incomplete { count: unavailable });
    }
    Ok(())
}
