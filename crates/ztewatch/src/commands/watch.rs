//! `ztewatch watch`: drive a Monitor and print every snapshot.

use tracing::{debug, info, warn};

use ztewatch_core::{Monitor, Poller, RouterConfig};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::positive_secs;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: &WatchArgs,
    router: &RouterConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interval = match args.interval {
        Some(secs) => positive_secs("interval", secs)?,
        None => router.poll_interval,
    };

    // One JSON document per line so the stream stays machine-readable.
    let format = match global.output {
        OutputFormat::Json => OutputFormat::JsonCompact,
        other => other,
    };
    let color = output::should_color(global.color);

    let poller = Poller::new(router)?;
    let monitor = Monitor::start(poller, interval);
    let mut snapshots = monitor.subscribe();
    info!(endpoint = %router.endpoint, ?interval, "watching router");

    let mut printed = 0u64;
    let result = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let Some(snapshot) = snapshots.borrow_and_update().clone() else {
                    continue;
                };

                if let Some(err) = super::unreachable_router(&snapshot, router) {
                    warn!(cycle = snapshot.cycle, "{err}");
                }
                match output::render_snapshot(format, &snapshot, color) {
                    Ok(rendered) => output::print_output(&rendered, global.quiet),
                    Err(err) => break Err(err),
                }

                printed += 1;
                if args.count.is_some_and(|n| printed >= n) {
                    break Ok(());
                }
            }
        }
    };

    monitor.shutdown().await;
    result
}
