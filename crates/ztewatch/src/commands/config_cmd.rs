//! Config subcommand handlers.

use std::path::Path;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config(&path)?.redacted();
            let rendered = render_config(global.output, &cfg, &path)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}

fn render_config(format: OutputFormat, cfg: &Config, path: &Path) -> Result<String, CliError> {
    output::render_single(
        format,
        cfg,
        |c| {
            let body = toml::to_string_pretty(c).unwrap_or_else(|e| format!("# {e}"));
            let origin = if path.exists() {
                format!("# {}", path.display())
            } else {
                format!("# {} (not found, showing defaults)", path.display())
            };
            format!("{origin}\n{body}")
        },
        |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
    )
}
