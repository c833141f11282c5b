//! dev-janitor CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use dev_janitor::cli::{Cli, CommandDispatcher, Commands};
use dev_janitor::orchestrator::PackageDiscovery;
use dev_janitor::shell::is_ci;
use dev_janitor::ui::{create_plain_ui, create_ui, should_use_colors, JanitorTheme, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("dev_janitor=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dev_janitor=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("dev-janitor starting with args: {:?}", cli);

    let wants_json = match &cli.command {
        Some(Commands::Managers(args)) => args.json,
        Some(Commands::Packages(args)) => args.json,
        Some(Commands::Config(args)) => args.json,
        _ => false,
    };

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet, wants_json);

    let is_interactive = !is_ci();
    let colors = !cli.no_color && !wants_json && should_use_colors();

    let mut ui = if colors {
        create_ui(is_interactive, output_mode)
    } else {
        create_plain_ui(is_interactive, output_mode)
    };
    let theme = if colors {
        JanitorTheme::new()
    } else {
        JanitorTheme::plain()
    };

    let dispatcher = CommandDispatcher::new(PackageDiscovery::new(), cli.config.clone())
        .with_theme(theme);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
