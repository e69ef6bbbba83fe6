//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads the dataset (or the synthetic fallback)
//! - runs the view pipeline
//! - prints reports/plots, writes exports, or hands over to the TUI

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ExportArgs, ShowArgs, SourceArgs, ViewArgs};
use crate::data::{LoadedData, load_dataset, resolve_source};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

/// Entry point for the `covid-dash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `covid-dash` and `covid-dash -m deaths` to behave like
    // `covid-dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Show(args) => handle_show(args),
        Command::Regions(args) => handle_regions(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    let target = match &args.source.log_file {
        Some(path) => LogTarget::File(path),
        None => LogTarget::Discard,
    };
    crate::logging::init(args.source.verbose, target)?;

    let config = dashboard_config(&args);
    crate::tui::run(config)
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    init_cli_logging(&args.view.source)?;
    let config = dashboard_config(&args.view);
    let loaded = load(&config);
    let view = pipeline::build_view(&loaded.dataset, &config.selection);

    println!("{}", crate::report::format_view_summary(&loaded, &view));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(&view.rows, args.width, args.height)
        );
    }

    if args.table > 0 {
        println!("{}", crate::report::format_rows_table(&view.rows, args.table));
    }

    Ok(())
}

fn handle_regions(args: SourceArgs) -> Result<(), AppError> {
    init_cli_logging(&args)?;
    let source = resolve_source(args.source.as_deref());
    let loaded = load_dataset(source.as_ref(), args.seed);
    print!("{}", crate::report::format_regions(&loaded.dataset.regions()));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    init_cli_logging(&args.view.source)?;
    let config = dashboard_config(&args.view);
    let loaded = load(&config);
    let view = pipeline::build_view(&loaded.dataset, &config.selection);

    crate::io::export::write_view(&args.out, &view, &loaded.dataset.source_note(), args.format)?;
    info!(path = %args.out.display(), rows = view.rows.len(), "wrote export");
    println!("Wrote {} rows to {}", view.rows.len(), args.out.display());
    Ok(())
}

fn init_cli_logging(args: &SourceArgs) -> Result<(), AppError> {
    let target = match &args.log_file {
        Some(path) => LogTarget::File(path),
        None => LogTarget::Stderr,
    };
    crate::logging::init(args.verbose, target)
}

fn load(config: &DashboardConfig) -> LoadedData {
    load_dataset(config.source.as_ref(), config.seed)
}

pub fn dashboard_config(args: &ViewArgs) -> DashboardConfig {
    DashboardConfig {
        source: resolve_source(args.source.source.as_deref()),
        seed: args.source.seed,
        selection: args.selection(),
    }
}

/// Rewrite argv so `covid-dash` defaults to `covid-dash tui`.
///
/// Rules:
/// - `covid-dash`                      -> `covid-dash tui`
/// - `covid-dash -m deaths ...`        -> `covid-dash tui -m deaths ...`
/// - `covid-dash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "show" | "regions" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["covid-dash"])), args(&["covid-dash", "tui"]));
    }

    #[test]
    fn leading_flags_are_tui_flags() {
        assert_eq!(
            rewrite_args(args(&["covid-dash", "-m", "deaths"])),
            args(&["covid-dash", "tui", "-m", "deaths"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["covid-dash", "show", "-f"])),
            args(&["covid-dash", "show", "-f"])
        );
        assert_eq!(
            rewrite_args(args(&["covid-dash", "--help"])),
            args(&["covid-dash", "--help"])
        );
    }
}
