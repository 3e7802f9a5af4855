#![forbid(unsafe_code)]

mod cmd;
mod output;
mod report;
mod timing;

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dagpath_core::config::{load_config, resolve_output, timing_enabled};
use dagpath_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dagpath: strongly connected components, condensation and DAG paths",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit command and stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Read configuration from this file instead of ./dagpath.toml.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze every configured dataset",
        long_about = "Analyze every configured dataset, write one report per dataset and print a summary line for each.",
        after_help = "EXAMPLES:\n    # Analyze the standard catalog, generating it if missing\n    dagpath run\n\n    # Analyze two datasets only\n    dagpath run --dataset small_1 --dataset medium_2"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        about = "Analyze a single graph file",
        after_help = "EXAMPLES:\n    # Full text report\n    dagpath analyze data/small_1.json\n\n    # Machine-readable report from vertex 3\n    dagpath analyze data/small_1.json --source 3 --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Generate the standard dataset catalog",
        after_help = "EXAMPLES:\n    # Write datasets to the configured data directory\n    dagpath generate\n\n    # Reproducible catalog in a custom directory\n    dagpath generate --out graphs --seed 7"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        about = "Convert a legacy edge array to the graph format",
        after_help = "EXAMPLES:\n    # Convert and record vertex 0 as the source\n    dagpath convert old.json data/converted.json --source 0"
    )]
    Convert(cmd::convert::ConvertArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAGPATH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dagpath_core=debug,dagpath_sim=debug,dagpath_cli=debug,info"
        } else {
            "dagpath_core=info,dagpath_sim=info,dagpath_cli=info,warn"
        })
    });

    let format = env::var("DAGPATH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let timing_on = timing_enabled(cli.timing, env::var("DAGPATH_TIMING").ok().as_deref());
    timing::set_timing_enabled(timing_on);
    timing::clear_timings();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match load_config(cli.config.as_deref()).context(ErrorCode::ConfigParseError) {
        Ok(config) => config,
        Err(err) => {
            let mode = if cli.json { OutputMode::Json } else { OutputMode::Text };
            render_error(mode, &CliError::from_anyhow(&err))?;
            std::process::exit(1);
        }
    };
    let output = OutputMode::from_name(resolve_output(
        cli.json,
        config.output.as_deref(),
        env::var("FORMAT").ok().as_deref(),
    ));

    let command_result = match cli.command {
        Commands::Run(ref args) => {
            timing::timed("cmd.run", || cmd::run::run_run(args, &config, output))
        }
        Commands::Analyze(ref args) => {
            timing::timed("cmd.analyze", || cmd::analyze::run_analyze(args, output))
        }
        Commands::Generate(ref args) => timing::timed("cmd.generate", || {
            cmd::generate::run_generate(args, &config, output)
        }),
        Commands::Convert(ref args) => {
            timing::timed("cmd.convert", || cmd::convert::run_convert(args, output))
        }
    };

    if timing_on {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }

    if let Err(err) = command_result {
        render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["dagpath", "--timing", "run"]);
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn timing_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["dagpath", "analyze", "g.json", "--timing"]);
        assert!(cli.timing);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["dagpath", "generate", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["dagpath", "run", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn verbose_flag_parsed() {
        let cli = Cli::parse_from(["dagpath", "-v", "run"]);
        assert!(cli.verbose);
    }

    #[test]
    fn verbose_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["dagpath", "run", "-v"]);
        assert!(cli.verbose);

        let cli = Cli::parse_from(["dagpath", "analyze", "g.json", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn analyze_requires_a_file() {
        assert!(Cli::try_parse_from(["dagpath", "analyze"]).is_err());
    }

    #[test]
    fn convert_requires_input_and_output() {
        assert!(Cli::try_parse_from(["dagpath", "convert", "old.json"]).is_err());
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["dagpath", "run"],
            vec!["dagpath", "analyze", "g.json"],
            vec!["dagpath", "generate"],
            vec!["dagpath", "convert", "old.json", "new.json"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse {args:?}: {:?}", result.err());
        }
    }
}
