//! Silsilah CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use silsilah_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use silsilah_cli::commands::{
    run_add, run_backup, run_check, run_delete, run_export, run_import, run_members, run_restore,
    run_stats, run_template, run_tree, run_update,
};
use silsilah_cli::logging::{LogConfig, LogFormat, init_logging};
use silsilah_cli::summary::{
    print_import_report, print_issues, print_member, print_members, print_stats,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let store = cli.store.as_path();
    match &cli.command {
        Command::Import(args) => {
            let report = run_import(store, args)?;
            if args.json {
                print_json(&report)?;
            } else {
                print_import_report(&report);
            }
            Ok(i32::from(report.has_failures()))
        }
        Command::Tree(args) => {
            print!("{}", run_tree(store, args.format)?);
            Ok(0)
        }
        Command::Members(args) => {
            let listing = run_members(store, args)?;
            if args.json {
                print_json(&listing.members)?;
            } else {
                print_members(&listing);
            }
            Ok(0)
        }
        Command::Stats(args) => {
            let stats = run_stats(store)?;
            if args.json {
                print_json(&stats)?;
            } else {
                print_stats(&stats);
            }
            Ok(0)
        }
        Command::Check(args) => {
            let issues = run_check(store)?;
            if args.json {
                print_json(&issues)?;
            } else {
                print_issues(&issues);
            }
            Ok(i32::from(!issues.is_empty()))
        }
        Command::Add(args) => {
            print_member(&run_add(store, args)?);
            Ok(0)
        }
        Command::Update(args) => {
            print_member(&run_update(store, args)?);
            Ok(0)
        }
        Command::Delete(args) => {
            run_delete(store, &args.id)?;
            println!("Deleted {}", args.id);
            Ok(0)
        }
        Command::Export(args) => {
            let rows = run_export(store, &args.path)?;
            println!("Exported {rows} member(s) to {}", args.path.display());
            Ok(0)
        }
        Command::Template(args) => {
            let rows = run_template(&args.path)?;
            println!("Wrote template with {rows} example row(s) to {}", args.path.display());
            Ok(0)
        }
        Command::Backup(args) => {
            let members = run_backup(store, &args.path)?;
            println!("Backed up {members} member(s) to {}", args.path.display());
            Ok(0)
        }
        Command::Restore(args) => {
            let (members, issues) = run_restore(store, &args.path)?;
            println!("Restored {members} member(s) from {}", args.path.display());
            if !issues.is_empty() {
                print_issues(&issues);
            }
            Ok(0)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config.with_log_data(cli.log_data)
}
