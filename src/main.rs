//! Pretty parser: PDF/TXT text extraction and regex cleanup

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info};
use pretty_parser::cli::{self, Cli, Commands, ConfigAction, RunArgs};
use pretty_parser::input::pdf::PAGE_STRATEGIES;
use pretty_parser::output::formatter::{ConsoleFormatter, JsonFormatter, OutputFormatter};
use pretty_parser::{BatchRunner, Config, PrettyParserError, SourceMode};
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(2);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config.as_deref()) {
        error!("Command failed: {:#}", e);
        let configuration = e
            .downcast_ref::<PrettyParserError>()
            .is_some_and(PrettyParserError::is_configuration);
        process::exit(if configuration { 2 } else { 1 });
    }
}

fn load_config(path: Option<&Path>) -> pretty_parser::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn run_command(command: Commands, config: Config, config_path: Option<&Path>) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => run(args, &config),

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    print!("{}", config.to_toml()?);
                }

                Some(ConfigAction::Reset) => {
                    let path = config_path
                        .map(Path::to_path_buf)
                        .unwrap_or_else(Config::config_path);
                    Config::default()
                        .save_to(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    let path = config_path
                        .map(Path::to_path_buf)
                        .unwrap_or_else(Config::config_path);
                    println!("{}", path.display());
                }
            }
            Ok(())
        }

        Commands::Strategies => {
            for (name, description) in PAGE_STRATEGIES {
                println!("{:<10} {}", name, description);
            }
            Ok(())
        }
    }
}

fn run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let mode: SourceMode = args.mode.parse()?;
    let collecting = args.output.is_none();

    let mut builder = config
        .apply_to(BatchRunner::builder())
        .mode(mode)
        .files(args.files.iter())
        .directories(args.directories.iter())
        .texts(args.text.iter().cloned())
        .rules(args.rule_specs()?);

    if let Some(output) = &args.output {
        builder = builder.output(output);
    }
    if args.no_defaults {
        builder = builder.apply_defaults(false);
    }
    if args.remove_blank_lines {
        builder = builder.remove_blank_lines(true);
    }
    if let Some(spacing) = args.paragraph_spacing {
        builder = builder.paragraph_spacing(spacing);
    }
    if let Some(separator) = &args.page_separator {
        builder = builder.page_separator(cli::unescape(separator));
    }
    if args.dehyphenate {
        builder = builder.dehyphenate(true);
    }
    if let Some(strategy) = &args.page_strategy {
        builder = builder.page_strategy(strategy.clone());
    }
    if args.overwrite {
        builder = builder.overwrite(true);
    }
    if let Some(jobs) = args.jobs {
        builder = builder.jobs(jobs);
    }
    if args.progress {
        builder = builder.show_progress(true);
    }

    let runner = builder.build()?;
    debug!("Active rules: {:?}", runner.normalizer().rule_names());
    info!("Starting {} run with {} jobs", mode, runner.jobs());

    let report = runner.run()?;

    if collecting {
        println!("{}", JsonFormatter::new(true).format_report(&report)?);
    }
    eprint!("{}", ConsoleFormatter::new(true).format_report(&report)?);

    Ok(())
}
