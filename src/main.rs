//! iacgen CLI entry point.
//!
//! This binary provides the command-line interface for iacgen.

use clap::Parser;
use colored::Colorize;
use iacgen::cli::{AwsArgs, Cli, Commands, GenerateTarget};
use iacgen::prompt::TerminalPrompter;
use iacgen::{CollectMode, Config, GenerateReport, Generator, IacGenError};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");

            eprintln!("{} {e}", "Error:".red().bold());

            // Print error chain (cause chain)
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut i = 0;
                while let Some(cause) = source {
                    eprintln!("  {i}: {cause}");
                    source = cause.source();
                    i += 1;
                }
            }

            let code = e
                .downcast_ref::<IacGenError>()
                .map_or(1, IacGenError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let base_level = match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            EnvFilter::new(format!("warn,iacgen={base_level}"))
        })
    };

    // stdout carries the report, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::debug!("Loading configuration");
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Generate(args) => match args.target {
            GenerateTarget::Aws(aws) => {
                config.merge_cli_args(cli.non_interactive, aws.output.as_ref());
                let report = generate_aws(config, &aws, cli.quiet)?;
                print_report(&report, cli.json, cli.quiet)?;
                Ok(ExitCode::SUCCESS)
            }
        },

        Commands::Init => {
            let config_path = std::path::Path::new("iacgen.yaml");

            if config_path.exists() {
                anyhow::bail!("Configuration file already exists: {}", config_path.display());
            }

            std::fs::write(config_path, Config::example_yaml())?;
            println!("Created example configuration: iacgen.yaml");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate(args) => {
            let content = std::fs::read_to_string(&args.config)?;
            match Config::from_yaml(&content) {
                Ok(_) => {
                    println!("Configuration is valid: {}", args.config.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    Ok(ExitCode::from(1))
                }
            }
        }
    }
}

fn generate_aws(config: Config, flags: &AwsArgs, quiet: bool) -> anyhow::Result<GenerateReport> {
    let mode = CollectMode::from(config.generate.non_interactive);
    let colored = config.output.colored;
    let generator = Generator::new(config);
    let mut args = flags.to_generate_args();

    tracing::debug!(?mode, "Executing generate aws command");
    let mut prompter = TerminalPrompter::stdio(colored);
    generator.collect_aws(&mut args, &mut prompter, mode)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Generating Terraform Code...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = generator
        .render_aws(&args)
        .and_then(|(text, blocks)| generator.write(&text, blocks));
    spinner.finish_and_clear();

    Ok(result?)
}

fn print_report(report: &GenerateReport, json: bool, quiet: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if !quiet {
        println!(
            "{} {}",
            "Terraform code generated at".green(),
            report.location.display().to_string().bold()
        );
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    // Check for explicit config file
    if let Some(ref config_path) = cli.config {
        tracing::debug!(path = %config_path.display(), "Loading configuration from explicit path");
        let content = std::fs::read_to_string(config_path)?;
        return Ok(Config::from_yaml(&content)?);
    }

    // Look for default config files
    let default_paths = ["iacgen.yaml", "iacgen.yml", ".iacgen.yaml"];
    for path in &default_paths {
        if std::path::Path::new(path).exists() {
            tracing::debug!(path = %path, "Found configuration file");
            let content = std::fs::read_to_string(path)?;
            return Ok(Config::from_yaml(&content)?);
        }
    }

    tracing::debug!("No configuration file found, using default configuration");
    Ok(Config::default())
}
