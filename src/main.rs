//! icerank CLI - Score, rank and classify ideas with ICE or RICE.

use clap::Parser;
use icerank::cli::{Cli, Commands, ConfigCommands};
use icerank::commands::{self, Output};
use icerank::config::{self, ConfigOverrides, IcerankConfig, OutputFormat, resolve_config};
use icerank::ingest::InputFormat;
use icerank::models::{ScoringModel, Weights};
use icerank::scoring::Thresholds;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g., `ICE_LOG=debug`).
const LOG_ENV: &str = "ICE_LOG";

fn main() {
    init_logging();

    let cli = Cli::parse();
    let config_dir = config::config_dir(cli.config_dir.as_deref());

    let file_config = match config_dir.as_deref() {
        Some(dir) => config::load_config(dir),
        None => Ok(IcerankConfig::new()),
    };
    // `config set` rewrites a broken file from scratch; `config path` never reads it
    let file_config = match file_config {
        Err(e) if cli.command.tolerates_broken_config() => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            Ok(IcerankConfig::new())
        }
        other => other,
    };

    // --human wins; otherwise honour the config file's output-format
    let human = cli.human_readable
        || matches!(
            &file_config,
            Ok(c) if c.output_format == Some(OutputFormat::Human)
        );

    let result = file_config.and_then(|file_config| {
        run_command(
            cli.command,
            config_dir.as_deref(),
            file_config,
            cli.human_readable,
            human,
        )
    });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(
    command: Commands,
    config_dir: Option<&Path>,
    file_config: IcerankConfig,
    human_flag: bool,
    human: bool,
) -> Result<(), icerank::Error> {
    let mut overrides = ConfigOverrides::new();
    if human_flag {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }

    match command {
        Commands::Parse { file } => {
            let raw = commands::read_input(&file)?;
            output(&commands::parse(&raw), human);
        }

        Commands::Import { file, model } => {
            let settings = resolve_config(&file_config, &with_model(overrides, model)?);
            let raw = commands::read_input(&file)?;
            let result = commands::import(&raw, settings.model())?;
            output(&result, human);
        }

        Commands::Validate {
            file,
            format,
            model,
        } => {
            let settings = resolve_config(&file_config, &with_model(overrides, model)?);
            let format = commands::resolve_format(&file, format.as_deref())?;
            let raw = commands::read_input(&file)?;
            let result = commands::validate_records(&raw, format, settings.model())?;
            output(&result, human);
        }

        Commands::Rank {
            file,
            format,
            model,
            weights,
        } => {
            let overrides = with_weights(with_model(overrides, model)?, weights)?;
            let settings = resolve_config(&file_config, &overrides);
            let format = commands::resolve_format(&file, format.as_deref())?;
            let raw = commands::read_input(&file)?;
            let loaded = commands::load_ideas(&raw, format, settings.model())?;
            output(&commands::rank(loaded, &settings), human);
        }

        Commands::Classify {
            file,
            format,
            model,
            effort_threshold,
            impact_threshold,
        } => {
            let mut overrides = with_model(overrides, model)?;
            if let (Some(effort), Some(impact)) = (effort_threshold, impact_threshold) {
                if !effort.is_finite() || !impact.is_finite() {
                    return Err(icerank::Error::InvalidInput(
                        "thresholds must be finite numbers".to_string(),
                    ));
                }
                overrides = overrides.with_thresholds(Thresholds { effort, impact });
            }
            let settings = resolve_config(&file_config, &overrides);
            let format = commands::resolve_format(&file, format.as_deref())?;
            let raw = commands::read_input(&file)?;
            let loaded = commands::load_ideas(&raw, format, settings.model())?;
            output(&commands::classify(loaded, &settings), human);
        }

        Commands::Export {
            file,
            format,
            to,
            precision,
            model,
            weights,
        } => {
            let mut overrides = with_weights(with_model(overrides, model)?, weights)?;
            if let Some(precision) = precision {
                if precision > config::MAX_PRECISION {
                    return Err(icerank::Error::InvalidInput(format!(
                        "precision must be 0-{}, got {}",
                        config::MAX_PRECISION,
                        precision
                    )));
                }
                overrides = overrides.with_precision(precision);
            }
            let settings = resolve_config(&file_config, &overrides);
            let format = commands::resolve_format(&file, format.as_deref())?;
            let raw = commands::read_input(&file)?;
            let loaded = commands::load_ideas(&raw, format, settings.model())?;
            let result = commands::export(loaded, &to, &settings)?;
            if human {
                let unit = if format == InputFormat::Text { "line" } else { "row" };
                for rejection in &result.rejected {
                    eprintln!(
                        "Skipped {} {}: {}",
                        unit,
                        rejection.row,
                        rejection.reasons.join("; ")
                    );
                }
            }
            print!("{}", result.content);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let settings = resolve_config(&file_config, &overrides);
                output(&commands::config_show(config_dir, settings), human);
            }
            ConfigCommands::Path => {
                output(&commands::config_path(config_dir)?, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(config_dir, file_config, &key, &value)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn with_model(
    overrides: ConfigOverrides,
    model: Option<String>,
) -> Result<ConfigOverrides, icerank::Error> {
    match model {
        Some(name) => {
            let model = ScoringModel::parse(&name).ok_or_else(|| {
                icerank::Error::InvalidInput(format!("unknown model '{}' (expected ice or rice)", name))
            })?;
            Ok(overrides.with_model(model))
        }
        None => Ok(overrides),
    }
}

fn with_weights(
    overrides: ConfigOverrides,
    weights: Option<String>,
) -> Result<ConfigOverrides, icerank::Error> {
    match weights {
        Some(list) => {
            let weights = Weights::parse_list(&list).map_err(icerank::Error::InvalidInput)?;
            Ok(overrides.with_weights(weights))
        }
        None => Ok(overrides),
    }
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
