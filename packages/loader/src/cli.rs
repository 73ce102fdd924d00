//! Command-line interface for the loader.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::config::LoaderConfig;
use crate::definition::{ComponentDefinition, SimpleDefinitionRegistry};
use crate::error::{LoaderError, Result};
use crate::reader::{CollectingListener, Problem, XmlDefinitionReader};

/// Wiring Loader - Read XML component definitions into a registry.
#[derive(Parser)]
#[command(name = "wiring-loader")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load definition documents and print the resulting registry.
    Load {
        /// Document locations: paths, file: or http(s): URLs
        #[arg(required = true)]
        locations: Vec<String>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Activate a profile (repeatable)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Set a placeholder property (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        properties: Vec<(String, String)>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Reject definitions and aliases that override earlier ones
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
    Json,
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            locations,
            config,
            profiles,
            properties,
            format,
            strict,
        } => {
            let config = build_config(config.as_deref(), profiles, properties, strict)?;
            load_command(&locations, &config, format)
        }
    }
}

/// Merge the configuration file, environment and command-line flags.
fn build_config(
    path: Option<&Path>,
    profiles: Vec<String>,
    properties: Vec<(String, String)>,
    strict: bool,
) -> Result<LoaderConfig> {
    let mut config = match path {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_env_overrides()
    .with_active_profiles(profiles);

    for (key, value) in properties {
        config = config.with_property(key, value);
    }
    if strict {
        config.allow_definition_overriding = false;
        config.allow_alias_overriding = false;
    }

    config.validate()?;
    Ok(config)
}

/// One registry entry in structured output.
#[derive(Serialize)]
struct DefinitionEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    definition: &'a ComponentDefinition,
}

/// Structured output of a load.
#[derive(Serialize)]
struct LoadReport<'a> {
    definitions: Vec<DefinitionEntry<'a>>,
    problems: &'a [Problem],
}

/// Execute the load command.
fn load_command(locations: &[String], config: &LoaderConfig, format: OutputFormat) -> Result<()> {
    let reader = XmlDefinitionReader::new(config.environment());
    let mut registry = config.registry();
    let mut listener = CollectingListener::new();

    let mut total = 0;
    for location in locations {
        if format == OutputFormat::Text {
            eprintln!("{} {}", style("Loading").bold(), style(location).cyan());
        }
        total += reader.load_definitions(location, &mut registry, &mut listener)?;
    }

    let problems = &listener.problems;
    for problem in problems {
        eprintln!("{} {}", style("problem:").yellow().bold(), problem);
    }

    let summary = report(&registry, problems);
    match format {
        OutputFormat::Text => print_text(&registry, total),
        OutputFormat::Yaml => println!("{}", serde_yaml_ng::to_string(&summary)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(LoaderError::ProblemsReported(problems.len()))
    }
}

fn report<'a>(registry: &'a SimpleDefinitionRegistry, problems: &'a [Problem]) -> LoadReport<'a> {
    let definitions = registry
        .definitions()
        .map(|(name, definition)| DefinitionEntry {
            name,
            aliases: registry.aliases_of(name),
            definition: definition.as_ref(),
        })
        .collect();
    LoadReport {
        definitions,
        problems,
    }
}

fn print_text(registry: &SimpleDefinitionRegistry, total: usize) {
    for (name, definition) in registry.definitions() {
        let class_name = definition
            .class_name
            .as_deref()
            .or(definition.parent_name.as_deref())
            .unwrap_or("-");
        print!("{} {}", style(name).cyan(), class_name);
        let aliases = registry.aliases_of(name);
        if !aliases.is_empty() {
            print!(" {}", style(format!("[{}]", aliases.join(", "))).dim());
        }
        println!();
    }
    println!();
    println!(
        "{} {} component definition(s)",
        style("Loaded").green().bold(),
        total
    );
}
