use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kousei::merge::{self, MergePolicy};
use kousei::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Validates configuration resources before they reach the platform
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Validator configuration (YAML); falls back to $KOUSEI_CONFIG
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an exported bundle of resources
    Validate {
        /// Path to the bundle JSON file
        bundle: PathBuf,
    },
    /// Show what an update would do to a stored resource
    Merge {
        /// Path to the current resource JSON
        current: PathBuf,
        /// Path to the update JSON
        patch: PathBuf,
        /// Replace top-level keys instead of merging them
        #[arg(long)]
        replace: bool,
    },
    /// List the available operations, or describe one
    Operations {
        name: Option<String>,
        /// Print the JSON schema of the operation input
        #[arg(long)]
        schema: bool,
    },
    /// Run a script of operations against an in-memory platform
    Replay {
        /// Path to a JSON array of {"operation", "input"} steps
        script: PathBuf,
    },
}

/// One entry of a replay script.
///
/// Any string `"@N"` inside `input` is replaced with the id returned by step `N` (0-based).
#[derive(Deserialize, Debug)]
struct ScriptStep {
    operation: String,
    input: Value,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kousei=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("\nError: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ValidatorConfig::from_file(path)?,
        None => ValidatorConfig::from_env()?,
    };

    match cli.command {
        Command::Validate { bundle } => run_validate(&bundle, &config),
        Command::Merge {
            current,
            patch,
            replace,
        } => run_merge(&current, &patch, replace),
        Command::Operations { name, schema } => run_operations(name.as_deref(), schema),
        Command::Replay { script } => run_replay(&script, config),
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn run_validate(path: &Path, config: &ValidatorConfig) -> Result<()> {
    let bundle = Bundle::from_file(path)?;
    let report = bundle.validate_all(config)?;

    println!("Bundle is valid.");
    for graph in &report.forms {
        println!(
            "  form {}: {} fields, root {}",
            graph.form_id(),
            graph.len(),
            graph.root()
        );
    }
    for graph in &report.journeys {
        println!(
            "  journey {}: {} steps, entry {}",
            graph.journey_id(),
            graph.len(),
            graph.entry_steps().join(", ")
        );
        println!("    activation order: {}", graph.activation_order().join(" -> "));
        let unreachable = graph.unreachable();
        if !unreachable.is_empty() {
            println!("    unreachable: {}", unreachable.join(", "));
        }
    }
    println!("  triggers: {}", report.triggers);
    println!("  templates: {}", report.templates);
    Ok(())
}

fn run_merge(current: &Path, patch: &Path, replace: bool) -> Result<()> {
    let current = read_json(current)?;
    let patch = read_json(patch)?;
    let preview = merge::preview(&current, &patch, MergePolicy::from_replace_flag(replace));

    println!("{}", serde_json::to_string_pretty(&preview.result)?);
    if preview.is_destructive() {
        eprintln!("\nDiscarded by this update:");
        for path in &preview.discarded {
            eprintln!("  - {path}");
        }
    }
    Ok(())
}

fn run_operations(name: Option<&str>, schema: bool) -> Result<()> {
    let registry = Registry::default();
    match name {
        None => print!("{}", OperationFormatter::format_catalog(&registry.descriptors())),
        Some(name) => {
            let Some(descriptor) = registry.describe(name) else {
                bail!(
                    "unknown operation '{name}', expected one of: {}",
                    registry.operation_names().join(", ")
                );
            };
            if schema {
                println!("{}", serde_json::to_string_pretty(&descriptor.input_schema())?);
            } else {
                println!("{}", OperationFormatter::format_descriptor(&descriptor));
            }
        }
    }
    Ok(())
}

fn run_replay(path: &Path, config: ValidatorConfig) -> Result<()> {
    let steps: Vec<ScriptStep> = serde_json::from_value(read_json(path)?)
        .with_context(|| format!("{} is not a list of operations", path.display()))?;
    let mut workspace = Workspace::builder(InMemoryPlatform::new())
        .with_config(config)
        .build();

    let mut ids: Vec<String> = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let input = substitute_ids(&step.input, &ids)
            .with_context(|| format!("step {i} ({})", step.operation))?;
        let output = workspace
            .invoke(&step.operation, &input)
            .with_context(|| format!("step {i} ({}) was rejected", step.operation))?;
        let id = output
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        println!("[{i}] {} -> {id}", step.operation);
        ids.push(id);
    }

    for warning in workspace.take_warnings() {
        println!("warning: {warning}");
    }
    println!("\nReplayed {} operations.", steps.len());
    Ok(())
}

fn substitute_ids(value: &Value, ids: &[String]) -> Result<Value> {
    Ok(match value {
        Value::String(s) => match s.strip_prefix('@').map(str::parse::<usize>) {
            Some(Ok(n)) => match ids.get(n) {
                Some(id) => Value::String(id.clone()),
                None => bail!("'{s}' refers to a step that has not run yet"),
            },
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_ids(item, ids))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), substitute_ids(v, ids)?)))
                .collect::<Result<_>>()?,
        ),
        other => other.clone(),
    })
}
