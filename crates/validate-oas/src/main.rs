mod report;

use anyhow::{Context, Result};
use clap::Parser;
use oas_validation::{Dialect, OasValidator, ValidationContext, ValidatorOptions};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Validate a JSON or YAML instance against an OpenAPI schema
#[derive(Parser, Debug)]
#[command(name = "validate-oas")]
#[command(about = "Validate instances against OpenAPI 3.0 / 3.1 schemas", long_about = None)]
struct Args {
    /// Path to the schema (or full OpenAPI document), JSON or YAML
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Path to the instance to validate, JSON or YAML
    #[arg(long, value_name = "FILE")]
    instance: PathBuf,

    /// OpenAPI dialect (3.0 or 3.1). Defaults to the document's `openapi`
    /// field, then 3.1.
    #[arg(long, value_name = "VERSION")]
    dialect: Option<String>,

    /// Validate as a response body (writeOnly properties must be absent)
    #[arg(long, conflicts_with = "write")]
    read: bool,

    /// Validate as a request body (readOnly properties must be absent)
    #[arg(long)]
    write: bool,

    /// Schema to validate against, e.g. '#/components/schemas/Pet'
    #[arg(long, value_name = "REF")]
    entry: Option<String>,

    /// Print the error as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Parse a file as YAML when its extension says so, JSON otherwise
fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let schema = load(&args.schema)?;
    let instance = load(&args.instance)?;

    let dialect = match &args.dialect {
        Some(name) => name.parse::<Dialect>()?,
        None => Dialect::detect(&schema).unwrap_or_default(),
    };
    let context = ValidationContext::from_flags(args.read, args.write)?;

    let mut options = ValidatorOptions::default()
        .with_dialect(dialect)
        .with_context(context);
    options.entry = args.entry.clone();

    tracing::debug!(schema = %args.schema.display(), %dialect, "loading schema");

    let validator = OasValidator::new(schema, options)
        .with_context(|| format!("Failed to load schema from {}", args.schema.display()))?;

    match validator.validate(&instance) {
        Ok(()) => {
            println!("✓ Validation successful");
            println!("  Instance: {}", args.instance.display());
            println!("  Schema: {} ({})", args.schema.display(), validator.dialect());
            Ok(())
        }
        Err(error) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&error)?);
            } else {
                eprint!("{}", report::render(&error));
            }
            process::exit(1);
        }
    }
}
