use std::path::PathBuf;

use clap::Parser;
use filter_chain::{Engine, FilterError, RawValue, TemplateConfig};
use serde_json::Value;
use tracing::Level;

/// Match a JSON item (or a list of items) against filter options.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON item, or a JSON array of items with --many
    item: String,
    /// Filter options as JSON. Anything that is not valid JSON is taken as plain text.
    options: Option<String>,
    /// Template field, in order (repeatable). Defaults to name, type, path.
    #[arg(long = "field", value_name = "NAME")]
    fields: Vec<String>,
    /// Template config file (JSON), instead of --field
    #[arg(long, conflicts_with = "fields")]
    template: Option<PathBuf>,
    /// Case-sensitive default for options without a caseSensitive key
    #[arg(long)]
    case_sensitive: bool,
    /// Treat ITEM as an array and print the matching items
    #[arg(long)]
    many: bool,
    /// Print the sanitized options to stderr
    #[arg(long)]
    explain: bool,
    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), FilterError> {
    // Build the template.
    let mut config = match &args.template {
        Some(path) => TemplateConfig::load(path)?,
        None if args.fields.is_empty() => TemplateConfig::default(),
        None => TemplateConfig {
            fields: args.fields.clone(),
            ..TemplateConfig::default()
        },
    };
    config.case_sensitive |= args.case_sensitive;
    let engine = Engine::new(config.template())?;

    // Parse input JSON.
    let item: Value = serde_json::from_str(&args.item)
        .map_err(|e| FilterError::Config(format!("invalid item JSON: {e}")))?;
    let options = match args.options.as_deref() {
        None => RawValue::Null,
        Some(raw) => serde_json::from_str::<Value>(raw)
            .map(RawValue::from)
            .unwrap_or_else(|_| RawValue::from(raw)),
    };

    let sanitized = engine.sanitize_with_default(options, config.case_sensitive);
    if args.explain {
        eprintln!("{sanitized}");
    }

    // Output result.
    if args.many {
        let Value::Array(items) = item else {
            return Err(FilterError::Config("--many expects a JSON array of items".into()));
        };
        let kept = engine.filter_all(&items, &sanitized, config.case_sensitive)?;
        let out = serde_json::to_string_pretty(&kept)
            .map_err(|e| FilterError::Config(e.to_string()))?;
        println!("{out}");
    } else {
        println!("{}", engine.filter(&item, &sanitized, config.case_sensitive)?);
    }
    Ok(())
}
