//! pagesnippets CLI
//!
//! Usage:
//!   pagesnippets [OPTIONS] <TEMPLATE> [SNIPPET]
//!
//! Options:
//!   -l, --list               List the snippets a template defines
//!       --vars <JSON>        Variables as inline JSON
//!       --vars-file <FILE>   Variables from a JSON file
//!   -c, --config <FILE>      Engine configuration (TOML format)
//!   -p, --pretty             Indent the produced HTML
//!   -v, --verbose            Log progress (repeat for more)
//!   -h, --help               Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use pagesnippets::import::{FsFetcher, ImportError, InMemoryEnvironment};
use pagesnippets::{Importer, Owner, Producer, SnippetRegistry, SnippetsConfig};

#[derive(Parser)]
#[command(name = "pagesnippets")]
#[command(about = "Produce HTML from snippet templates")]
struct Cli {
    /// Template document to import
    template: PathBuf,

    /// Snippet to produce
    snippet: Option<String>,

    /// List the snippets the template defines
    #[arg(short, long)]
    list: bool,

    /// Variables as inline JSON
    #[arg(long, conflicts_with = "vars_file")]
    vars: Option<String>,

    /// Variables from a JSON file
    #[arg(long)]
    vars_file: Option<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Indent the produced HTML
    #[arg(short, long)]
    pretty: bool,

    /// Log progress; -v for info, -vv for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match SnippetsConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SnippetsConfig::default(),
    };
    let config = if cli.pretty {
        config.with_pretty_print(true)
    } else {
        config
    };

    let variables = match load_variables(&cli) {
        Ok(vars) => vars,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    let location = cli.template.to_string_lossy().into_owned();
    let importer = Importer::new(FsFetcher::new(), InMemoryEnvironment::new())
        .with_config(config.clone());
    let mut registry = SnippetRegistry::new();

    let report = match importer.import_template(&mut registry, &location).await {
        Ok(report) => report,
        Err(e) => {
            report_import_error(&e, &cli.template);
            std::process::exit(1);
        }
    };

    if cli.list {
        let mut names = report.snippets.clone();
        names.sort();
        names.dedup();
        for name in names {
            println!("{}", name);
        }
        return;
    }

    let Some(snippet) = &cli.snippet else {
        eprintln!("Error: no snippet given (use --list to see what the template defines)");
        std::process::exit(1);
    };

    match Producer::with_config(&registry, &config).produce(snippet, &Owner::new(), &variables) {
        Ok(element) => {
            if config.pretty_print {
                print!("{}", element.to_html_pretty());
            } else {
                println!("{}", element.to_html());
            }
        }
        Err(pagesnippets::ProduceError::Expression(e)) => {
            eprintln!("{}", e.format());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_variables(cli: &Cli) -> Result<Value, String> {
    let text = match (&cli.vars, &cli.vars_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| format!("reading variables '{}': {}", path.display(), e))?,
        (None, None) => return Ok(Value::Object(Default::default())),
    };
    serde_json::from_str(&text).map_err(|e| format!("variables are not valid JSON: {}", e))
}

fn report_import_error(error: &ImportError, path: &Path) {
    if let ImportError::Parse { source, .. } = error {
        if let Ok(text) = fs::read_to_string(path) {
            eprintln!("{}", source.format(&text, &path.to_string_lossy()));
            return;
        }
    }
    eprintln!("Error: {}", error);
}
