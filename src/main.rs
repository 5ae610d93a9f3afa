//! flavormap - query and check clipboard flavor mappings
//!
//! Entry point for the command-line tool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_flavormap::config::{Config, LoggingConfig};
use lamco_flavormap::registry::{source, FileSource, MappingSource};
use lamco_flavormap::{Flavor, FlavorRegistry, Native};

/// Command-line arguments for flavormap
#[derive(Parser, Debug)]
#[command(name = "flavormap")]
#[command(version, about = "Clipboard native <-> flavor mapping tool", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "FLAVORMAP_CONFIG", default_value = "/etc/flavormap/flavormap.toml")]
    pub config: PathBuf,

    /// Extra mapping file (can be specified multiple times)
    #[arg(short, long)]
    pub mappings: Vec<PathBuf>,

    /// Do not load the built-in Wayland/X11 table
    #[arg(long)]
    pub no_builtin: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact), overrides the config file
    #[arg(long)]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// flavormap subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List natives for a flavor, best first
    Natives {
        /// MIME type of the flavor (e.g. "text/plain; charset=UTF-8")
        mime: String,
    },

    /// List flavors for a native, best first
    Flavors {
        /// Platform format name (e.g. UTF8_STRING)
        native: String,
    },

    /// Print every known native with its flavors
    Dump {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse a mapping file and report skipped lines
    Check {
        /// Mapping file to check
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // A missing config file means defaults; a broken one is an error
    let config = if args.config.exists() {
        Config::load(&args.config)
    } else {
        Ok(Config::default_config())
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", lamco_flavormap::utils::format_user_error(&e));
            return Err(e);
        }
    };

    init_logging(&args, &config.logging)?;

    if let Err(e) = run(args, config) {
        eprintln!("{}", lamco_flavormap::utils::format_user_error(&e));
        return Err(e);
    }
    Ok(())
}

fn run(args: Args, config: Config) -> Result<()> {
    let config = config.with_overrides(args.mappings, args.no_builtin);
    tracing::debug!("Config: {:?}", config);

    match args.command {
        Command::Natives { mime } => {
            let flavor = Flavor::parse(&mime).context("Invalid flavor argument")?;
            let registry = load_registry(&config)?;
            for native in registry.natives_for(Some(&flavor)) {
                println!("{}", native);
            }
        }
        Command::Flavors { native } => {
            let registry = load_registry(&config)?;
            for flavor in registry.flavors_for(Some(&Native::from(native))) {
                println!("{}", flavor);
            }
        }
        Command::Dump { json } => {
            let registry = load_registry(&config)?;
            dump(&registry, json)?;
            info!("{:?}", registry.stats());
        }
        Command::Check { file } => check(file)?,
    }
    Ok(())
}

fn load_registry(config: &Config) -> Result<FlavorRegistry> {
    let registry = config.build_registry();
    registry.initialize().context("Failed to load flavor mappings")?;
    for diagnostic in registry.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }
    Ok(registry)
}

fn dump(registry: &FlavorRegistry, json: bool) -> Result<()> {
    let natives = registry.natives_for(None);
    if json {
        let table: serde_json::Map<String, serde_json::Value> = natives
            .iter()
            .map(|native| {
                let flavors = registry
                    .flavors_for(Some(native))
                    .iter()
                    .map(|f| serde_json::Value::String(f.mime_type()))
                    .collect();
                (native.to_string(), serde_json::Value::Array(flavors))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        for native in &natives {
            println!("{}", native);
            for flavor in registry.flavors_for(Some(native)) {
                println!("    {}", flavor);
            }
        }
    }
    Ok(())
}

fn check(file: PathBuf) -> Result<()> {
    let sources: Vec<Box<dyn MappingSource>> = vec![Box::new(FileSource::new(&file))];
    let loaded = source::load_sources(&sources)
        .with_context(|| format!("Failed to load mapping file {}", file.display()))?;

    for diagnostic in &loaded.diagnostics {
        println!("{}", diagnostic);
    }
    println!(
        "{}: {} mapping(s), {} skipped line(s)",
        file.display(),
        loaded.pairs.len(),
        loaded.diagnostics.len()
    );
    Ok(())
}

fn init_logging(args: &Args, logging: &LoggingConfig) -> Result<()> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => logging.level.to_lowercase(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let log_format = args.log_format.as_deref().unwrap_or(logging.format.as_str());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lamco_flavormap={level},flavormap={level},warn",
            level = log_level
        ))
    });

    // If log file is specified, write to both stderr and file
    if let Some(log_file_path) = args.log_file.as_ref().or(logging.file.as_ref()) {
        let file = File::create(log_file_path)?;

        match log_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                    .with(tracing_subscriber::fmt::layer().with_writer(file).with_ansi(false))
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
    } else {
        match log_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            }
            "pretty" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                    .init();
            }
        }
    }

    Ok(())
}
