use clap::{Parser, Subcommand, ValueEnum};
use lifequal::city::types::Coordinate;
use lifequal::compare::{AddressOutcome, AddressQuery};
use lifequal::config::{Config, SourceKind};
use lifequal::source::{CacheConfig, DataSource, Dataset, HttpSource, StatsCache};
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_PIPELINE: i32 = 1;
const EXIT_SOURCE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one address
    Score {
        /// Coordinate as LAT,LNG (e.g. 48.2082,16.3738)
        #[arg(allow_hyphen_values = true)]
        coordinate: Coordinate,

        /// District name (required when scoring against the API)
        #[arg(short, long)]
        district: Option<String>,

        /// Persona whose weights to use (student, parent, senior, unemployed, default)
        #[arg(short, long)]
        persona: Option<String>,
    },
    /// Score two addresses and show the difference
    Compare {
        /// First coordinate as LAT,LNG
        #[arg(allow_hyphen_values = true)]
        first: Coordinate,

        /// Second coordinate as LAT,LNG
        #[arg(allow_hyphen_values = true)]
        second: Coordinate,

        #[arg(long)]
        first_district: Option<String>,

        #[arg(long)]
        second_district: Option<String>,

        #[arg(long)]
        first_persona: Option<String>,

        #[arg(long)]
        second_persona: Option<String>,
    },
    /// List personas and their category weights
    Personas,
    /// Create a config file interactively
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Manage the district statistics cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Delete all cached statistics
    Clear,
}

#[derive(Parser, Debug)]
#[command(name = "lifequal")]
#[command(about = "Quality-of-Life scores for addresses", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lifequal/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bypass the district statistics cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Build the configured data source. Errors carry the exit code to use.
fn build_source(config: &Config, no_cache: bool) -> Result<Box<dyn DataSource>, (i32, anyhow::Error)> {
    let source_config = config.source();
    let kind = source_config.kind().map_err(|e| (EXIT_CONFIG, e))?;

    match kind {
        SourceKind::Dataset(path) => {
            let dataset = Dataset::load(&path).map_err(|e| (EXIT_SOURCE, e))?;
            Ok(Box::new(dataset))
        }
        SourceKind::Api(url) => {
            let timeout = source_config.timeout().map_err(|e| (EXIT_CONFIG, e))?;
            let ttl = source_config.cache_ttl().map_err(|e| (EXIT_CONFIG, e))?;
            let cache = StatsCache::new(CacheConfig {
                enabled: !no_cache,
                ttl,
                ..Default::default()
            });
            tracing::info!(
                "Using API at {} (cache {})",
                url,
                if no_cache { "disabled (--no-cache)" } else { "enabled" }
            );
            let source = HttpSource::new(&url, timeout, cache).map_err(|e| (EXIT_CONFIG, e))?;
            Ok(Box::new(source))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match lifequal::output::format_json(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_PIPELINE);
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    lifequal::logging::init(cli.verbose);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Commands that do not need a loaded config
    match &cli.command {
        Commands::Init { force } => {
            if let Err(e) = lifequal::config::run_init_wizard(config_path, *force) {
                eprintln!("Init failed: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Cache {
            action: CacheCommand::Clear,
        } => {
            let path = lifequal::source::get_cache_path();
            if let Err(e) = lifequal::source::clear_cache(&path) {
                eprintln!("Failed to clear cache: {}", e);
                std::process::exit(EXIT_PIPELINE);
            }
            println!("Cache cleared ({})", path.display());
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match lifequal::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.scoring();
    if let Err(errors) = lifequal::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = lifequal::output::should_use_colors();

    match cli.command {
        Commands::Personas => {
            println!("{}", lifequal::output::format_personas(&scoring, use_colors));
        }
        Commands::Score {
            coordinate,
            district,
            persona,
        } => {
            let source = match build_source(&config, cli.no_cache) {
                Ok(s) => s,
                Err((code, e)) => {
                    eprintln!("Data source error: {:#}", e);
                    std::process::exit(code);
                }
            };
            let query = AddressQuery {
                coordinate,
                district,
                persona: persona.unwrap_or_else(|| config.default_persona().to_string()),
            };

            let report = match lifequal::score_address(source.as_ref(), &query, &scoring).await {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    if query.district.is_none() {
                        eprintln!("Pass the district with --district.");
                    }
                    std::process::exit(EXIT_PIPELINE);
                }
            };

            match cli.format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Text => {
                    println!("{}", lifequal::output::format_report(&report, use_colors))
                }
            }
        }
        Commands::Compare {
            first,
            second,
            first_district,
            second_district,
            first_persona,
            second_persona,
        } => {
            let source = match build_source(&config, cli.no_cache) {
                Ok(s) => s,
                Err((code, e)) => {
                    eprintln!("Data source error: {:#}", e);
                    std::process::exit(code);
                }
            };
            let default_persona = config.default_persona().to_string();
            let first = AddressQuery {
                coordinate: first,
                district: first_district,
                persona: first_persona.unwrap_or_else(|| default_persona.clone()),
            };
            let second = AddressQuery {
                coordinate: second,
                district: second_district,
                persona: second_persona.unwrap_or(default_persona),
            };

            let result = lifequal::compare(source.as_ref(), &first, &second, &scoring).await;

            match cli.format {
                OutputFormat::Json => print_json(&result),
                OutputFormat::Text => {
                    println!("{}", lifequal::output::format_comparison(&result, use_colors))
                }
            }

            let failed = [&result.first, &result.second]
                .iter()
                .any(|o| matches!(o, AddressOutcome::Failed { .. }));
            if failed {
                std::process::exit(EXIT_PIPELINE);
            }
        }
        Commands::Init { .. } | Commands::Cache { .. } => {}
    }

    tracing::info!("Done in {:?}", start_time.elapsed());
    std::process::exit(EXIT_SUCCESS);
}
