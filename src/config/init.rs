use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::schema::{Config, SourceConfig, SourceKind, DEFAULT_API_URL};
use super::{ensure_config_dir, get_config_path};
use crate::scoring::{Persona, ScoringConfig};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

fn validate_duration(s: &str) -> Result<(), String> {
    humantime::parse_duration(s)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn validate_persona(s: &str) -> Result<(), String> {
    if Persona::ALL.iter().any(|p| p.name().eq_ignore_ascii_case(s)) {
        Ok(())
    } else {
        let names: Vec<&str> = Persona::ALL.iter().map(|p| p.name()).collect();
        Err(format!("expected one of {}", names.join(", ")))
    }
}

/// Ask until `validate` accepts the answer.
fn prompt_validated(
    message: &str,
    default: &str,
    validate: impl Fn(&str) -> Result<(), String>,
) -> Result<String> {
    loop {
        let input = prompt_with_default(message, default)?;
        match validate(&input) {
            Ok(()) => return Ok(input),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

/// Serialize `config` to `path` atomically.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_config(path: &Path, config: &Config, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit()
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Run the interactive init wizard to create a config file.
///
/// If `path` is Some, the config is written there; otherwise to
/// ~/.config/lifequal/config.yaml.
pub fn run_init_wizard(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(p) => p,
        None => {
            ensure_config_dir()?;
            get_config_path()?
        }
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    println!();
    println!("LifeQual Configuration");
    println!("======================");
    println!();

    // 1. Data source
    println!("Scores are computed from a LifeQual API or from a static JSON dataset.");
    let use_dataset = prompt_yes_no("Use a local dataset file instead of the API?", false)?;
    let (api_url, dataset) = if use_dataset {
        let path = loop {
            let p = prompt("  Dataset path: ")?;
            if !p.is_empty() {
                break p;
            }
            println!("  Dataset path is required.");
        };
        (None, Some(PathBuf::from(path)))
    } else {
        let url = prompt_validated("API base URL", DEFAULT_API_URL, |s| {
            reqwest::Url::parse(s).map(|_| ()).map_err(|e| e.to_string())
        })?;
        (Some(url), None)
    };

    let timeout = prompt_validated("Request timeout", "10s", validate_duration)?;
    let cache_ttl = prompt_validated("Keep district statistics cached for", "24h", validate_duration)?;

    // 2. Persona
    println!();
    println!("Personas weight the six categories differently:");
    for persona in Persona::ALL {
        println!("  {}", persona.name());
    }
    let default_persona = prompt_validated("Default persona", "default", validate_persona)?;

    // 3. Scoring tables
    println!();
    let spell_out = prompt_yes_no(
        "Write the default scoring tables into the config so you can edit them?",
        false,
    )?;
    let scoring = if spell_out {
        Some(ScoringConfig::full_defaults())
    } else {
        None
    };

    let config = Config {
        source: Some(SourceConfig {
            api_url,
            dataset,
            timeout: Some(timeout),
            cache_ttl: Some(cache_ttl),
        }),
        default_persona: Some(default_persona.to_lowercase()),
        scoring,
    };
    write_config(&config_path, &config, force)?;

    println!();
    println!("Config written to {}", config_path.display());
    match config.source().kind()? {
        SourceKind::Api(_) => println!("Run `lifequal score LAT,LNG --district NAME` to get started."),
        SourceKind::Dataset(_) => println!("Run `lifequal score LAT,LNG` to get started."),
    }

    Ok(())
}
