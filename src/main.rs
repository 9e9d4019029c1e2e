use grepx::cli::{Cli, Commands, ConfigAction};
use grepx::config::{ConfigValidator, Settings, TomlFileStore};
use grepx::decoders::DecoderKind;
use grepx::error::{GrepxError, Result};
use grepx::extractor::Haystack;
use grepx::http::RawResponse;
use grepx::pipeline::{decode_candidate, Pipeline};
use std::io::Read;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Decode {
            files,
            decoder,
            body,
            json,
        } => {
            cmd_decode(cli.config, &files, decoder, body, json)?;
        }
        Commands::Transform {
            value,
            decoder,
            max_length,
        } => {
            cmd_transform(cli.config, &value, &decoder, max_length)?;
        }
        Commands::Decoders => {
            cmd_decoders();
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "grepx=debug" } else { "grepx=info" };
    let filter = EnvFilter::try_from_env("GREPX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_decode(
    config_path: Option<PathBuf>,
    files: &[PathBuf],
    decoder: Option<String>,
    body: bool,
    json: bool,
) -> Result<()> {
    let mut settings = load_settings(config_path)?;
    if let Some(name) = decoder {
        settings.decoder = name.parse()?;
    }
    if body {
        settings.search_body = true;
    }

    let inputs = if files.is_empty() {
        vec![("-".to_string(), read_stdin()?)]
    } else {
        files
            .iter()
            .map(|path| read_file(path).map(|raw| (path.display().to_string(), raw)))
            .collect::<Result<Vec<_>>>()?
    };

    let pipeline = Pipeline::new();
    let prefix = inputs.len() > 1;

    for (source, raw) in inputs {
        let response = RawResponse::parse(&raw);
        let body_text = response.body_text();
        let haystack = Haystack::from_response(&response.headers, &body_text, &settings);

        let Some(outcome) = pipeline.run(&haystack, &settings) else {
            tracing::info!("{}: nothing extracted", source);
            continue;
        };

        if json {
            let line = serde_json::json!({ "source": source, "outcome": outcome });
            println!("{}", line);
        } else if prefix {
            println!("{}: {}", source, outcome);
        } else {
            println!("{}", outcome);
        }
    }

    Ok(())
}

fn cmd_transform(
    config_path: Option<PathBuf>,
    value: &str,
    decoder: &str,
    max_length: Option<usize>,
) -> Result<()> {
    let decoder: DecoderKind = decoder.parse()?;
    let max_chars = match max_length {
        Some(n) => n,
        None => load_settings(config_path)?.max_output_length,
    };

    println!("{}", decode_candidate(value, decoder, max_chars));
    Ok(())
}

fn cmd_decoders() {
    for kind in DecoderKind::ALL {
        println!("{:<20} {}", kind.name(), kind.alias());
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let settings = load_settings(config_path)?;
            if json {
                let out = serde_json::to_string_pretty(&settings).map_err(|e| GrepxError::Json {
                    source: e,
                    context: "Failed to serialize settings".to_string(),
                })?;
                println!("{}", out);
            } else {
                for (key, value) in settings.to_pairs() {
                    println!("{:<12} {}", key, value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let path = settings_path(config_path)?;
            let mut store = TomlFileStore::open(&path)?;
            let mut settings = Settings::load(&store);
            settings.set(&key, &value)?;
            settings.save(&mut store)?;
            println!("✓ {} = {}", key, settings.get(&key).unwrap_or_default());
        }
        ConfigAction::Get { key } => {
            let settings = load_settings(config_path)?;
            let value = settings.get(&key).ok_or_else(|| GrepxError::InvalidConfigValue {
                path: key.clone(),
                message: "Unknown setting key".to_string(),
            })?;
            println!("{}", value);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => settings_path(config_path)?,
            };
            let store = TomlFileStore::open_existing(&path)?;
            let settings = Settings::load(&store);
            ConfigValidator::validate(&settings)?;
            println!("✓ Settings are valid");
            println!("  Mode: {:?}, decoder: {}", settings.mode, settings.decoder);
        }
        ConfigAction::Init { force } => {
            let path = settings_path(config_path)?;

            if path.exists() && !force {
                println!("Settings file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let mut store = TomlFileStore::open(&path)?;
            Settings::default().save(&mut store)?;
            println!("✓ Settings initialized at: {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", settings_path(config_path)?.display());
        }
    }

    Ok(())
}

fn settings_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Settings::default_path(),
    }
}

fn load_settings(config_path: Option<PathBuf>) -> Result<Settings> {
    let path = settings_path(config_path)?;

    let mut settings = if path.exists() {
        Settings::load(&TomlFileStore::open(&path)?)
    } else {
        tracing::debug!(
            "Settings file not found, using defaults. Run 'grepx config init' to create one."
        );
        Settings::default()
    };

    settings.apply_env_overrides();
    Ok(settings)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| GrepxError::Io {
        source: e,
        context: format!("Failed to read response file: {:?}", path),
    })
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    std::io::stdin()
        .read_to_end(&mut raw)
        .map_err(|e| GrepxError::Io {
            source: e,
            context: "Failed to read response from stdin".to_string(),
        })?;
    Ok(raw)
}
