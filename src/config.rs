use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use toml;
use tracing::{info, warn};

/// Configuration for the Cardsmith application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// API key for the OpenRouter chat-completion API
    ///
    /// Kept optional so the rest of the configuration can be built and
    /// inspected without credentials; the server refuses to start without it.
    pub openrouter_api_key: Option<String>,
    /// Base URL of the OpenRouter API
    pub openrouter_base_url: String,
    /// Model identifier passed to chat completions
    pub openrouter_model: String,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    /// Optional update for database URL
    #[serde(default)]
    pub database_url: Option<String>,
    /// Optional update for the server port
    #[serde(default)]
    pub port: Option<u16>,
    /// Optional update for the OpenRouter API key
    #[serde(default)]
    pub openrouter_api_key: Option<String>,
    /// Optional update for the OpenRouter base URL
    #[serde(default)]
    pub openrouter_base_url: Option<String>,
    /// Optional update for the OpenRouter model
    #[serde(default)]
    pub openrouter_model: Option<String>,
}

/// Command line arguments for the application
#[derive(Parser, Debug)]
#[clap(name = "cardsmith", about = "An AI-backed flashcard generation server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PORT")]
    pub port: Option<u16>,

    /// OpenRouter API key
    #[clap(long, env = "OPENROUTER_API_KEY")]
    pub openrouter_api_key: Option<String>,

    /// OpenRouter base URL
    #[clap(long, env = "OPENROUTER_BASE_URL")]
    pub openrouter_base_url: Option<String>,

    /// OpenRouter model identifier
    #[clap(long, env = "OPENROUTER_MODEL")]
    pub openrouter_model: Option<String>,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            port: update.port.unwrap_or(self.port),
            openrouter_api_key: update.openrouter_api_key.or(self.openrouter_api_key),
            openrouter_base_url: update.openrouter_base_url.unwrap_or(self.openrouter_base_url),
            openrouter_model: update.openrouter_model.unwrap_or(self.openrouter_model),
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("cardsmith.db".to_string(), |path| {
        path.join("cardsmith.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        port: 3000,
        openrouter_api_key: None,
        openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
        openrouter_model: "openai/gpt-4o-mini".to_string(),
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    // if the config path is None, return the default config
    if config_path.is_none() {
        return Ok(ConfigUpdate::default());
    }

    let config_path = config_path.unwrap();

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        port: args.port,
        openrouter_api_key: args.openrouter_api_key,
        openrouter_base_url: args.openrouter_base_url,
        openrouter_model: args.openrouter_model,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let mut config_path = match ProjectDirs::from("com", "cardsmith", "cardsmith") {
        Some(proj_dirs) => {
            let config_dir = proj_dirs.config_dir();
            let path = PathBuf::from(config_dir);
            Some(path)
        }
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    config_path = config_path.and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let base = base_config(config_path.clone());

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_path.map(|p| p.join("config.toml"))).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, port={}, base_url={}, model={}",
        config.database_url, config.port, config.openrouter_base_url, config.openrouter_model
    );

    config
}
