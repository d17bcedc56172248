use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{
    ClientSettings, DatabaseSettings, LogFormat, LogSettings, ServerSettings, Settings,
};
pub use telemetry::init_tracing;

/// Shortcut variable that points the API at a specific database file. It wins
/// over every other source.
pub const DB_PATH_ENV: &str = "HEALTH_TRACKER_DB_PATH";
/// Names an explicit configuration file; when set, the file must exist.
pub const CONFIG_FILE_ENV: &str = "HEALTH_TRACKER_CONFIG";
/// Prefix for structured overrides such as `HEALTH_TRACKER_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "HEALTH_TRACKER";
/// Looked up in the working directory (any format `config` understands) when
/// no explicit file is named.
pub const DEFAULT_CONFIG_FILE: &str = "health-tracker";

/// Loads the application configuration from the process environment.
///
/// Precedence, highest first: `HEALTH_TRACKER_DB_PATH`, `HEALTH_TRACKER_*`
/// variables, the configuration file, built-in defaults.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let env: config::Map<String, String> = std::env::vars().collect();
    load_settings_from(env)
}

/// Same as [`load_settings`], but reads variables from `env` instead of the
/// process environment.
pub fn load_settings_from(env: config::Map<String, String>) -> Result<Settings, ConfigError> {
    let file_source = match env.get(CONFIG_FILE_ENV) {
        Some(path) => config::File::from(std::path::PathBuf::from(path)).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let db_path_override = env.get(DB_PATH_ENV).filter(|v| !v.is_empty()).cloned();

    let builder = config::Config::builder()
        .set_default("database.path", "healthtracker.db")?
        .set_default("database.max_connections", 5)?
        .set_default("database.connect_timeout_secs", 5)?
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 5000)?
        .set_default("server.request_timeout_secs", 10)?
        .set_default("client.base_url", "http://localhost:5000")?
        .set_default("client.timeout_secs", 5)?
        .set_default(
            "logging.filter",
            "health_tracker=info,web_server=info,database=info,api_client=info,tower_http=info",
        )?
        .set_default("logging.format", "pretty")?
        .add_source(file_source)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        )
        .set_override_option("database.path", db_path_override)?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
