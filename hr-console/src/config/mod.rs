use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Base URL of the HR REST API, including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout applied by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Route the navigator is sent to when the session is invalidated.
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_login_route() -> String {
    "/login".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// JSON file holding persisted tokens and the session snapshot.
    pub path: PathBuf,
    /// Key under which the session snapshot is written.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "auth-storage".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC endpoint (e.g. http://tempo:4317). Export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Allow running from the workspace root or from inside hr-console/
    let configuration_directory = if base_path.ends_with("hr-console") {
        base_path.join("config")
    } else {
        base_path.join("hr-console").join("config")
    };

    let settings = config::Config::builder()
        .set_default("api.base_url", "http://localhost:5007/api")?
        .set_default("storage.path", ".hr-console/session.json")?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
