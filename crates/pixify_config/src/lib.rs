use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod models;
pub use models::*;

/// Loads the application configuration.
///
/// Layering, lowest priority first: `config/default`, `config/{RUN_ENV}`,
/// then environment variables prefixed with `PIXIFY` (separator `__`, so
/// `PIXIFY__SERVER__PORT=8080` overrides `server.port`). Secrets are never
/// read from the config files; they stay in flat env vars (`JWT_SECRET`,
/// `GENERATION_API_KEY`, `PAYMENT_KEY_SECRET`) loaded by the crates that
/// need them.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "PIXIFY".to_string());

    let config_dir = find_config_dir();
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::with_name(default_path.to_str().unwrap_or("config/default")).required(false))
        .add_source(File::with_name(env_path.to_str().unwrap_or("config/debug")).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(raw_config)
}

/// Resolves the `config/` directory relative to the workspace root when run
/// via cargo, falling back to the process working directory in deployment.
fn find_config_dir() -> PathBuf {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        let manifest_dir = PathBuf::from(manifest_dir);
        for ancestor in manifest_dir.ancestors() {
            let candidate = ancestor.join("config");
            if candidate.is_dir() {
                return candidate;
            }
        }
    }
    PathBuf::from("config")
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The path can be overridden with `DOTENV_OVERRIDE`; otherwise `.env` in
/// the working directory is used. Loading happens at most once per process.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_config() {
        let json = r#"{ "server": { "host": "127.0.0.1", "port": 4000 } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 4000);
        assert!(!config.use_generation);
        assert!(!config.use_payment);
        assert!(config.generation.is_none());
    }

    #[test]
    fn generation_defaults_apply() {
        let json = r#"{ "api_url": "https://img.example/v1" }"#;
        let generation: GenerationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(generation.timeout_secs, 30);
        assert_eq!(generation.max_response_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn auth_defaults_apply() {
        let auth = AuthConfig::default();
        assert_eq!(auth.token_ttl_secs, 86_400);
    }
}
