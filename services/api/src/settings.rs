//! Service settings for the API service
//!
//! Defaults, then an optional `config.toml`, then environment variables
//! (`API_HOST`, `API_PORT`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_host: String,
    pub api_port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 3001)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_bind_address() {
        unsafe {
            std::env::remove_var("API_HOST");
            std::env::remove_var("API_PORT");
        }

        assert_eq!(Settings::new().unwrap().bind_address(), "0.0.0.0:3001");
    }

    #[test]
    #[serial]
    fn test_port_from_environment() {
        unsafe {
            std::env::set_var("API_PORT", "8081");
        }

        let settings = Settings::new().unwrap();
        assert_eq!(settings.api_port, 8081);

        unsafe {
            std::env::remove_var("API_PORT");
        }
    }
}
