use serde::Deserialize;

use crate::error::ServerError;

/// Recognized configuration keys (spec.md §6), loadable from a TOML file
/// with environment variables taking precedence over file values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,

    pub auth_enabled: bool,
    pub api_token: String,
    pub token_binding_enabled: bool,

    pub credentials_strict: bool,
    pub validate_strict: bool,
    pub network_gating: bool,
    pub token_hardening: bool,

    pub database_path: String,
    pub vault_master_key: String,

    pub log_level: String,
    pub json_logging: bool,

    pub cors_origins: Vec<String>,

    pub rate_limit_per_minute: Option<i64>,
    pub rate_limit_per_hour: Option<i64>,
    pub default_clawdbot_credential_id: Option<String>,
    pub clawdbot_base_url: Option<String>,

    /// Root directory the `filesystem` connector is sandboxed to.
    pub filesystem_sandbox_root: String,
    /// Base URL of the `search` connector's downstream endpoint, if wired up.
    pub search_endpoint: Option<String>,

    /// Disables the production-mode startup refusals (spec.md §6 "Startup
    /// config validation"). Never set this in a real deployment.
    pub dev_mode: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            auth_enabled: true,
            api_token: "changeme".to_owned(),
            token_binding_enabled: false,
            credentials_strict: false,
            validate_strict: true,
            network_gating: false,
            token_hardening: true,
            database_path: "edon.db".to_owned(),
            vault_master_key: String::new(),
            log_level: "info".to_owned(),
            json_logging: false,
            cors_origins: Vec::new(),
            rate_limit_per_minute: None,
            rate_limit_per_hour: None,
            default_clawdbot_credential_id: None,
            clawdbot_base_url: None,
            filesystem_sandbox_root: "./sandbox".to_owned(),
            search_endpoint: None,
            dev_mode: false,
        }
    }
}

impl GatewayConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    /// Mirrors the absence-means-defaults behavior used for every other
    /// configuration surface in this gateway.
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let mut config = if std::path::Path::new(path).exists() {
            let contents =
                std::fs::read_to_string(path).map_err(|e| ServerError::Config(format!("reading {path}: {e}")))?;
            toml::from_str(&contents).map_err(|e| ServerError::Config(format!("parsing {path}: {e}")))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HOST") {
            self.host = v;
        }
        if let Some(v) = std::env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            self.port = v;
        }
        apply_bool_env(&mut self.auth_enabled, "AUTH_ENABLED");
        if let Ok(v) = std::env::var("API_TOKEN") {
            self.api_token = v;
        }
        apply_bool_env(&mut self.token_binding_enabled, "TOKEN_BINDING_ENABLED");
        apply_bool_env(&mut self.credentials_strict, "CREDENTIALS_STRICT");
        apply_bool_env(&mut self.validate_strict, "VALIDATE_STRICT");
        apply_bool_env(&mut self.network_gating, "NETWORK_GATING");
        apply_bool_env(&mut self.token_hardening, "TOKEN_HARDENING");
        if let Ok(v) = std::env::var("DATABASE_PATH") {
            self.database_path = v;
        }
        if let Ok(v) = std::env::var("VAULT_MASTER_KEY") {
            self.vault_master_key = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            self.log_level = v;
        }
        apply_bool_env(&mut self.json_logging, "JSON_LOGGING");
        if let Ok(v) = std::env::var("CORS_ORIGINS") {
            self.cors_origins = v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect();
        }
        if let Some(v) = std::env::var("RATE_LIMIT_PER_MINUTE").ok().and_then(|v| v.parse().ok()) {
            self.rate_limit_per_minute = Some(v);
        }
        if let Some(v) = std::env::var("RATE_LIMIT_PER_HOUR").ok().and_then(|v| v.parse().ok()) {
            self.rate_limit_per_hour = Some(v);
        }
        if let Ok(v) = std::env::var("DEFAULT_CLAWDBOT_CREDENTIAL_ID") {
            self.default_clawdbot_credential_id = Some(v);
        }
        if let Ok(v) = std::env::var("CLAWDBOT_BASE_URL") {
            self.clawdbot_base_url = Some(v);
        }
        if let Ok(v) = std::env::var("FILESYSTEM_SANDBOX_ROOT") {
            self.filesystem_sandbox_root = v;
        }
        if let Ok(v) = std::env::var("SEARCH_ENDPOINT") {
            self.search_endpoint = Some(v);
        }
        apply_bool_env(&mut self.dev_mode, "DEV_MODE");
    }

    /// Startup config validation (spec.md §6): in production, refuse to
    /// start rather than merely warn. Returns the warnings that don't rise
    /// to that level.
    pub fn validate_for_startup(&self) -> Result<Vec<String>, ServerError> {
        let mut warnings = Vec::new();
        let production = !self.dev_mode;

        if self.api_token == "changeme" {
            if production {
                return Err(ServerError::Config(
                    "API_TOKEN is set to the default value; refusing to start in production".into(),
                ));
            }
            warnings.push("API_TOKEN is set to the default value".to_owned());
        }

        let cors_wildcard = self.cors_origins.iter().any(|o| o == "*");
        if cors_wildcard {
            if production {
                return Err(ServerError::Config(
                    "CORS_ORIGINS is wildcard; refusing to start in production".into(),
                ));
            }
            warnings.push("CORS_ORIGINS is wildcard".to_owned());
        }

        if self.token_hardening && !self.credentials_strict {
            if production {
                return Err(ServerError::Config(
                    "TOKEN_HARDENING is on while CREDENTIALS_STRICT is off; refusing to start in production".into(),
                ));
            }
            warnings.push("TOKEN_HARDENING is on while CREDENTIALS_STRICT is off".to_owned());
        }

        Ok(warnings)
    }

    #[must_use]
    pub fn store_config(&self) -> edon_store::StoreConfig {
        edon_store::StoreConfig {
            database_path: self.database_path.clone(),
            pool_size: 5,
        }
    }
}

fn apply_bool_env(field: &mut bool, key: &str) {
    if let Ok(v) = std::env::var(key) {
        match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => *field = true,
            "false" | "0" | "no" => *field = false,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_non_production_safe_with_dev_mode() {
        let mut config = GatewayConfig::default();
        config.dev_mode = true;
        let warnings = config.validate_for_startup().unwrap();
        assert!(!warnings.is_empty());
    }

    #[test]
    fn production_default_token_refuses_to_start() {
        let config = GatewayConfig::default();
        assert!(config.validate_for_startup().is_err());
    }

    #[test]
    fn production_with_hardened_config_starts_clean() {
        let config = GatewayConfig {
            api_token: "a-real-secret".into(),
            cors_origins: vec!["https://app.example.com".into()],
            token_hardening: true,
            credentials_strict: true,
            ..GatewayConfig::default()
        };
        let warnings = config.validate_for_startup().unwrap();
        assert!(warnings.is_empty());
    }
}
