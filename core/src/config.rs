//! Configuration Module
//!
//! Handles loading configuration from:
//! 1. $SHADE_CONFIG (if set)
//! 2. ~/.shade/config.toml (if exists)
//! 3. ./config.toml
//! 4. Environment variables (override TOML values)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shade_account::AccountId;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use crate::ledger::{VerifierMode, VerifierSet};

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".shade";

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadeConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub roles: RolesConfig,
    #[serde(default)]
    pub features: FeatureFlags,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Keep all state in memory (nothing survives a restart)
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            in_memory: false,
        }
    }
}

fn default_db_path() -> String {
    "./shade-db".to_string()
}

/// Proof verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// "dummy" or "groth16" (default: "dummy")
    #[serde(default)]
    pub mode: VerifierMode,
    /// Compressed arkworks verifying key for the balance shift circuit
    #[serde(default)]
    pub balance_shift_vk: Option<String>,
    /// Compressed arkworks verifying key for the commitment transition circuit
    #[serde(default)]
    pub commitment_transition_vk: Option<String>,
    #[serde(default = "default_verify_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            mode: VerifierMode::Dummy,
            balance_shift_vk: None,
            commitment_transition_vk: None,
            timeout_ms: default_verify_timeout_ms(),
        }
    }
}

fn default_verify_timeout_ms() -> u64 {
    30_000
}

impl VerifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn build(&self) -> Result<VerifierSet> {
        match self.mode {
            VerifierMode::Dummy => {
                log::warn!("Dummy verifier enabled: every proof is accepted");
                Ok(VerifierSet::dummy())
            }
            VerifierMode::Groth16 => {
                let a = self
                    .balance_shift_vk
                    .as_deref()
                    .context("verifier.balance_shift_vk is required in groth16 mode")?;
                let b = self
                    .commitment_transition_vk
                    .as_deref()
                    .context("verifier.commitment_transition_vk is required in groth16 mode")?;
                VerifierSet::groth16(a, b)
            }
        }
    }
}

/// Privileged identities (hex account ids)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolesConfig {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub burn_controller: Option<String>,
    #[serde(default)]
    pub mint_controller: Option<String>,
}

/// Parsed [`RolesConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleIdentities {
    pub owner: AccountId,
    pub burn_controller: Option<AccountId>,
    pub mint_controller: Option<AccountId>,
}

impl RolesConfig {
    pub fn parse(&self) -> Result<RoleIdentities> {
        let owner = self.owner.as_deref().context("roles.owner must be set")?;
        Ok(RoleIdentities {
            owner: parse_account("roles.owner", owner)?,
            burn_controller: self
                .burn_controller
                .as_deref()
                .map(|s| parse_account("roles.burn_controller", s))
                .transpose()?,
            mint_controller: self
                .mint_controller
                .as_deref()
                .map(|s| parse_account("roles.mint_controller", s))
                .transpose()?,
        })
    }
}

fn parse_account(field: &str, value: &str) -> Result<AccountId> {
    value
        .parse()
        .with_context(|| format!("{} is not a valid account id: {}", field, value))
}

/// Feature flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Expose the owner-only /bootstrap endpoint
    #[serde(default)]
    pub admin_api: bool,
}

impl ShadeConfig {
    /// Load configuration with env var overrides
    pub fn load() -> Result<Self> {
        // Start with defaults
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            log::info!("Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            config = toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?;
        } else {
            log::info!("No config file found, using defaults and environment variables");
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check SHADE_CONFIG env var
        if let Ok(path) = env::var("SHADE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check ~/.shade/config.toml
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. Check ./config.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Database
        if let Ok(v) = env::var("SHADE_DB_PATH") {
            self.database.path = v;
        }
        if let Ok(v) = env::var("SHADE_IN_MEMORY") {
            self.database.in_memory = is_truthy(&v);
        }

        // API
        if let Ok(v) = env::var("SHADE_API_HOST") {
            self.api.host = v;
        }
        if let Ok(v) = env::var("SHADE_API_PORT") {
            if let Ok(port) = v.parse() {
                self.api.port = port;
            }
        }

        // Verifier
        if let Ok(v) = env::var("SHADE_VERIFIER_MODE") {
            match v.to_lowercase().as_str() {
                "dummy" => self.verifier.mode = VerifierMode::Dummy,
                "groth16" => self.verifier.mode = VerifierMode::Groth16,
                _ => log::warn!("Ignoring unknown SHADE_VERIFIER_MODE: {}", v),
            }
        }
        if let Ok(v) = env::var("SHADE_VK_BALANCE_SHIFT") {
            self.verifier.balance_shift_vk = Some(v);
        }
        if let Ok(v) = env::var("SHADE_VK_COMMITMENT_TRANSITION") {
            self.verifier.commitment_transition_vk = Some(v);
        }
        if let Ok(v) = env::var("SHADE_VERIFY_TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.verifier.timeout_ms = ms;
            }
        }

        // Roles
        if let Ok(v) = env::var("SHADE_OWNER") {
            self.roles.owner = Some(v);
        }
        if let Ok(v) = env::var("SHADE_BURN_CONTROLLER") {
            self.roles.burn_controller = Some(v);
        }
        if let Ok(v) = env::var("SHADE_MINT_CONTROLLER") {
            self.roles.mint_controller = Some(v);
        }

        // Features
        if let Ok(v) = env::var("SHADE_ADMIN_API") {
            self.features.admin_api = is_truthy(&v);
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        let sample = Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: "./shade-db".to_string(),
                in_memory: false,
            },
            verifier: VerifierConfig {
                mode: VerifierMode::Dummy,
                balance_shift_vk: Some("./keys/balance_shift.vk".to_string()),
                commitment_transition_vk: Some("./keys/commitment_transition.vk".to_string()),
                timeout_ms: 30_000,
            },
            roles: RolesConfig {
                owner: Some(format!("0x{}", "01".repeat(32))),
                burn_controller: Some(format!("0x{}", "02".repeat(32))),
                mint_controller: Some(format!("0x{}", "03".repeat(32))),
            },
            features: FeatureFlags { admin_api: true },
        };

        toml::to_string_pretty(&sample).unwrap_or_default()
    }
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
