// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

use crate::mining::earnings::SESSION_CEILING_SECS;
use crate::mining::hashrate::{BASE_HASH_RATE, MAX_HASH_RATE};
use crate::mining::profile::AccountProfile;
use serde::Deserialize;
use sessionrpc::{SessionRpcConfig, WalletCredential};

#[derive(Debug, Deserialize, Clone)]
pub struct MiningConfig {
    /// Hash rate every account starts with, TH/s
    #[serde(default = "default_base_hash_rate")]
    pub base_hash_rate: f64,
    /// Cap on the current hash rate, TH/s
    #[serde(default = "default_max_hash_rate")]
    pub max_hash_rate: f64,
    /// A session completes on its own once it has run this long
    #[serde(default = "default_session_ceiling_secs")]
    pub session_ceiling_secs: u64,
    /// Period of the session timer tick
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            base_hash_rate: default_base_hash_rate(),
            max_hash_rate: default_max_hash_rate(),
            session_ceiling_secs: default_session_ceiling_secs(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

fn default_base_hash_rate() -> f64 {
    BASE_HASH_RATE
}

fn default_max_hash_rate() -> f64 {
    MAX_HASH_RATE
}

fn default_session_ceiling_secs() -> u64 {
    SESSION_CEILING_SECS
}

fn default_tick_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log to file if specified
    pub file: Option<String>,
    /// Log level (defaults to "info")
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log to console, on unless disabled
    pub console: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_log_level(),
            console: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub sessionrpc: SessionRpcConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    /// Pre-signed wallet credential, required for calls to the backend
    pub wallet: Option<WalletCredential>,
    #[serde(default)]
    pub profile: AccountProfile,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from a TOML file, then apply environment overrides.
    ///
    /// Sections nest with a double underscore so keys may contain single ones,
    /// e.g. `MINEPULSE_SESSIONRPC__ANON_KEY` or `MINEPULSE_MINING__TICK_INTERVAL_MS`.
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("MINEPULSE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn with_sessionrpc_url(mut self, url: String) -> Self {
        self.sessionrpc.url = url;
        self
    }

    pub fn with_anon_key(mut self, anon_key: String) -> Self {
        self.sessionrpc.anon_key = anon_key;
        self
    }

    pub fn with_wallet(mut self, wallet: WalletCredential) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_base_hash_rate(mut self, base_hash_rate: f64) -> Self {
        self.mining.base_hash_rate = base_hash_rate;
        self
    }

    pub fn with_max_hash_rate(mut self, max_hash_rate: f64) -> Self {
        self.mining.max_hash_rate = max_hash_rate;
        self
    }

    pub fn with_session_ceiling_secs(mut self, session_ceiling_secs: u64) -> Self {
        self.mining.session_ceiling_secs = session_ceiling_secs;
        self
    }

    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.mining.tick_interval_ms = tick_interval_ms;
        self
    }

    pub fn with_profile(mut self, profile: AccountProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_log_level(mut self, level: String) -> Self {
        self.logging.level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_env::{with_var, with_vars, with_vars_unset};

    #[test]
    fn test_config_load() {
        // Hold the env lock so the override test can't leak into this one
        let config = with_vars_unset(
            [
                "MINEPULSE_SESSIONRPC__URL",
                "MINEPULSE_SESSIONRPC__ANON_KEY",
                "MINEPULSE_MINING__SESSION_CEILING_SECS",
            ],
            || Config::load("../config.toml").unwrap(),
        );

        assert_eq!(
            config.sessionrpc.url,
            "https://example.supabase.co/functions/v1"
        );
        assert_eq!(config.mining.base_hash_rate, 12.0);
        assert_eq!(config.mining.max_hash_rate, 24.0);
        assert_eq!(config.mining.session_ceiling_secs, 86_400);
        assert_eq!(config.mining.tick_interval_ms, 1000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.profile.login_streak_days, 3);

        let wallet = config.wallet.unwrap();
        assert_eq!(wallet.address, "0x8ba1f109551bd432803012645ac136ddd64dba72");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::load("../config.toml").unwrap();
        let config = config
            .with_sessionrpc_url("http://localhost:54321/functions/v1".to_string())
            .with_anon_key("local-key".to_string())
            .with_base_hash_rate(10.0)
            .with_max_hash_rate(20.0)
            .with_session_ceiling_secs(3600)
            .with_tick_interval_ms(250)
            .with_profile(AccountProfile::default().with_referral_count(4))
            .with_log_level("debug".to_string());

        assert_eq!(config.sessionrpc.url, "http://localhost:54321/functions/v1");
        assert_eq!(config.sessionrpc.anon_key, "local-key");
        assert_eq!(config.mining.base_hash_rate, 10.0);
        assert_eq!(config.mining.max_hash_rate, 20.0);
        assert_eq!(config.mining.session_ceiling_secs, 3600);
        assert_eq!(config.mining.tick_interval_ms, 250);
        assert_eq!(config.profile.referral_count, 4);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_from_env_vars() {
        with_var(
            "MINEPULSE_SESSIONRPC__URL",
            Some("http://sessions-from-env:54321"),
            || {
                let config = Config::load("../config.toml").unwrap();
                assert_eq!(config.sessionrpc.url, "http://sessions-from-env:54321");
            },
        );
    }

    #[test]
    fn test_env_overrides_keys_with_underscores() {
        with_vars(
            [
                ("MINEPULSE_SESSIONRPC__ANON_KEY", Some("from-env")),
                ("MINEPULSE_MINING__SESSION_CEILING_SECS", Some("3600")),
            ],
            || {
                let config = Config::load("../config.toml").unwrap();
                assert_eq!(config.sessionrpc.anon_key, "from-env");
                assert_eq!(config.mining.session_ceiling_secs, 3600);
                // Untouched keys keep their file values
                assert_eq!(config.mining.base_hash_rate, 12.0);
            },
        );
    }

    #[test]
    fn test_mining_config_defaults() {
        let mining = MiningConfig::default();
        assert_eq!(mining.base_hash_rate, BASE_HASH_RATE);
        assert_eq!(mining.max_hash_rate, MAX_HASH_RATE);
        assert_eq!(mining.session_ceiling_secs, SESSION_CEILING_SECS);
    }
}
