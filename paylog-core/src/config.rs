use crate::error::RecorderError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

/// Resolved recorder configuration. Precedence: CLI flag > environment
/// variable > default.
///
/// Environment variables: `PORT` for the port; `PAYLOAD_WINDOW` for the
/// window, with `MAX_LOGS` accepted as an alias (`PAYLOAD_WINDOW` wins
/// when both are set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of retained entries. Must be positive.
    #[serde(default = "default_window")]
    pub window: usize,
}

/// CLI-flag values layered on top of the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub window: Option<usize>,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_port() -> u16 {
    4105
}

fn default_window() -> usize {
    100
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            window: default_window(),
        }
    }
}

// ── Impls ─────────────────────────────────────────────────────

impl RecorderConfig {
    /// Resolve configuration from defaults + environment + flag
    /// overrides, then validate. Rejected values never reach the
    /// network layer.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, RecorderError> {
        let mut config: RecorderConfig = Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(&["PORT"]))
            .merge(Env::raw().only(&["MAX_LOGS"]).map(|_| "window".into()))
            .merge(Env::raw().only(&["PAYLOAD_WINDOW"]).map(|_| "window".into()))
            .extract()
            .map_err(|e| RecorderError::Config(e.to_string()))?;

        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(window) = overrides.window {
            config.window = window;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), RecorderError> {
        if self.window == 0 {
            return Err(RecorderError::Config(
                "window must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
