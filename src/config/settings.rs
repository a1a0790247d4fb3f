use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub lookup: LookupSettings,
    pub export: ExportSettings,
    #[serde(default)]
    pub operator: OperatorSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    pub currency_symbol: String,
    /// Offset applied to server timestamps that carry no zone (e.g. "+02:00")
    pub utc_offset: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: "MT".to_string(),
            utc_offset: "+02:00".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RefreshSettings {
    pub poll_interval_secs: u64,
    pub max_backoff_secs: u64,
    pub jitter_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
            max_backoff_secs: 300,
            jitter_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LookupSettings {
    pub debounce_ms: u64,
    pub search_debounce_ms: u64,
    pub max_suggestions: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            search_debounce_ms: 250,
            max_suggestions: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportSettings {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OperatorSettings {
    /// Sent along with debt payments; the server decides what to do with it
    #[serde(default)]
    pub user_id: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}
