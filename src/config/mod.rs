mod settings;

pub use settings::{
    ApiSettings, Config, DisplaySettings, ExportSettings, LookupSettings, OperatorSettings,
    RefreshSettings,
};

use crate::error::{BackofficeError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.backoffice/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "backoffice") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.backoffice/
    let home = dirs_home().ok_or_else(|| {
        BackofficeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".backoffice"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export directory; relative paths live under the config directory
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(BackofficeError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BackofficeError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| BackofficeError::ConfigParse { path, source: e })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8000/api"
timeout_secs = 10

[display]
currency_symbol = "MT"
utc_offset = "+02:00"     # applied to server timestamps without a zone

[refresh]
poll_interval_secs = 20   # 'debts watch' refresh cadence
max_backoff_secs = 300    # upper bound while the API keeps failing
jitter_ms = 0             # random extra delay added to each refresh

[lookup]
debounce_ms = 300         # product autocomplete
search_debounce_ms = 250  # debt search
max_suggestions = 10

[export]
output_dir = "exports"    # relative to this directory, or absolute / ~/...

[operator]
# user_id = "00000000-0000-0000-0000-000000000000"   # optional
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_defaults() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.refresh.poll_interval_secs, 20);
        assert_eq!(config.lookup.debounce_ms, 300);
        assert_eq!(config.lookup.max_suggestions, 10);
        assert_eq!(config.display.currency_symbol, "MT");
        assert!(config.operator.user_id.is_none());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let config = parse_config(
            r#"
[api]
base_url = "https://pos.example.com"

[export]
output_dir = "/tmp/out"
"#,
        )
        .unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.refresh.max_backoff_secs, 300);
        assert_eq!(config.lookup.search_debounce_ms, 250);
        assert_eq!(config.display.utc_offset, "+02:00");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
[api]
base_url = "https://pos.example.com"

[display]
currency_symbol = "USD"

[refresh]
poll_interval_secs = 30

[lookup]
max_suggestions = 5

[export]
output_dir = "/tmp/out"
"#,
        )
        .unwrap();
        assert_eq!(config.refresh.poll_interval_secs, 30);
        assert_eq!(config.refresh.max_backoff_secs, 300);
        assert_eq!(config.refresh.jitter_ms, 0);
        assert_eq!(config.display.currency_symbol, "USD");
        assert_eq!(config.display.utc_offset, "+02:00");
        assert_eq!(config.lookup.max_suggestions, 5);
        assert_eq!(config.lookup.debounce_ms, 300);
    }

    #[test]
    fn relative_output_dir_is_under_config_dir() {
        let cfg = Path::new("/etc/backoffice");
        assert_eq!(
            resolve_output_dir("exports", cfg),
            PathBuf::from("/etc/backoffice/exports")
        );
        assert_eq!(resolve_output_dir("/srv/out", cfg), PathBuf::from("/srv/out"));
    }
}
