use crate::error::Result;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const RC_FILE_NAME: &str = ".tagscriberc";

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    /// Language codes to use instead of the built-in fallback list.
    pub languages: Vec<String>,
    pub characters: Vec<String>,
    pub quiet_window_ms: u64,
    pub history_capacity: usize,
    pub gap_threshold_ms: u64,
    pub color: bool,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            characters: Vec::new(),
            quiet_window_ms: 500,
            history_capacity: 100,
            gap_threshold_ms: 5000,
            color: true,
        }
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .tagscriberc in:
    /// 1. Current directory
    /// 2. Home directory (~/.tagscriberc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(RC_FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(RC_FILE_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load the RC file if there is one, falling back to defaults.
    pub fn load_config() -> RcConfig {
        let Some(rc_path) = Self::get_rc_path() else {
            return RcConfig::default();
        };

        match Self::load_from(&rc_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %rc_path.display(), error = %err, "Ignoring unreadable config");
                RcConfig::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<RcConfig> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config = RcConfig::default();
        Self::parse_config_content(&content, &mut config);
        debug!(path = %path.as_ref().display(), "Loaded config");
        Ok(config)
    }

    fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        let setting = line.strip_prefix("set ").map_or(line, str::trim);

        match setting {
            "color" => config.color = true,
            "nocolor" => config.color = false,
            _ => {
                if let Some((key, value)) = setting.split_once('=') {
                    Self::apply_setting(key.trim(), value.trim(), config);
                }
            }
        }
    }

    fn apply_setting(key: &str, value: &str, config: &mut RcConfig) {
        match key {
            "languages" => config.languages = split_list(value, true),
            "characters" => config.characters = split_list(value, false),
            "quiet_window_ms" => {
                if let Some(ms) = parse_in_range(value, 1, 10_000) {
                    config.quiet_window_ms = ms;
                }
            }
            "history_capacity" => {
                if let Some(capacity) = parse_in_range(value, 1, 10_000) {
                    config.history_capacity = capacity as usize;
                }
            }
            "gap_threshold_ms" => {
                if let Ok(ms) = value.parse::<u64>() {
                    config.gap_threshold_ms = ms;
                }
            }
            "color" => match value {
                "true" | "1" | "yes" => config.color = true,
                "false" | "0" | "no" => config.color = false,
                _ => {} // Invalid value, ignore
            },
            _ => debug!(key, "Unknown config setting"),
        }
    }
}

fn parse_in_range(value: &str, min: u64, max: u64) -> Option<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| (min..=max).contains(n))
}

fn split_list(value: &str, lowercase: bool) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            if lowercase {
                item.to_lowercase()
            } else {
                item.to_string()
            }
        })
        .collect()
}
