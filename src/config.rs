//! Application configuration.
//!
//! Loaded once from config.json (next to the executable unless a path is
//! given). Every field is optional; anything missing takes its default, and
//! an unreadable file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::draw::web::{DEFAULT_FIRST_PRIZE, DEFAULT_SECOND_PRIZE, DEFAULT_URL_TEMPLATE};
use crate::draw::PrizeTable;
use crate::log;
use crate::ticket::extract::{DEFAULT_MAX_FRONT_NUMBERS, DEFAULT_SUPPLEMENTARY_MARKERS};
use crate::ticket::ExtractRules;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Result page URL, `{period}` is replaced with the draw period
    pub draw_url_template: String,
    /// HTTP timeout for result fetches
    pub fetch_timeout_secs: u64,
    /// First-tier amount used when the result page doesn't show one
    pub fallback_first_prize: u64,
    /// Second-tier amount used when the result page doesn't show one
    pub fallback_second_prize: u64,
    /// Largest compound front-zone selection accepted from a ticket
    pub max_front_numbers: usize,
    /// Ticket keywords meaning the supplementary stake was bought
    pub supplementary_markers: Vec<String>,
    /// Tesseract language list, `+`-separated
    pub ocr_languages: String,
    /// Luminance below this counts as ink when binarizing ticket photos
    pub ocr_threshold: u8,
    /// Explicit tesseract executable; searched for when unset
    pub tesseract_path: Option<PathBuf>,
    /// Keep fetched results on disk between runs
    pub cache_draws: bool,
    /// Worker threads for batch checking
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            draw_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            fetch_timeout_secs: 10,
            fallback_first_prize: DEFAULT_FIRST_PRIZE,
            fallback_second_prize: DEFAULT_SECOND_PRIZE,
            max_front_numbers: DEFAULT_MAX_FRONT_NUMBERS,
            supplementary_markers: DEFAULT_SUPPLEMENTARY_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            ocr_languages: "chi_sim+eng".to_string(),
            ocr_threshold: 150,
            tesseract_path: None,
            cache_draws: true,
            workers: 4,
        }
    }
}

impl AppConfig {
    pub fn extract_rules(&self) -> ExtractRules {
        ExtractRules {
            max_front_numbers: self.max_front_numbers,
            supplementary_markers: self.supplementary_markers.clone(),
        }
    }

    pub fn fallback_prizes(&self) -> PrizeTable {
        PrizeTable::fallback(self.fallback_first_prize, self.fallback_second_prize)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

/// Loads configuration from `path` or returns defaults.
pub fn load_config(path: &Path) -> AppConfig {
    log(&format!("Looking for config at: {}", path.display()));

    if !path.exists() {
        log("config.json not found. Using default config.");
        return AppConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log("Config loaded from config.json");
                config
            }
            Err(e) => {
                log(&format!(
                    "Failed to parse config.json: {}. Using defaults.",
                    e
                ));
                AppConfig::default()
            }
        },
        Err(e) => {
            log(&format!(
                "Failed to read config.json: {}. Using defaults.",
                e
            ));
            AppConfig::default()
        }
    }
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(path: Option<&Path>) {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(crate::paths::get_config_path);
    let _ = CONFIG.set(load_config(&path));
}

/// Returns the global configuration, loading the default file on first use.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| load_config(&crate::paths::get_config_path()))
}
