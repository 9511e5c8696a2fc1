use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::style::Color;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const LOG_DIR: &str = "match_predictor";
const LOG_FILE: &str = "match_predictor.log";

/// Startup configuration. Built once in `main` and handed to the API client,
/// the page state and the renderer; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub results_page_size: u32,
    pub log_path: Option<PathBuf>,
    pub log_level: String,
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            results_page_size: 20,
            log_path: None,
            log_level: "info".to_string(),
            theme: Theme::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let api_base_url = env::var("MATCH_API_BASE_URL")
            .ok()
            .and_then(|val| normalize_base_url(&val))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("MATCH_API_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(1, 120);
        let results_page_size = env::var("RESULTS_PAGE_SIZE")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(20)
            .clamp(1, 100);
        let log_path = env::var("MATCH_PREDICTOR_LOG")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_log_path);
        let log_level = env::var("MATCH_PREDICTOR_LOG_LEVEL")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        let theme = if env::var_os("NO_COLOR").is_some() {
            Theme::monochrome()
        } else {
            Theme::default()
        };

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            results_page_size,
            log_path,
            log_level,
            theme,
        }
    }

    pub fn with_base_url(mut self, base: &str) -> Self {
        if let Some(url) = normalize_base_url(base) {
            self.api_base_url = url;
        }
        self
    }
}

/// Style tokens used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub selected_bg: Color,
    pub correct: Color,
    pub missed_draw: Color,
    pub wrong: Color,
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            error: Color::Red,
            selected_bg: Color::DarkGray,
            correct: Color::Green,
            missed_draw: Color::Rgb(255, 165, 0),
            wrong: Color::Red,
            highlight: Color::Yellow,
        }
    }
}

impl Theme {
    pub fn monochrome() -> Self {
        Self {
            accent: Color::Reset,
            muted: Color::Reset,
            error: Color::Reset,
            selected_bg: Color::Reset,
            correct: Color::Reset,
            missed_draw: Color::Reset,
            wrong: Color::Reset,
            highlight: Color::Reset,
        }
    }
}

pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_log_path() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_STATE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(LOG_DIR).join(LOG_FILE));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(LOG_DIR)
            .join(LOG_FILE),
    )
}
