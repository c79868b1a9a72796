//! Compiled-in settings for the page client and the cache worker.

/// Relationship label used when the input is left blank.
pub const FALLBACK_RELATIONSHIP: &str = "朋友";

/// Placeholder shown in the badge and question text while a question loads.
pub const LOADING_TEXT: &str = "載入中…";

/// Bump on every deployment that changes the static shell.
pub const CACHE_NAME: &str = "deepcard-v3";

pub const PRECACHE_ASSETS: &[&str] = &[
    "/",
    "/static/styles.css",
    "/static/app.js",
    "/static/manifest.json",
];

/// Attribute on `<body>` that overrides [`AppConfig::api_base`].
pub const API_BASE_ATTR: &str = "data-api-base";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Prefix joined to the endpoint paths; empty means same origin.
    pub api_base: String,
    pub start_path: String,
    pub question_path: String,
    pub fallback_relationship: String,
    pub loading_text: String,
    pub badge_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            start_path: "/api/start".into(),
            question_path: "/api/question".into(),
            fallback_relationship: FALLBACK_RELATIONSHIP.into(),
            loading_text: LOADING_TEXT.into(),
            badge_prefix: "LEVEL".into(),
        }
    }
}

impl AppConfig {
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub fn badge(&self, level: &str) -> String {
        format!("{} {}", self.badge_prefix, level)
    }
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub name: String,
    pub precache: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: CACHE_NAME.into(),
            precache: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn log_level() -> log::LevelFilter {
    if cfg!(feature = "debug_log") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
