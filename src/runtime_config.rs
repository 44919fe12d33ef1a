// =============================================================================
// Runtime Configuration — dashboard settings
// =============================================================================
//
// Instruments, refresh cadence, news feed, chart widget and engine tunables
// all live here. Loaded from JSON at startup; every field carries a serde
// default so a partial (or empty) file still loads.
//
// The service only ever reads the file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::EngineConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_primary_symbol() -> String {
    "XAUUSD=X".to_string()
}

fn default_fallback_symbol() -> String {
    "GC=F".to_string()
}

fn default_history_range() -> String {
    "1mo".to_string()
}

fn default_bar_interval() -> String {
    "1h".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    180
}

fn default_news_feed_url() -> String {
    "https://news.google.com/rss/search?q=gold+OR+XAUUSD+OR+Gold+price&hl=en-US&gl=US&ceid=US:en"
        .to_string()
}

fn default_news_limit() -> usize {
    6
}

fn default_chart_widget_symbol() -> String {
    "OANDA:XAUUSD".to_string()
}

const CHART_WIDGET_BASE: &str = "https://s.tradingview.com/widgetembed/";

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the dashboard service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Market data ---------------------------------------------------------

    /// Instrument queried first (spot).
    #[serde(default = "default_primary_symbol")]
    pub primary_symbol: String,

    /// Instrument queried once if the primary has no data (futures).
    #[serde(default = "default_fallback_symbol")]
    pub fallback_symbol: String,

    /// History window requested from the provider, e.g. "1mo".
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Sampling cadence requested from the provider, e.g. "1h".
    #[serde(default = "default_bar_interval")]
    pub bar_interval: String,

    // --- Refresh -------------------------------------------------------------

    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    // --- News ----------------------------------------------------------------

    #[serde(default = "default_news_feed_url")]
    pub news_feed_url: String,

    /// Maximum headlines shown.
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,

    // --- Presentation ----------------------------------------------------------

    /// TradingView symbol for the embedded chart widget.
    #[serde(default = "default_chart_widget_symbol")]
    pub chart_widget_symbol: String,

    // --- Engine ----------------------------------------------------------------

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            primary_symbol: default_primary_symbol(),
            fallback_symbol: default_fallback_symbol(),
            history_range: default_history_range(),
            bar_interval: default_bar_interval(),
            refresh_interval_secs: default_refresh_interval_secs(),
            news_feed_url: default_news_feed_url(),
            news_limit: default_news_limit(),
            chart_widget_symbol: default_chart_widget_symbol(),
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path` and validate it.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            primary = %config.primary_symbol,
            fallback = %config.fallback_symbol,
            refresh_secs = config.refresh_interval_secs,
            rsi_style = %config.engine.rsi_style,
            "runtime config loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be > 0");
        }
        if self.primary_symbol.trim().is_empty() || self.fallback_symbol.trim().is_empty() {
            anyhow::bail!("primary and fallback symbols must be non-empty");
        }
        self.engine.validate()
    }

    /// Apply `GOLD_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(sym) = non_empty("GOLD_PRIMARY_SYMBOL") {
            self.primary_symbol = sym;
        }
        if let Some(sym) = non_empty("GOLD_FALLBACK_SYMBOL") {
            self.fallback_symbol = sym;
        }
        if let Some(secs) = non_empty("GOLD_REFRESH_SECS").and_then(|v| v.parse::<u64>().ok()) {
            if secs > 0 {
                self.refresh_interval_secs = secs;
            }
        }
    }

    /// URL of the embedded TradingView chart for `chart_widget_symbol`.
    pub fn chart_widget_url(&self) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            CHART_WIDGET_BASE,
            &[
                ("frameElementId", "tradingview_gold"),
                ("symbol", self.chart_widget_symbol.as_str()),
                ("interval", "60"),
                ("theme", "dark"),
                ("style", "1"),
                ("locale", "en"),
            ],
        )
        .context("failed to build chart widget URL")?;
        Ok(url.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RsiStyle;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.primary_symbol, "XAUUSD=X");
        assert_eq!(cfg.fallback_symbol, "GC=F");
        assert_eq!(cfg.history_range, "1mo");
        assert_eq!(cfg.bar_interval, "1h");
        assert_eq!(cfg.refresh_interval_secs, 180);
        assert_eq!(cfg.news_limit, 6);
        assert_eq!(cfg.engine.rsi_period, 14);
        assert_eq!(cfg.engine.rsi_style, RsiStyle::SimpleAverage);
        assert!((cfg.engine.rsi_thresholds.oversold - 30.0).abs() < f64::EPSILON);
        assert!((cfg.engine.rsi_thresholds.overbought - 70.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "refresh_interval_secs": 30,
            "engine": { "rsi_style": "zero_change_excluded", "trend_votes": false }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.engine.rsi_style, RsiStyle::ZeroChangeExcluded);
        assert!(!cfg.engine.trend_votes);
        assert_eq!(cfg.engine.macd_slow, 26);
        assert_eq!(cfg.primary_symbol, "XAUUSD=X");
    }

    #[test]
    fn zero_refresh_interval_is_invalid() {
        let cfg = RuntimeConfig {
            refresh_interval_secs: 0,
            ..RuntimeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("aurum-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_reads_file() {
        let dir = scratch_dir();
        let path = dir.join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.news_limit = 5;
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_file_fails_and_is_left_untouched() {
        let dir = scratch_dir();
        let path = dir.join("runtime_config.json");
        let original = r#"{ "refresh_interval_secs": 30, "#;
        std::fs::write(&path, original).unwrap();

        assert!(RuntimeConfig::load(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        // Only the user's file exists in the directory.
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RuntimeConfig::load("/nonexistent/runtime_config.json").is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("GOLD_PRIMARY_SYMBOL", "XAUEUR=X"),
            ("GOLD_REFRESH_SECS", "30"),
            ("GOLD_FALLBACK_SYMBOL", "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.primary_symbol, "XAUEUR=X");
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.fallback_symbol, "GC=F");
    }

    #[test]
    fn chart_widget_url_encodes_symbol() {
        let url = RuntimeConfig::default().chart_widget_url().unwrap();
        assert!(url.starts_with("https://s.tradingview.com/widgetembed/?"));
        assert!(url.contains("symbol=OANDA%3AXAUUSD"));
        assert!(url.contains("theme=dark"));
    }
}
