//! Player preferences
//!
//! Nothing is persisted: settings come from an optional inline JSON block in
//! the page and from URL query overrides, so a reload keeps them.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Raindrops spawned per explosion
    pub fn raindrops(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 100,
            QualityPreset::High => 160,
        }
    }
}

/// Preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
    /// Reduced motion (no lightning flash, no balloon pulse)
    pub reduced_motion: bool,
    /// Give up on slow assets after this long (ms). Off unless configured.
    pub preload_timeout_ms: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            master_volume: 1.0,
            muted: false,
            reduced_motion: false,
            preload_timeout_ms: None,
        }
    }
}

impl Settings {
    /// Parse the inline JSON settings block. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        Ok(settings)
    }

    /// Apply `?key=value&...` overrides. Unknown keys and bad values are skipped.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
            match key {
                "quality" => {
                    if let Some(q) = QualityPreset::from_str(value) {
                        self.quality = q;
                    }
                }
                "volume" => {
                    if let Ok(v) = value.parse::<f32>() {
                        self.master_volume = v.clamp(0.0, 1.0);
                    }
                }
                "muted" => self.muted = parse_flag(value),
                "reduced_motion" => self.reduced_motion = parse_flag(value),
                "timeout" => {
                    if let Ok(ms) = value.parse::<u32>() {
                        self.preload_timeout_ms = Some(ms);
                    }
                }
                _ => log::debug!("Unknown setting '{}'", key),
            }
        }
    }

    /// Raindrop count for the current preset
    pub fn raindrops(&self) -> usize {
        self.quality.raindrops()
    }

    /// Whether the lightning flash is drawn
    pub fn lightning_enabled(&self) -> bool {
        !self.reduced_motion
    }

    /// Load from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let mut settings = window
            .document()
            .and_then(|d| d.get_element_by_id("settings"))
            .and_then(|el| el.text_content())
            .map(|json| match Self::from_json(&json) {
                Ok(s) => {
                    log::info!("Loaded inline settings");
                    s
                }
                Err(e) => {
                    log::warn!("Bad inline settings, using defaults: {}", e);
                    Self::default()
                }
            })
            .unwrap_or_default();

        if let Ok(query) = window.location().search() {
            settings.apply_query(&query);
        }
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page() {
        let s = Settings::default();
        assert_eq!(s.raindrops(), 100);
        assert_eq!(s.master_volume, 1.0);
        assert!(s.lightning_enabled());
        assert_eq!(s.preload_timeout_ms, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "quality": "low", "master_volume": 3.0 }"#).unwrap();
        assert_eq!(s.quality, QualityPreset::Low);
        assert_eq!(s.master_volume, 1.0);
        assert_eq!(s.preload_timeout_ms, None);

        assert!(Settings::from_json("{ nope").is_err());
    }

    #[test]
    fn test_query_overrides() {
        let mut s = Settings::default();
        s.apply_query("?quality=HIGH&muted&volume=0.25&reduced_motion=0&timeout=8000&x=y");
        assert_eq!(s.quality, QualityPreset::High);
        assert!(s.muted);
        assert_eq!(s.master_volume, 0.25);
        assert!(!s.reduced_motion);
        assert_eq!(s.preload_timeout_ms, Some(8000));
    }

    #[test]
    fn test_query_bad_values_ignored() {
        let mut s = Settings::default();
        s.apply_query("quality=ultra&volume=loud&timeout=-1");
        assert_eq!(s, Settings::default());
    }
}
