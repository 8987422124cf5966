// tabdash-core/src/settings.rs
//! The persisted user settings document.
//!
//! Field names follow the stored JSON shape (camelCase), so documents written
//! by earlier releases keep loading.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Focus,
    #[default]
    Minimal,
    Info,
    Custom,
}

impl ThemeMode {
    pub fn next(self) -> Self {
        match self {
            Self::Focus => Self::Minimal,
            Self::Minimal => Self::Info,
            Self::Info => Self::Custom,
            Self::Custom => Self::Focus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Minimal => "minimal",
            Self::Info => "info",
            Self::Custom => "custom",
        }
    }
}

/// Percentage-of-viewport coordinates of a widget's anchor (its center)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One placed widget. `widget_type` references `WidgetManifest::id`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WidgetInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Map<String, serde_json::Value>>,
}

impl WidgetInstance {
    pub fn new(id: impl Into<String>, widget_type: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            enabled,
            position: None,
            settings: None,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperProvider {
    Unsplash,
    Pexels,
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WallpaperSource {
    pub provider: WallpaperProvider,
    pub keywords: Vec<String>,
    /// Minutes between wallpaper refreshes
    pub refresh_interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_mode: Option<bool>,
}

impl Default for WallpaperSource {
    fn default() -> Self {
        Self {
            provider: WallpaperProvider::Local,
            keywords: vec!["minimal".to_string()],
            refresh_interval: 60,
            random_mode: Some(true),
        }
    }
}

/// Partial update for `WallpaperSource`; `None` fields keep their value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallpaperPatch {
    pub provider: Option<WallpaperProvider>,
    pub keywords: Option<Vec<String>>,
    pub refresh_interval: Option<u32>,
    pub random_mode: Option<bool>,
}

impl WallpaperSource {
    pub fn apply(&mut self, patch: WallpaperPatch) {
        if let Some(provider) = patch.provider {
            self.provider = provider;
        }
        if let Some(keywords) = patch.keywords {
            self.keywords = keywords;
        }
        if let Some(interval) = patch.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(random) = patch.random_mode {
            self.random_mode = Some(random);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ClockFormat {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStyle {
    #[default]
    Digital,
    Analog,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockSettings {
    pub format: ClockFormat,
    pub show_seconds: bool,
    pub style: ClockStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    Bing,
    Duckduckgo,
    Baidu,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    pub engine: SearchEngine,
    pub show_suggestions: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engine: SearchEngine::Google,
            show_suggestions: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub unit: TemperatureUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownSettings {
    pub target_date: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Self::En => Self::Zh,
            Self::Zh => Self::En,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    #[default]
    Builtin,
    Favicon,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLinkItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon_type: IconType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    pub hover_color: String,
}

impl QuickLinkItem {
    fn builtin(id: &str, name: &str, url: &str, hover_color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            icon_type: IconType::Builtin,
            favicon_url: None,
            hover_color: hover_color.to_string(),
        }
    }
}

/// Partial update for a quick link; `None` fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickLinkPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_type: Option<IconType>,
    pub favicon_url: Option<Option<String>>,
    pub hover_color: Option<String>,
}

impl QuickLinkItem {
    pub fn apply(&mut self, patch: QuickLinkPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(icon_type) = patch.icon_type {
            self.icon_type = icon_type;
        }
        if let Some(favicon_url) = patch.favicon_url {
            self.favicon_url = favicon_url;
        }
        if let Some(color) = patch.hover_color {
            self.hover_color = color;
        }
    }
}

/// Links seeded on first run and into documents that predate quick links
pub fn default_quick_links() -> Vec<QuickLinkItem> {
    vec![
        QuickLinkItem::builtin("github", "GitHub", "https://github.com", "rgba(36, 41, 46, 0.9)"),
        QuickLinkItem::builtin("x", "X", "https://x.com", "rgba(0, 0, 0, 0.9)"),
        QuickLinkItem::builtin("youtube", "YouTube", "https://youtube.com", "rgba(255, 0, 0, 0.8)"),
        QuickLinkItem::builtin("gmail", "Gmail", "https://mail.google.com", "rgba(234, 67, 53, 0.85)"),
        QuickLinkItem::builtin(
            "stackoverflow",
            "Stack Overflow",
            "https://stackoverflow.com",
            "rgba(244, 128, 36, 0.85)",
        ),
        QuickLinkItem::builtin("linkedin", "LinkedIn", "https://linkedin.com", "rgba(10, 102, 194, 0.9)"),
        QuickLinkItem::builtin("reddit", "Reddit", "https://reddit.com", "rgba(255, 69, 0, 0.85)"),
        QuickLinkItem::builtin("notion", "Notion", "https://notion.so", "rgba(55, 53, 47, 0.9)"),
    ]
}

/// The whole persisted document. Always written and read as one unit; fields
/// missing from an older or hand-edited document take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub theme: ThemeMode,
    pub widgets: Vec<WidgetInstance>,
    pub wallpaper: WallpaperSource,
    pub clock_settings: ClockSettings,
    pub search_settings: SearchSettings,
    pub weather_settings: WeatherSettings,
    pub countdowns: Vec<CountdownSettings>,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_links: Option<Vec<QuickLinkItem>>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Minimal,
            widgets: Vec::new(),
            wallpaper: WallpaperSource::default(),
            clock_settings: ClockSettings::default(),
            search_settings: SearchSettings::default(),
            weather_settings: WeatherSettings::default(),
            countdowns: Vec::new(),
            language: Language::En,
            quick_links: None,
        }
    }
}

impl UserSettings {
    pub fn widget(&self, id: &str) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn quick_links(&self) -> &[QuickLinkItem] {
        self.quick_links.as_deref().unwrap_or(&[])
    }
}
