use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub live: LiveSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            backend: BackendSettings::default(),
            source: SourceSettings::default(),
            live: LiveSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: default_table(),
        }
    }
}

fn default_table() -> String {
    "transcriptions".to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Supabase,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceSettings {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default)]
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSettings {
    pub poll_interval_secs: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub timezone: String,
    pub currency_symbol: String,
    pub call_link_base: String,
    #[serde(default = "default_reference_cost_per_minute")]
    pub reference_cost_per_minute: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
            currency_symbol: "€".to_string(),
            call_link_base: "https://dashboard.vapi.ai/calls".to_string(),
            reference_cost_per_minute: default_reference_cost_per_minute(),
        }
    }
}

fn default_reference_cost_per_minute() -> f64 {
    0.16
}
