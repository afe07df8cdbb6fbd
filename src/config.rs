use leptos::prelude::document;
use serde::Deserialize;

/// Id of the optional `<script type="application/json">` block carrying overrides.
pub const CONFIG_ELEMENT_ID: &str = "notes-config";

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub toast_duration_ms: u32,
    pub toast_exit_ms: u32,
    pub reload_delay_ms: u32,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            toast_duration_ms: 4000,
            toast_exit_ms: 300,
            reload_delay_ms: 1500,
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: ["txt", "md", "docx", "pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut config: ClientConfig = serde_json::from_str(raw)?;
        config.allowed_extensions = config
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Ok(config)
    }

    /// Reads overrides from the page, falling back to defaults.
    pub fn load() -> Self {
        let Some(raw) = document()
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed #{CONFIG_ELEMENT_ID}: {err}");
                Self::default()
            }
        }
    }

    /// Value for the file input's `accept` attribute, e.g. `.txt,.md`.
    pub fn accept_attribute(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}
