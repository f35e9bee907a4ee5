use anyhow::Result;
use directories::ProjectDirs;
use screencore::{ClassifierOptions, ElementKind, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::try_exists;

pub const CONFIG_PATH_ENV: &str = "SCREENWRIGHT_CONFIG_PATH";
pub const CONFIG_DIR_ENV: &str = "SCREENWRIGHT_CONFIG_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Character cues must be shorter than this.
    pub character_max_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            character_max_len: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub start_structured: bool,
    #[serde(default)]
    pub known_characters: Vec<String>,
}

/// Hex colours (`#RRGGBB`) per element kind. Unset kinds use built-in styles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub scene_heading: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub dialogue: Option<String>,
    #[serde(default)]
    pub parenthetical: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub centered: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl Theme {
    pub fn color_for(&self, kind: ElementKind) -> Option<&str> {
        let color = match kind {
            ElementKind::SceneHeading => &self.scene_heading,
            ElementKind::Character => &self.character,
            ElementKind::Dialogue => &self.dialogue,
            ElementKind::Parenthetical => &self.parenthetical,
            ElementKind::Transition => &self.transition,
            ElementKind::Centered => &self.centered,
            ElementKind::Action => &self.action,
        };
        color.as_deref()
    }

    fn colors_mut(&mut self) -> [(&'static str, &mut Option<String>); 7] {
        [
            ("scene_heading", &mut self.scene_heading),
            ("character", &mut self.character),
            ("dialogue", &mut self.dialogue),
            ("parenthetical", &mut self.parenthetical),
            ("transition", &mut self.transition),
            ("centered", &mut self.centered),
            ("action", &mut self.action),
        ]
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Config {
    /// Loads the config file, writing defaults when it is missing or empty.
    /// A file that fails to parse is kept as `config.bak` and replaced.
    pub async fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            log::warn!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if !try_exists(&path).await? {
            log::info!("No config at {}, writing defaults", path.display());
            return Ok(Self::write_default().await);
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read config {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };
        if content.trim().is_empty() {
            log::warn!("Config file is empty, writing defaults");
            return Ok(Self::write_default().await);
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate();
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                log::error!("Failed to parse config {}: {}", path.display(), e);
                let backup = path.with_extension("bak");
                match tokio::fs::copy(&path, &backup).await {
                    Ok(_) => log::info!("Kept broken config as {}", backup.display()),
                    Err(e) => log::warn!("Failed to back up broken config: {}", e),
                }
                Ok(Self::write_default().await)
            }
        }
    }

    async fn write_default() -> Self {
        let config = Self::default();
        if let Err(e) = config.save().await {
            log::warn!("Could not write default config: {}", e);
        }
        config
    }

    pub async fn save(&self) -> Result<()> {
        let Some(config_path) = Self::config_path() else {
            return Ok(());
        };

        let mut config_to_save = self.clone();
        config_to_save.validate();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "failed to create config directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("failed to serialize config: {}", e))?;
        tokio::fs::write(&config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "failed to write config file {}: {}",
                config_path.display(),
                e
            )
        })?;
        log::info!("Successfully saved config to: {}", config_path.display());
        Ok(())
    }

    /// Replaces out-of-range values with defaults. Returns whether anything changed.
    pub fn validate(&mut self) -> bool {
        let mut has_issues = false;

        if !(3..=200).contains(&self.classifier.character_max_len) {
            log::warn!(
                "Invalid character_max_len: {}, using default",
                self.classifier.character_max_len
            );
            self.classifier = ClassifierConfig::default();
            has_issues = true;
        }

        if !(1..=10_000).contains(&self.history.capacity) {
            log::warn!(
                "Invalid history capacity: {}, using default",
                self.history.capacity
            );
            self.history = HistoryConfig::default();
            has_issues = true;
        }

        let before = self.editor.known_characters.len();
        self.editor.known_characters.retain(|name| !name.trim().is_empty());
        if self.editor.known_characters.len() != before {
            log::warn!("Dropped empty names from known_characters");
            has_issues = true;
        }

        for (name, color) in self.theme.colors_mut() {
            if color.as_deref().is_some_and(|value| !is_hex_color(value)) {
                log::warn!("Invalid theme colour for {}: {:?}, ignoring", name, color);
                *color = None;
                has_issues = true;
            }
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }
        has_issues
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            classifier: ClassifierOptions {
                character_max_len: self.classifier.character_max_len,
            },
            history_capacity: self.history.capacity,
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "screenwright", "screenwright")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
