//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target window application name (from `xcap::Window::app_name()`).
    ///
    /// If multiple windows share the same app name, the first match is used.
    pub app_name: String,

    /// Poll interval (seconds) for the watch loop.
    pub poll_delay_s: f32,

    /// Captures are resized to this height before detection. Every region in
    /// `layout` is measured at this height.
    pub reference_height: u32,

    /// Directory holding the OCR models. Discovered automatically when unset.
    pub ocr_dir: Option<PathBuf>,

    /// Recognition model language prefix (`<lang>_recognition.mnn`).
    pub ocr_lang: String,

    pub ocr: ie::OcrOptions,

    /// Screen regions and color signatures.
    pub layout: ie::Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "StarRail".to_string(),
            poll_delay_s: 2.0,
            reference_height: 720,
            ocr_dir: None,
            ocr_lang: "en".to_string(),
            ocr: ie::OcrOptions::default(),
            layout: ie::Layout::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("eventbuddy.json"))
    }

    /// Load configuration from disk, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}
