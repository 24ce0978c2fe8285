//! Configuration of the front end, read from a TOML file.
//!
//! Every section and every key is optional; missing values take the defaults below, so an empty file
//! (or no file at all) gives the stock setup talking to `http://localhost:5000`.
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:5000"
//!
//! [layout]
//! viewport_width = 960.0
//! viewport_height = 500.0
//!
//! [sampler]
//! window = 4.0
//! samples = 100
//!
//! [logging]
//! level = "debug"
//! file = "viz.log"
//! ```
use crate::api::errors::VizError;
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// geometry of the AST drawing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// offset of the drawing area inside the viewport
    pub margin_left: f64,
    pub margin_top: f64,
    /// viewport size minus inset = size of the drawing area
    pub inset_x: f64,
    pub inset_y: f64,
    /// delay between two consecutive nodes of the reveal animation
    pub reveal_step_ms: u64,
    pub link_fade_ms: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            viewport_width: 960.0,
            viewport_height: 500.0,
            margin_left: 40.0,
            margin_top: 20.0,
            inset_x: 100.0,
            inset_y: 100.0,
            reveal_step_ms: 100,
            link_fade_ms: 800,
        }
    }
}

/// window and resolution of the differentiation plot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub window: f64,
    pub samples: usize,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        SamplerSettings {
            window: 4.0,
            samples: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// how many mnemonics the instruction histogram shows
    pub histogram_top: usize,
    pub status_auto_hide_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            histogram_top: 15,
            status_auto_hide_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// off, error, warn, info, debug, trace
    pub level: String,
    pub console: bool,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            console: true,
            file: None,
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> Result<LevelFilter, VizError> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| VizError::Config(format!("unknown log level '{}'", self.level)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// where the drawing adapter writes its SVG files
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            dir: PathBuf::from("charts"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub backend: BackendSettings,
    pub layout: LayoutSettings,
    pub sampler: SamplerSettings,
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
    pub output: OutputSettings,
}

impl VizConfig {
    pub fn from_toml_str(text: &str) -> Result<VizConfig, VizError> {
        let config: VizConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<VizConfig, VizError> {
        let text = std::fs::read_to_string(path)?;
        VizConfig::from_toml_str(&text)
    }

    /// `load` when the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<VizConfig, VizError> {
        if path.exists() {
            VizConfig::load(path)
        } else {
            Ok(VizConfig::default())
        }
    }

    fn validate(&self) -> Result<(), VizError> {
        if self.sampler.samples == 0 {
            return Err(VizError::Config("sampler.samples must be at least 1".to_string()));
        }
        if !(self.sampler.window > 0.0) {
            return Err(VizError::Config("sampler.window must be positive".to_string()));
        }
        if !(self.layout.viewport_width > 0.0) || !(self.layout.viewport_height > 0.0) {
            return Err(VizError::Config("layout viewport must be positive".to_string()));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_is_default() {
        let config = VizConfig::from_toml_str("").unwrap();
        assert_eq!(config, VizConfig::default());
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.sampler.samples, 100);
        assert_eq!(config.sampler.window, 4.0);
        assert_eq!(config.analysis.histogram_top, 15);
    }

    #[test]
    fn test_partial_sections() {
        let config = VizConfig::from_toml_str(
            r#"
            [backend]
            base_url = "http://compiler.local:8080"
            [layout]
            viewport_width = 1200.0
            [logging]
            level = "debug"
            file = "viz.log"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://compiler.local:8080");
        assert_eq!(config.layout.viewport_width, 1200.0);
        assert_eq!(config.layout.viewport_height, 500.0);
        assert_eq!(config.logging.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(config.logging.file, Some(PathBuf::from("viz.log")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(VizConfig::from_toml_str("[sampler]\nsamples = 0").is_err());
        assert!(VizConfig::from_toml_str("[sampler]\nwindow = -1.0").is_err());
        assert!(VizConfig::from_toml_str("[logging]\nlevel = \"loud\"").is_err());
        assert!(VizConfig::from_toml_str("[layout]\nviewport_width = \"wide\"").is_err());
    }

    #[test]
    fn test_rejects_nan_viewport() {
        for toml in ["[layout]\nviewport_width = nan", "[layout]\nviewport_height = nan"] {
            match VizConfig::from_toml_str(toml) {
                Err(VizError::Config(message)) => assert!(message.contains("viewport")),
                other => panic!("expected a config error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sampler]\nsamples = 25").unwrap();
        let config = VizConfig::load(file.path()).unwrap();
        assert_eq!(config.sampler.samples, 25);
        let missing = file.path().with_extension("missing");
        assert_eq!(VizConfig::load_or_default(&missing).unwrap(), VizConfig::default());
    }
}
