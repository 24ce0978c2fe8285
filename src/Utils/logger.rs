//! console and file logging for the binary and the demos
use crate::Utils::config::LoggingSettings;
use crate::api::errors::VizError;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

/// Builds the combined logger described by `settings`. A logger can only be installed once per process;
/// later calls return `Ok(false)` and leave the first one in place.
pub fn init_logger(settings: &LoggingSettings) -> Result<bool, VizError> {
    let level = settings.level_filter()?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if settings.console {
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if let Some(path) = &settings.file {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    if loggers.is_empty() {
        return Ok(false);
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempdir().unwrap();
        let settings = LoggingSettings {
            level: "debug".to_string(),
            console: false,
            file: Some(dir.path().join("viz.log")),
        };
        // another test may have installed a logger first, so only the second call is certain
        let _ = init_logger(&settings).unwrap();
        assert!(!init_logger(&settings).unwrap());
        assert!(dir.path().join("viz.log").exists());
    }

    #[test]
    fn test_rejects_unknown_level() {
        let settings = LoggingSettings {
            level: "chatty".to_string(),
            ..LoggingSettings::default()
        };
        assert!(matches!(init_logger(&settings), Err(VizError::Config(_))));
    }

    #[test]
    fn test_nothing_to_log_to() {
        let settings = LoggingSettings {
            console: false,
            file: None,
            ..LoggingSettings::default()
        };
        assert!(!init_logger(&settings).unwrap());
    }
}
