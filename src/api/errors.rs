//! Error taxonomy of the presentation layer.
//!
//! Three kinds of trouble reach the front end:
//! - `TransportError` - the request never produced a decodable response (server down, connection
//!   refused, body is not JSON). Surfaced once, never retried automatically.
//! - domain errors - a well formed envelope with `success: false`. The server message is shown,
//!   or a fallback string when the server sent none.
//! - malformed data - a successful envelope with a missing field. Those never become errors at all:
//!   the affected sub-view renders a "no data" placeholder (see `presentation::analysis_tabs`).
//!
//! `VizError` collects everything the ambient layers (config, logging, drawing) can fail with.
use std::fmt;

/// request could not be completed
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// connection refused, DNS failure, timeout reported by the HTTP client...
    Unreachable(String),
    /// a body arrived but it is not the JSON we expect
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Unreachable(reason) => write!(f, "{}", reason),
            TransportError::Decode(reason) => write!(f, "invalid response body: {}", reason),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Errors of the crate outside the pure transforms
#[derive(Debug)]
pub enum VizError {
    Transport(TransportError),
    /// `success: false` with the server message (or a fallback)
    Domain(String),
    Config(String),
    Io(std::io::Error),
    /// the drawing adapter failed to produce a chart
    Render(String),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VizError::Transport(err) => write!(f, "Network error: {}", err),
            VizError::Domain(msg) => write!(f, "{}", msg),
            VizError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            VizError::Io(err) => write!(f, "I/O error: {}", err),
            VizError::Render(msg) => write!(f, "Failed to render chart: {}", msg),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VizError::Transport(err) => Some(err),
            VizError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for VizError {
    fn from(err: TransportError) -> Self {
        VizError::Transport(err)
    }
}

impl From<std::io::Error> for VizError {
    fn from(err: std::io::Error) -> Self {
        VizError::Io(err)
    }
}

impl From<toml::de::Error> for VizError {
    fn from(err: toml::de::Error) -> Self {
        VizError::Config(err.to_string())
    }
}
